/// Result alias used throughout the crate.
pub type AfterimageResult<T> = Result<T, AfterimageError>;

/// Error taxonomy for the post-processing core.
///
/// None of these escape [`crate::Pipeline::process`]; they surface only from lower-level
/// building blocks (pool acquisition, buffer construction, config loading, bound transforms)
/// and are turned into a passthrough frame by the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AfterimageError {
    /// Configuration value out of range or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A transform, texture, or buffer could not be obtained.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Buffers of different dimensions were combined.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A bound transform or blend step failed while producing a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Configuration text could not be decoded.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AfterimageError {
    /// Build an [`AfterimageError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AfterimageError::ResourceUnavailable`].
    pub fn resource_unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Build an [`AfterimageError::DimensionMismatch`].
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Build an [`AfterimageError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build an [`AfterimageError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for AfterimageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
