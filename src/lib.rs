//! Afterimage is a per-frame image post-processing chain.
//!
//! A [`Pipeline`] runs a fixed sequence of ten stages over each frame using two ping-pong
//! scratch buffers, keeps a ring of past processed frames for ghost trails, optionally
//! recomposes the result through texture and depth masks, and finally blends it against the
//! untouched source.
//!
//! - Build a [`PipelineConfig`] (or load one from JSON)
//! - Bind [`StageTransform`]s into the pipeline's [`StageRegistry`]
//! - [`Pipeline::activate`], then call [`Pipeline::process`] once per frame
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod buffer;
pub(crate) mod config;
pub(crate) mod effects;
pub(crate) mod ghost;
pub(crate) mod mask;
pub(crate) mod pipeline;
pub(crate) mod stages;

pub use kurbo::Vec2;

pub use crate::foundation::error::{AfterimageError, AfterimageResult};

pub use crate::buffer::frame::{DepthFrame, FrameBuffer, FrameDesc, PixelFormat};
pub use crate::buffer::pool::{ScratchBuffer, ScratchPool, ScratchPoolOpts, ScratchPoolStats};
pub use crate::buffer::texture::{ColorTexture, LumaTexture};
pub use crate::config::curve::{CURVE_LUT_SIZE, CurveKey, CurveLut, ResponseCurve};
pub use crate::config::params::{
    BleedBlendMode, BleedMode, BleedParams, DepthMaskParams, DitherMode, DitherParams, EdgeParams,
    GhostCombineMode, GhostParams, GridSize, JitterMode, JitterParams, MAX_GHOST_FRAMES,
    MasterParams, PaletteParams, PipelineConfig, PosterizeParams, PregradeParams, SamplingParams,
    TextureMaskParams, UnsharpParams,
};
pub use crate::effects::composite::{Rgba8, crossfade, crossfade_into};
pub use crate::ghost::history::{GhostHistory, GhostState};
pub use crate::mask::compositor::{MaskSource, composite_mask};
pub use crate::pipeline::orchestrator::{FrameInput, Pipeline, PipelineOpts, PipelineStats};
pub use crate::stages::binding::{FrameContext, GridParams, StageBinding, bind};
pub use crate::stages::kind::StageKind;
pub use crate::stages::registry::{StageOutcome, StageRegistry, StageTransform};
