use crate::buffer::frame::FrameBuffer;
use crate::foundation::error::AfterimageResult;
use crate::stages::binding::StageBinding;
use crate::stages::kind::StageKind;

/// A per-pixel transform plugged into one chain stage.
///
/// `src` and `dst` always share a descriptor. Implementations must fully overwrite `dst`.
pub trait StageTransform {
    fn apply(
        &self,
        src: &FrameBuffer,
        dst: &mut FrameBuffer,
        binding: &StageBinding<'_>,
    ) -> AfterimageResult<()>;
}

impl<F> StageTransform for F
where
    F: Fn(&FrameBuffer, &mut FrameBuffer, &StageBinding<'_>) -> AfterimageResult<()>,
{
    fn apply(
        &self,
        src: &FrameBuffer,
        dst: &mut FrameBuffer,
        binding: &StageBinding<'_>,
    ) -> AfterimageResult<()> {
        self(src, dst, binding)
    }
}

/// What [`StageRegistry::run`] did for a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// The bound transform ran.
    Applied,
    /// Unbound or guarded off; `dst` is an exact copy of `src`.
    Passthrough,
}

/// One optional transform slot per [`StageKind`].
#[derive(Default)]
pub struct StageRegistry {
    slots: [Option<Box<dyn StageTransform>>; StageKind::COUNT],
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `transform` for `kind`, replacing any previous one.
    pub fn bind_transform(&mut self, kind: StageKind, transform: Box<dyn StageTransform>) {
        tracing::debug!(stage = kind.name(), "stage transform bound");
        self.slots[kind.index()] = Some(transform);
    }

    /// Closure form of [`StageRegistry::bind_transform`].
    pub fn bind_fn<F>(&mut self, kind: StageKind, f: F)
    where
        F: Fn(&FrameBuffer, &mut FrameBuffer, &StageBinding<'_>) -> AfterimageResult<()> + 'static,
    {
        self.bind_transform(kind, Box::new(f));
    }

    pub fn unbind(&mut self, kind: StageKind) -> Option<Box<dyn StageTransform>> {
        self.slots[kind.index()].take()
    }

    pub fn is_bound(&self, kind: StageKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn bound_kinds(&self) -> impl Iterator<Item = StageKind> + '_ {
        StageKind::ORDER
            .into_iter()
            .filter(|k| self.slots[k.index()].is_some())
    }

    /// Runs one stage from `src` into `dst`.
    ///
    /// Without a bound transform or a binding the stage short-circuits to an exact copy.
    pub fn run(
        &self,
        kind: StageKind,
        binding: Option<&StageBinding<'_>>,
        src: &FrameBuffer,
        dst: &mut FrameBuffer,
    ) -> AfterimageResult<StageOutcome> {
        match (self.slots[kind.index()].as_deref(), binding) {
            (Some(transform), Some(binding)) => {
                debug_assert_eq!(binding.kind(), kind);
                transform.apply(src, dst, binding)?;
                Ok(StageOutcome::Applied)
            }
            _ => {
                dst.copy_from(src)?;
                Ok(StageOutcome::Passthrough)
            }
        }
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("bound", &self.bound_kinds().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/registry.rs"]
mod tests;
