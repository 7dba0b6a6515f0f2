use crate::buffer::frame::{DepthFrame, FrameBuffer};
use crate::buffer::pool::{ScratchBuffer, ScratchPool, ScratchPoolOpts, ScratchPoolStats};
use crate::config::curve::CurveLut;
use crate::config::params::PipelineConfig;
use crate::effects::composite::crossfade_into;
use crate::foundation::error::{AfterimageError, AfterimageResult};
use crate::ghost::history::GhostHistory;
use crate::mask::compositor::{MaskSource, composite_mask};
use crate::stages::binding::{FrameContext, bind};
use crate::stages::kind::StageKind;
use crate::stages::registry::{StageOutcome, StageRegistry};

/// One frame handed to [`Pipeline::process`].
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Source color frame. Never modified.
    pub color: &'a FrameBuffer,
    /// Scene depth, when the host provides it.
    pub depth: Option<&'a DepthFrame>,
    /// Host time in seconds, used by animated stages.
    pub time_secs: f32,
}

impl<'a> FrameInput<'a> {
    pub fn new(color: &'a FrameBuffer) -> Self {
        Self {
            color,
            depth: None,
            time_secs: 0.0,
        }
    }

    pub fn with_depth(mut self, depth: &'a DepthFrame) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn at_time(mut self, time_secs: f32) -> Self {
        self.time_secs = time_secs;
        self
    }
}

/// Options fixed at pipeline construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineOpts {
    /// Scratch pool retention and budget.
    pub pool: ScratchPoolOpts,
    /// Byte budget for the ghost ring plus composite. `None` means unbounded.
    pub max_ghost_bytes: Option<usize>,
}

/// Per-pipeline counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames that ran the full chain.
    pub frames_processed: u64,
    /// Frames aborted mid-chain and answered with a copy of the source.
    pub frames_degraded: u64,
    /// Frames passed through untouched (inactive pipeline or invalid source).
    pub frames_bypassed: u64,
    /// Stage transforms actually invoked.
    pub stage_invocations: u64,
    /// Stages short-circuited to a copy.
    pub stage_passthroughs: u64,
    /// Ghost ring reallocations.
    pub ghost_reallocations: u64,
    /// Frames whose ghost ring could not be allocated; the trail is skipped, the chain still runs.
    pub ghost_failures: u64,
}

/// Per-frame post-processing chain.
///
/// Owns the stage registry, the scratch pool, and the ghost history of one effect instance.
/// A freshly constructed pipeline is inactive and passes frames through until
/// [`Pipeline::activate`] is called.
pub struct Pipeline {
    config: PipelineConfig,
    registry: StageRegistry,
    pool: ScratchPool,
    ghost: GhostHistory,
    curve_lut: Option<CurveLut>,
    curve_fingerprint: Option<u64>,
    requires_depth: bool,
    active: bool,
    frame_index: u64,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_opts(config, PipelineOpts::default())
    }

    pub fn with_opts(mut config: PipelineConfig, opts: PipelineOpts) -> Self {
        config.sanitize();
        let requires_depth = config.requires_depth();
        Self {
            config,
            registry: StageRegistry::new(),
            pool: ScratchPool::new(opts.pool),
            ghost: GhostHistory::new(opts.max_ghost_bytes),
            curve_lut: None,
            curve_fingerprint: None,
            requires_depth,
            active: false,
            frame_index: 0,
            stats: PipelineStats::default(),
        }
    }

    /// Starts processing: sanitizes the configuration, bakes the curve and drops any ghost seed.
    pub fn activate(&mut self) {
        self.config.sanitize();
        self.refresh_curve();
        self.requires_depth = self.config.requires_depth();
        self.ghost.release();
        self.active = true;
        tracing::debug!(requires_depth = self.requires_depth, "pipeline activated");
    }

    /// Replaces the configuration.
    ///
    /// The ghost seed survives unless the new frame count changes the ring capacity, which is
    /// applied at the next [`Pipeline::process`].
    pub fn configure(&mut self, mut config: PipelineConfig) {
        let fixed = config.sanitize();
        if fixed > 0 {
            tracing::debug!(fixed, "configuration values clamped");
        }
        self.config = config;
        if self.active {
            self.refresh_curve();
        }
        self.requires_depth = self.config.requires_depth();
    }

    /// Stops processing and drops persistent buffers.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.ghost.release();
        self.curve_lut = None;
        self.curve_fingerprint = None;
        self.pool.clear();
        tracing::debug!("pipeline deactivated");
    }

    fn refresh_curve(&mut self) {
        let fingerprint = self.config.palette.curve.fingerprint();
        if self.curve_lut.is_some() && self.curve_fingerprint == Some(fingerprint) {
            return;
        }
        self.curve_lut = Some(CurveLut::bake(&self.config.palette.curve));
        self.curve_fingerprint = Some(fingerprint);
        tracing::debug!(fingerprint, "response curve baked");
    }

    /// `true` when the host should provide depth frames.
    pub fn requires_depth(&self) -> bool {
        self.requires_depth
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StageRegistry {
        &mut self.registry
    }

    pub fn ghost(&self) -> &GhostHistory {
        &self.ghost
    }

    pub fn curve_lut(&self) -> Option<&CurveLut> {
        self.curve_lut.as_ref()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn pool_stats(&self) -> ScratchPoolStats {
        self.pool.stats()
    }

    pub fn set_pool_opts(&self, opts: ScratchPoolOpts) {
        self.pool.set_opts(opts);
    }

    /// Frames that entered the chain; bypassed frames are not counted.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Processes one frame into a new buffer.
    pub fn process(&mut self, input: FrameInput<'_>) -> FrameBuffer {
        let mut out = FrameBuffer::empty();
        self.process_into(input, &mut out);
        out
    }

    /// Processes one frame into `dst`, reshaping it to the source size.
    ///
    /// Never fails: an invalid source or an inactive pipeline passes through unchanged, and any
    /// failure inside the chain answers with a plain copy of the source.
    #[tracing::instrument(
        skip(self, input, dst),
        fields(
            frame = self.frame_index,
            width = input.color.width(),
            height = input.color.height()
        )
    )]
    pub fn process_into(&mut self, input: FrameInput<'_>, dst: &mut FrameBuffer) {
        let source = input.color;
        if !self.active || !source.is_valid() {
            self.stats.frames_bypassed += 1;
            dst.assign_from(source);
            return;
        }
        self.frame_index += 1;

        match self.run_frame(&input, dst) {
            Ok(()) => self.stats.frames_processed += 1,
            Err(err) => {
                tracing::warn!(error = %err, "frame degraded to source copy");
                self.stats.frames_degraded += 1;
                dst.assign_from(source);
            }
        }
    }

    fn run_frame(&mut self, input: &FrameInput<'_>, dst: &mut FrameBuffer) -> AfterimageResult<()> {
        let Self {
            config,
            registry,
            pool,
            ghost,
            curve_lut,
            frame_index,
            stats,
            ..
        } = self;
        let config: &PipelineConfig = config;
        let source = input.color;
        let desc = source.desc();

        let ghost_ready = match ghost.ensure_capacity(
            desc.width,
            desc.height,
            config.ghost_frame_count(),
        ) {
            Ok(reallocated) => {
                if reallocated {
                    stats.ghost_reallocations += 1;
                }
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ghost history unavailable, trail skipped");
                stats.ghost_failures += 1;
                false
            }
        };
        let curve_lut = curve_lut
            .as_ref()
            .ok_or_else(|| AfterimageError::resource_unavailable("response curve not baked"))?;

        let mut a = pool.acquire(desc)?;
        let mut b = pool.acquire(desc)?;
        a.copy_from(source)?;

        let depth = input.depth.filter(|d| d.matches(desc));
        let base_ctx = FrameContext {
            config,
            time_secs: input.time_secs,
            frame_index: *frame_index,
            ghost_composite: None,
            curve_lut,
            depth,
        };

        run_prefix(registry, stats, &base_ctx, &mut a, &mut b)?;
        run_stage(registry, stats, StageKind::ChannelJitter, &base_ctx, &mut a, &mut b)?;

        if ghost_ready {
            ghost.build_composite(&config.ghost);
        }
        let ctx = FrameContext {
            ghost_composite: if ghost_ready {
                ghost.seeded_composite()
            } else {
                None
            },
            ..base_ctx
        };
        for kind in &StageKind::ORDER[StageKind::Ghosting.index()..] {
            run_stage(registry, stats, *kind, &ctx, &mut a, &mut b)?;
        }

        if config.any_mask_enabled() {
            let mut anchor = pool.acquire(desc)?;
            anchor.copy_from(source)?;
            run_prefix(registry, stats, &base_ctx, &mut anchor, &mut b)?;

            if config.texture_mask.enabled {
                let mask = MaskSource::Texture {
                    texture: config.texture_mask.texture.as_deref(),
                    threshold: config.texture_mask.threshold,
                };
                composite_mask(&anchor, &a, &mask, &mut b)?;
                std::mem::swap(&mut a, &mut b);
            }
            if config.depth_mask.enabled {
                let mask = MaskSource::Depth {
                    depth: input.depth,
                    threshold: config.depth_mask.threshold,
                    softness: config.depth_mask.softness,
                };
                composite_mask(&anchor, &a, &mask, &mut b)?;
                std::mem::swap(&mut a, &mut b);
            }
        }

        dst.reshape(desc)?;
        crossfade_into(dst, source, &a, config.master.blend)?;

        if ghost_ready && config.ghost.enabled {
            ghost.capture(&a, config.ghost.capture_interval);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("active", &self.active)
            .field("frame_index", &self.frame_index)
            .field("registry", &self.registry)
            .field("ghost", &self.ghost.state())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Runs the mask-independent prefix from `a`, leaving the result in `a`.
fn run_prefix<'p>(
    registry: &StageRegistry,
    stats: &mut PipelineStats,
    ctx: &FrameContext<'_>,
    a: &mut ScratchBuffer<'p>,
    b: &mut ScratchBuffer<'p>,
) -> AfterimageResult<()> {
    for kind in StageKind::PREFIX {
        run_stage(registry, stats, kind, ctx, a, b)?;
    }
    Ok(())
}

/// Runs `kind` from `a` into `b`, then swaps so `a` holds the latest output.
fn run_stage<'p>(
    registry: &StageRegistry,
    stats: &mut PipelineStats,
    kind: StageKind,
    ctx: &FrameContext<'_>,
    a: &mut ScratchBuffer<'p>,
    b: &mut ScratchBuffer<'p>,
) -> AfterimageResult<()> {
    let binding = bind(kind, ctx);
    match registry.run(kind, binding.as_ref(), a, b)? {
        StageOutcome::Applied => stats.stage_invocations += 1,
        StageOutcome::Passthrough => stats.stage_passthroughs += 1,
    }
    std::mem::swap(a, b);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
