use crate::buffer::frame::{DepthFrame, FrameBuffer};
use crate::config::curve::CurveLut;
use crate::config::params::{
    BleedParams, DitherMode, DitherParams, EdgeParams, GhostParams, GridSize, JitterParams,
    PaletteParams, PipelineConfig, PosterizeParams, PregradeParams, UnsharpParams,
};
use crate::stages::kind::StageKind;

/// Sampling grid shared by every stage that works in grid space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridParams {
    /// Block size in source pixels (`1` means no pixelation).
    pub pixel_size: u32,
    /// Target resolution when the virtual grid is enabled.
    pub virtual_resolution: Option<GridSize>,
}

impl GridParams {
    fn from_config(config: &PipelineConfig) -> Self {
        let s = &config.sampling;
        Self {
            pixel_size: s.pixel_size.max(1),
            virtual_resolution: s.use_virtual_grid.then_some(s.virtual_resolution),
        }
    }
}

/// Everything the binder can draw from for a single frame.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub config: &'a PipelineConfig,
    /// Host time in seconds.
    pub time_secs: f32,
    pub frame_index: u64,
    /// `Some` only once the ghost ring has been seeded.
    pub ghost_composite: Option<&'a FrameBuffer>,
    pub curve_lut: &'a CurveLut,
    pub depth: Option<&'a DepthFrame>,
}

/// Parameters for one stage invocation.
#[derive(Clone, Copy)]
pub enum StageBinding<'a> {
    SamplingGrid {
        grid: GridParams,
    },
    Pregrade {
        params: &'a PregradeParams,
    },
    ChannelJitter {
        params: &'a JitterParams,
        grid: GridParams,
        time_secs: f32,
    },
    Ghosting {
        params: &'a GhostParams,
        composite: &'a FrameBuffer,
        grid: GridParams,
    },
    ChromaticBleed {
        params: &'a BleedParams,
        grid: GridParams,
        time_secs: f32,
    },
    Unsharpen {
        params: &'a UnsharpParams,
        grid: GridParams,
    },
    PosterizeTone {
        params: &'a PosterizeParams,
        time_secs: f32,
    },
    Dithering {
        params: &'a DitherParams,
        /// Quantization levels the dither pattern should target.
        posterize: &'a PosterizeParams,
        grid: GridParams,
        frame_index: u64,
    },
    PaletteMapping {
        params: &'a PaletteParams,
        lut: &'a CurveLut,
    },
    EdgeOutline {
        params: &'a EdgeParams,
        grid: GridParams,
        depth: Option<&'a DepthFrame>,
    },
}

impl StageBinding<'_> {
    pub fn kind(&self) -> StageKind {
        match self {
            StageBinding::SamplingGrid { .. } => StageKind::SamplingGrid,
            StageBinding::Pregrade { .. } => StageKind::Pregrade,
            StageBinding::ChannelJitter { .. } => StageKind::ChannelJitter,
            StageBinding::Ghosting { .. } => StageKind::Ghosting,
            StageBinding::ChromaticBleed { .. } => StageKind::ChromaticBleed,
            StageBinding::Unsharpen { .. } => StageKind::Unsharpen,
            StageBinding::PosterizeTone { .. } => StageKind::PosterizeTone,
            StageBinding::Dithering { .. } => StageKind::Dithering,
            StageBinding::PaletteMapping { .. } => StageKind::PaletteMapping,
            StageBinding::EdgeOutline { .. } => StageKind::EdgeOutline,
        }
    }
}

impl std::fmt::Debug for StageBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StageBinding").field(&self.kind()).finish()
    }
}

/// Evaluates the stage guard and builds its binding.
///
/// Returns `None` when the stage must be skipped this frame; the caller then copies `src` into
/// `dst` unchanged.
pub fn bind<'a>(kind: StageKind, ctx: &FrameContext<'a>) -> Option<StageBinding<'a>> {
    let cfg = ctx.config;
    let grid = GridParams::from_config(cfg);
    match kind {
        StageKind::SamplingGrid => (cfg.sampling.pixel_size > 1 || cfg.sampling.use_virtual_grid)
            .then_some(StageBinding::SamplingGrid { grid }),
        StageKind::Pregrade => cfg.pregrade.enabled.then_some(StageBinding::Pregrade {
            params: &cfg.pregrade,
        }),
        StageKind::ChannelJitter => (cfg.jitter.enabled && cfg.jitter.strength > 0.0).then_some(
            StageBinding::ChannelJitter {
                params: &cfg.jitter,
                grid,
                time_secs: ctx.time_secs,
            },
        ),
        StageKind::Ghosting => {
            if !(cfg.ghost.enabled && cfg.ghost.blend > 0.0) {
                return None;
            }
            let composite = ctx.ghost_composite?;
            Some(StageBinding::Ghosting {
                params: &cfg.ghost,
                composite,
                grid,
            })
        }
        StageKind::ChromaticBleed => (cfg.bleed.blend > 0.0 && cfg.bleed.intensity > 0.0)
            .then_some(StageBinding::ChromaticBleed {
                params: &cfg.bleed,
                grid,
                time_secs: ctx.time_secs,
            }),
        StageKind::Unsharpen => (cfg.unsharp.enabled && cfg.unsharp.amount > 0.0).then_some(
            StageBinding::Unsharpen {
                params: &cfg.unsharp,
                grid,
            },
        ),
        StageKind::PosterizeTone => cfg.posterize.enabled.then_some(StageBinding::PosterizeTone {
            params: &cfg.posterize,
            time_secs: ctx.time_secs,
        }),
        StageKind::Dithering => (cfg.dither.mode != DitherMode::None
            && cfg.dither.strength > 0.0)
            .then_some(StageBinding::Dithering {
                params: &cfg.dither,
                posterize: &cfg.posterize,
                grid,
                frame_index: ctx.frame_index,
            }),
        StageKind::PaletteMapping => cfg.palette.enabled.then_some(StageBinding::PaletteMapping {
            params: &cfg.palette,
            lut: ctx.curve_lut,
        }),
        StageKind::EdgeOutline => (cfg.edges.enabled && cfg.edges.blend > 0.0).then_some(
            StageBinding::EdgeOutline {
                params: &cfg.edges,
                grid,
                depth: ctx.depth,
            },
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/binding.rs"]
mod tests;
