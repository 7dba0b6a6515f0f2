use crate::buffer::texture::{ColorTexture, LumaTexture};
use crate::config::curve::ResponseCurve;
use crate::foundation::error::AfterimageResult;
use kurbo::Vec2;
use std::sync::Arc;

/// Upper bound on ghost ring slots.
pub const MAX_GHOST_FRAMES: u32 = 16;

/// Read-only per-frame configuration snapshot for the whole chain.
///
/// Every group deserializes with defaults, so a partial JSON object is a valid configuration.
/// Texture handles are runtime resources and are never (de)serialized.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Final blend against the untouched source.
    pub master: MasterParams,
    /// Pixelation and virtual grid.
    pub sampling: SamplingParams,
    /// Exposure/contrast/gamma/saturation.
    pub pregrade: PregradeParams,
    /// Per-channel offset jitter.
    pub jitter: JitterParams,
    /// Temporal ghost trail.
    pub ghost: GhostParams,
    /// Chromatic bleed.
    pub bleed: BleedParams,
    /// Unsharp mask.
    pub unsharp: UnsharpParams,
    /// Posterize/tone quantization.
    pub posterize: PosterizeParams,
    /// Dithering.
    pub dither: DitherParams,
    /// Palette mapping through the response curve.
    pub palette: PaletteParams,
    /// Edge outline.
    pub edges: EdgeParams,
    /// Texture threshold mask.
    pub texture_mask: TextureMaskParams,
    /// Depth threshold mask.
    pub depth_mask: DepthMaskParams,
}

/// Global blend of the processed image over the source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MasterParams {
    /// `0` shows the source, `1` the fully processed frame.
    pub blend: f32,
}

impl Default for MasterParams {
    fn default() -> Self {
        Self { blend: 1.0 }
    }
}

/// Virtual resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridSize {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Block size of the pixelation, `1` disables it.
    pub pixel_size: u32,
    /// Lock sampling to a fixed virtual grid independent of the output size.
    pub use_virtual_grid: bool,
    /// Virtual grid resolution.
    pub virtual_resolution: GridSize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            pixel_size: 1,
            use_virtual_grid: false,
            virtual_resolution: GridSize {
                width: 720,
                height: 480,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PregradeParams {
    pub enabled: bool,
    pub exposure: f32,
    pub contrast: f32,
    pub gamma: f32,
    pub saturation: f32,
}

impl Default for PregradeParams {
    fn default() -> Self {
        Self {
            enabled: false,
            exposure: 0.0,
            contrast: 1.0,
            gamma: 1.0,
            saturation: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JitterMode {
    /// Fixed offsets.
    Static,
    /// Smooth wobble over time.
    #[default]
    TimeSine,
    /// Hash-based pseudo-random offsets.
    HashNoise,
    /// Offsets read from `noise_texture`.
    BlueNoiseTex,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JitterParams {
    pub enabled: bool,
    pub strength: f32,
    pub mode: JitterMode,
    pub amount_px: f32,
    pub speed: f32,
    pub use_seed: bool,
    pub seed: u32,
    /// Vary the offset per scanline.
    pub scanline: bool,
    pub scanline_density: f32,
    pub scanline_amp: f32,
    /// Per-channel multipliers (R, G, B).
    pub channel_weights: [f32; 3],
    pub dir_r: Vec2,
    pub dir_g: Vec2,
    pub dir_b: Vec2,
    #[serde(skip)]
    pub noise_texture: Option<Arc<ColorTexture>>,
    pub clamp_uv: bool,
}

impl Default for JitterParams {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 0.0,
            mode: JitterMode::TimeSine,
            amount_px: 1.0,
            speed: 8.0,
            use_seed: false,
            seed: 1337,
            scanline: false,
            scanline_density: 480.0,
            scanline_amp: 0.35,
            channel_weights: [1.0, 1.0, 1.0],
            dir_r: Vec2::new(1.0, 0.0),
            dir_g: Vec2::new(0.0, 1.0),
            dir_b: Vec2::new(-1.0, -1.0),
            noise_texture: None,
            clamp_uv: true,
        }
    }
}

/// How the ghost composite is combined with the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GhostCombineMode {
    Mix,
    Add,
    #[default]
    Screen,
    Max,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GhostParams {
    pub enabled: bool,
    /// Strength of the trail in the ghosting stage.
    pub blend: f32,
    pub offset_px: Vec2,
    /// Ring depth (trail length), `1..=16`.
    pub frames: u32,
    /// Frames skipped between captures (trail smoothness).
    pub capture_interval: u32,
    /// Most recent ring slots left out of the composite.
    pub start_delay: u32,
    /// Recency weighting exponent.
    pub weight_curve: f32,
    pub combine_mode: GhostCombineMode,
}

impl Default for GhostParams {
    fn default() -> Self {
        Self {
            enabled: false,
            blend: 0.35,
            offset_px: Vec2::ZERO,
            frames: 4,
            capture_interval: 0,
            start_delay: 0,
            weight_curve: 1.5,
            combine_mode: GhostCombineMode::Screen,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BleedMode {
    #[default]
    Manual,
    Radial,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BleedBlendMode {
    Mix,
    Add,
    #[default]
    Screen,
    Max,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BleedParams {
    pub blend: f32,
    pub intensity: f32,
    pub mode: BleedMode,
    pub blend_mode: BleedBlendMode,
    pub shift_r: Vec2,
    pub shift_g: Vec2,
    pub shift_b: Vec2,
    pub edge_only: bool,
    pub edge_threshold: f32,
    pub edge_power: f32,
    pub radial_center: Vec2,
    pub radial_strength: f32,
    pub samples: u32,
    pub smear: f32,
    pub falloff: f32,
    pub intensity_rgb: [f32; 3],
    pub anamorphic: Vec2,
    pub clamp_uv: bool,
    pub preserve_luma: bool,
    pub wobble_amp: f32,
    pub wobble_freq: f32,
    pub wobble_scanline: bool,
}

impl Default for BleedParams {
    fn default() -> Self {
        Self {
            blend: 0.0,
            intensity: 0.0,
            mode: BleedMode::Manual,
            blend_mode: BleedBlendMode::Screen,
            shift_r: Vec2::new(-0.5, 0.5),
            shift_g: Vec2::new(0.5, -0.5),
            shift_b: Vec2::ZERO,
            edge_only: false,
            edge_threshold: 0.05,
            edge_power: 2.0,
            radial_center: Vec2::new(0.5, 0.5),
            radial_strength: 1.0,
            samples: 1,
            smear: 0.0,
            falloff: 2.0,
            intensity_rgb: [1.0, 1.0, 1.0],
            anamorphic: Vec2::new(1.0, 1.0),
            clamp_uv: false,
            preserve_luma: false,
            wobble_amp: 0.0,
            wobble_freq: 4.0,
            wobble_scanline: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UnsharpParams {
    pub enabled: bool,
    pub amount: f32,
    pub radius: f32,
    pub threshold: f32,
    pub luma_only: bool,
    pub chroma: f32,
}

impl Default for UnsharpParams {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 0.5,
            radius: 1.0,
            threshold: 0.0,
            luma_only: false,
            chroma: 0.0,
        }
    }
}

/// Quantization levels shared by the posterize and dithering stages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PosterizeParams {
    pub enabled: bool,
    pub levels: u32,
    pub per_channel: bool,
    pub levels_rgb: [u32; 3],
    pub animate_levels: bool,
    pub min_levels: u32,
    pub max_levels: u32,
    pub speed: f32,
    pub luminance_only: bool,
}

impl Default for PosterizeParams {
    fn default() -> Self {
        Self {
            enabled: false,
            levels: 64,
            per_channel: false,
            levels_rgb: [64, 64, 64],
            animate_levels: false,
            min_levels: 64,
            max_levels: 64,
            speed: 1.0,
            luminance_only: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DitherMode {
    #[default]
    None,
    Ordered2x2,
    Ordered4x4,
    Ordered8x8,
    Noise,
    BlueNoise,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DitherParams {
    pub mode: DitherMode,
    pub strength: f32,
    #[serde(skip)]
    pub blue_noise: Option<Arc<ColorTexture>>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PaletteParams {
    pub enabled: bool,
    /// Palette ramp; without it the stage maps through the curve only.
    #[serde(skip)]
    pub palette: Option<Arc<ColorTexture>>,
    /// Response curve baked into the stage's lookup table.
    pub curve: ResponseCurve,
    pub invert: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub enabled: bool,
    pub strength: f32,
    pub threshold: f32,
    pub blend: f32,
    /// Outline color, straight RGBA8.
    pub color: [u8; 4],
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 1.0,
            threshold: 0.02,
            blend: 1.0,
            color: [0, 0, 0, 255],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextureMaskParams {
    pub enabled: bool,
    #[serde(skip)]
    pub texture: Option<Arc<LumaTexture>>,
    /// Mask samples at or above this keep the processed image.
    pub threshold: f32,
}

impl Default for TextureMaskParams {
    fn default() -> Self {
        Self {
            enabled: false,
            texture: None,
            threshold: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DepthMaskParams {
    pub enabled: bool,
    /// Eye depth where the processed image gives way to the base image.
    pub threshold: f32,
    /// Half-width of the transition band around `threshold`; `0` is a hard cut.
    pub softness: f32,
}

impl Default for DepthMaskParams {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 1.0,
            softness: 0.0,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON configuration and sanitize it.
    pub fn from_json_str(s: &str) -> AfterimageResult<Self> {
        let mut cfg: PipelineConfig = serde_json::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Build from an already parsed JSON value and sanitize it.
    pub fn from_json_value(v: serde_json::Value) -> AfterimageResult<Self> {
        let mut cfg: PipelineConfig = serde_json::from_value(v)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// `true` when the host must supply a depth buffer.
    pub fn requires_depth(&self) -> bool {
        self.depth_mask.enabled || self.edges.enabled
    }

    /// `true` when the masked execution path runs.
    pub fn any_mask_enabled(&self) -> bool {
        self.texture_mask.enabled || self.depth_mask.enabled
    }

    /// Ring depth after clamping.
    pub fn ghost_frame_count(&self) -> usize {
        self.ghost.frames.clamp(1, MAX_GHOST_FRAMES) as usize
    }

    /// Clamp every value into its supported range. Returns the number of corrected fields.
    ///
    /// Out-of-range values are never an error.
    pub fn sanitize(&mut self) -> usize {
        let mut fix = Fixer::default();

        fix.clamp("master.blend", &mut self.master.blend, 0.0, 1.0);

        let s = &mut self.sampling;
        fix.clamp("sampling.pixel_size", &mut s.pixel_size, 1, 1024);
        fix.clamp(
            "sampling.virtual_resolution.width",
            &mut s.virtual_resolution.width,
            1,
            u32::MAX,
        );
        fix.clamp(
            "sampling.virtual_resolution.height",
            &mut s.virtual_resolution.height,
            1,
            u32::MAX,
        );

        let p = &mut self.pregrade;
        fix.clamp("pregrade.exposure", &mut p.exposure, -5.0, 5.0);
        fix.clamp("pregrade.contrast", &mut p.contrast, 0.0, 2.0);
        fix.clamp("pregrade.gamma", &mut p.gamma, 0.1, 3.0);
        fix.clamp("pregrade.saturation", &mut p.saturation, 0.0, 2.0);

        let j = &mut self.jitter;
        fix.clamp("jitter.strength", &mut j.strength, 0.0, 1.0);
        fix.clamp("jitter.amount_px", &mut j.amount_px, 0.0, 8.0);
        fix.clamp("jitter.speed", &mut j.speed, 0.0, 30.0);
        fix.clamp("jitter.seed", &mut j.seed, 0, 9999);
        fix.clamp("jitter.scanline_density", &mut j.scanline_density, 32.0, 2048.0);
        fix.clamp("jitter.scanline_amp", &mut j.scanline_amp, 0.0, 2.0);
        for w in &mut j.channel_weights {
            fix.clamp("jitter.channel_weights", w, 0.0, f32::MAX);
        }
        fix.vec2("jitter.dir_r", &mut j.dir_r);
        fix.vec2("jitter.dir_g", &mut j.dir_g);
        fix.vec2("jitter.dir_b", &mut j.dir_b);

        let g = &mut self.ghost;
        fix.clamp("ghost.blend", &mut g.blend, 0.0, 1.0);
        fix.vec2("ghost.offset_px", &mut g.offset_px);
        fix.clamp("ghost.frames", &mut g.frames, 1, MAX_GHOST_FRAMES);
        fix.clamp("ghost.capture_interval", &mut g.capture_interval, 0, 8);
        fix.clamp("ghost.start_delay", &mut g.start_delay, 0, 8);
        fix.clamp("ghost.weight_curve", &mut g.weight_curve, 0.25, 4.0);

        let b = &mut self.bleed;
        fix.clamp("bleed.blend", &mut b.blend, 0.0, 1.0);
        fix.clamp("bleed.intensity", &mut b.intensity, 0.0, 10.0);
        fix.vec2("bleed.shift_r", &mut b.shift_r);
        fix.vec2("bleed.shift_g", &mut b.shift_g);
        fix.vec2("bleed.shift_b", &mut b.shift_b);
        fix.clamp("bleed.edge_threshold", &mut b.edge_threshold, 0.0, 1.0);
        fix.clamp("bleed.edge_power", &mut b.edge_power, 0.25, 8.0);
        fix.vec2("bleed.radial_center", &mut b.radial_center);
        fix.clamp("bleed.radial_strength", &mut b.radial_strength, 0.0, 5.0);
        fix.clamp("bleed.samples", &mut b.samples, 1, 8);
        fix.clamp("bleed.smear", &mut b.smear, 0.0, 5.0);
        fix.clamp("bleed.falloff", &mut b.falloff, 0.25, 6.0);
        for c in &mut b.intensity_rgb {
            fix.clamp("bleed.intensity_rgb", c, 0.0, 2.0);
        }
        fix.clamp("bleed.anamorphic.x", &mut b.anamorphic.x, 0.0001, f64::MAX);
        fix.clamp("bleed.anamorphic.y", &mut b.anamorphic.y, 0.0001, f64::MAX);
        fix.clamp("bleed.wobble_amp", &mut b.wobble_amp, 0.0, 2.0);
        fix.clamp("bleed.wobble_freq", &mut b.wobble_freq, 0.0, 20.0);

        let u = &mut self.unsharp;
        fix.clamp("unsharp.amount", &mut u.amount, 0.0, 3.0);
        fix.clamp("unsharp.radius", &mut u.radius, 0.25, 4.0);
        fix.clamp("unsharp.threshold", &mut u.threshold, 0.0, 0.25);
        fix.clamp("unsharp.chroma", &mut u.chroma, 0.0, 1.0);

        let q = &mut self.posterize;
        fix.clamp("posterize.levels", &mut q.levels, 2, 512);
        for l in &mut q.levels_rgb {
            fix.clamp("posterize.levels_rgb", l, 2, 512);
        }
        fix.clamp("posterize.min_levels", &mut q.min_levels, 2, 512);
        fix.clamp("posterize.max_levels", &mut q.max_levels, 2, 512);
        fix.finite("posterize.speed", &mut q.speed, 1.0);

        fix.clamp("dither.strength", &mut self.dither.strength, 0.0, 1.0);

        if self.palette.curve.sanitize() {
            fix.note("palette.curve");
        }

        let e = &mut self.edges;
        fix.clamp("edges.strength", &mut e.strength, 0.0, 8.0);
        fix.clamp("edges.threshold", &mut e.threshold, 0.0, 1.0);
        fix.clamp("edges.blend", &mut e.blend, 0.0, 1.0);

        fix.clamp(
            "texture_mask.threshold",
            &mut self.texture_mask.threshold,
            0.0,
            1.0,
        );
        fix.clamp(
            "depth_mask.threshold",
            &mut self.depth_mask.threshold,
            0.0,
            10.0,
        );
        fix.clamp(
            "depth_mask.softness",
            &mut self.depth_mask.softness,
            0.0,
            10.0,
        );

        fix.count
    }
}

/// Clamping helper that counts and logs each correction.
#[derive(Default)]
struct Fixer {
    count: usize,
}

trait Clampable: Copy + PartialOrd {
    fn is_usable(self) -> bool;
}

impl Clampable for f32 {
    fn is_usable(self) -> bool {
        self.is_finite()
    }
}

impl Clampable for f64 {
    fn is_usable(self) -> bool {
        self.is_finite()
    }
}

impl Clampable for u32 {
    fn is_usable(self) -> bool {
        true
    }
}

impl Fixer {
    fn note(&mut self, field: &str) {
        self.count += 1;
        tracing::debug!(field, "configuration value corrected");
    }

    fn clamp<T: Clampable + std::fmt::Debug>(&mut self, field: &str, v: &mut T, lo: T, hi: T) {
        let fixed = if !v.is_usable() {
            lo
        } else if *v < lo {
            lo
        } else if *v > hi {
            hi
        } else {
            return;
        };
        tracing::debug!(field, from = ?*v, to = ?fixed, "configuration value clamped");
        *v = fixed;
        self.count += 1;
    }

    fn finite(&mut self, field: &str, v: &mut f32, fallback: f32) {
        if !v.is_finite() {
            *v = fallback;
            self.note(field);
        }
    }

    fn vec2(&mut self, field: &str, v: &mut Vec2) {
        if v.x.is_finite() && v.y.is_finite() {
            return;
        }
        *v = Vec2::new(
            if v.x.is_finite() { v.x } else { 0.0 },
            if v.y.is_finite() { v.y } else { 0.0 },
        );
        self.note(field);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/params.rs"]
mod tests;
