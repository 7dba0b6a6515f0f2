/// The ten chain stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    /// Pixelation and virtual-grid quantization.
    SamplingGrid,
    /// Exposure, contrast, gamma, saturation.
    Pregrade,
    /// Per-channel offset jitter.
    ChannelJitter,
    /// Blend of the ghost composite into the frame.
    Ghosting,
    /// Chromatic bleed.
    ChromaticBleed,
    /// Unsharp mask.
    Unsharpen,
    /// Posterize / tone quantization.
    PosterizeTone,
    /// Ordered or noise dithering.
    Dithering,
    /// Palette mapping through the response curve.
    PaletteMapping,
    /// Edge outline.
    EdgeOutline,
}

impl StageKind {
    /// Number of stage kinds.
    pub const COUNT: usize = 10;

    /// Fixed chain order.
    ///
    /// Quantization, tone, dither and palette each assume the previous stage's output range.
    /// Ghosting sits after jitter and before tone/dither so history records motion rather than
    /// grading artifacts.
    pub const ORDER: [StageKind; Self::COUNT] = [
        StageKind::SamplingGrid,
        StageKind::Pregrade,
        StageKind::ChannelJitter,
        StageKind::Ghosting,
        StageKind::ChromaticBleed,
        StageKind::Unsharpen,
        StageKind::PosterizeTone,
        StageKind::Dithering,
        StageKind::PaletteMapping,
        StageKind::EdgeOutline,
    ];

    /// Stages that do not depend on masking; re-run on the mask anchor.
    pub const PREFIX: [StageKind; 2] = [StageKind::SamplingGrid, StageKind::Pregrade];

    /// Position in [`StageKind::ORDER`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            StageKind::SamplingGrid => "sampling_grid",
            StageKind::Pregrade => "pregrade",
            StageKind::ChannelJitter => "channel_jitter",
            StageKind::Ghosting => "ghosting",
            StageKind::ChromaticBleed => "chromatic_bleed",
            StageKind::Unsharpen => "unsharpen",
            StageKind::PosterizeTone => "posterize_tone",
            StageKind::Dithering => "dithering",
            StageKind::PaletteMapping => "palette_mapping",
            StageKind::EdgeOutline => "edge_outline",
        }
    }

    /// `true` for the mask-independent prefix.
    pub fn is_prefix(self) -> bool {
        Self::PREFIX.contains(&self)
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/kind.rs"]
mod tests;
