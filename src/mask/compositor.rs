use crate::buffer::frame::{DepthFrame, FrameBuffer};
use crate::buffer::texture::LumaTexture;
use crate::effects::composite::crossfade_weighted_into;
use crate::foundation::error::AfterimageResult;
use crate::foundation::math::smoothstep;

/// Where the per-pixel effect weight comes from.
#[derive(Clone, Copy, Debug)]
pub enum MaskSource<'a> {
    /// Luminance texture, sampled nearest at the pixel's normalized position.
    Texture {
        texture: Option<&'a LumaTexture>,
        threshold: f32,
    },
    /// Scene depth: near pixels keep the effect, far pixels fall back to the base.
    Depth {
        depth: Option<&'a DepthFrame>,
        threshold: f32,
        softness: f32,
    },
}

impl MaskSource<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            MaskSource::Texture { .. } => "texture_mask",
            MaskSource::Depth { .. } => "depth_mask",
        }
    }
}

fn depth_weight(depth: f32, threshold: f32, softness: f32) -> f32 {
    if softness <= 0.0 {
        return if depth < threshold { 1.0 } else { 0.0 };
    }
    1.0 - smoothstep(threshold - softness, threshold + softness, depth)
}

/// `dst = lerp(base, effect, mask(x, y))`.
///
/// A mask whose resource is missing, or a depth frame of the wrong size, leaves `dst` an exact
/// copy of `effect`.
pub fn composite_mask(
    base: &FrameBuffer,
    effect: &FrameBuffer,
    source: &MaskSource<'_>,
    dst: &mut FrameBuffer,
) -> AfterimageResult<()> {
    let (w, h) = (effect.width() as f32, effect.height() as f32);
    match *source {
        MaskSource::Texture {
            texture: Some(texture),
            threshold,
        } => crossfade_weighted_into(dst, base, effect, |x, y| {
            let u = (x as f32 + 0.5) / w;
            let v = (y as f32 + 0.5) / h;
            if texture.sample(u, v) >= threshold {
                1.0
            } else {
                0.0
            }
        }),
        MaskSource::Depth {
            depth: Some(depth),
            threshold,
            softness,
        } if depth.matches(effect.desc()) => {
            let samples = depth.samples();
            let stride = effect.width() as usize;
            crossfade_weighted_into(dst, base, effect, |x, y| {
                let d = samples[y as usize * stride + x as usize];
                depth_weight(d, threshold, softness)
            })
        }
        _ => {
            tracing::debug!(mask = source.name(), "mask resource unavailable, effect kept");
            dst.copy_from(effect)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/compositor.rs"]
mod tests;
