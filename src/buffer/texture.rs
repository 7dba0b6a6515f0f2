use image::{GrayImage, RgbaImage};

/// Single-channel texture used as a threshold mask.
///
/// Sampled with normalized coordinates, so it does not need to match the frame size.
#[derive(Clone, Debug, PartialEq)]
pub struct LumaTexture {
    image: GrayImage,
}

impl LumaTexture {
    /// Wrap a grayscale image.
    pub fn from_luma(image: GrayImage) -> Self {
        Self { image }
    }

    /// Convert an RGBA image using Rec.601 luma weights; alpha is ignored.
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (w, h) = image.dimensions();
        let luma = GrayImage::from_fn(w, h, |x, y| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            let l = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
            image::Luma([l.round().clamp(0.0, 255.0) as u8])
        });
        Self { image: luma }
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Nearest-texel sample at normalized `(u, v)` in `[0,1]`, returned in `[0,1]`.
    ///
    /// An empty texture samples as white.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return 1.0;
        }
        let x = ((u.clamp(0.0, 1.0) * w as f32) as u32).min(w - 1);
        let y = ((v.clamp(0.0, 1.0) * h as f32) as u32).min(h - 1);
        f32::from(self.image.get_pixel(x, y).0[0]) / 255.0
    }
}

/// RGBA texture handed through to bound transforms (palette ramps, noise tiles).
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTexture {
    image: RgbaImage,
}

impl ColorTexture {
    /// Wrap an RGBA image.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/texture.rs"]
mod tests;
