use crate::foundation::error::{AfterimageError, AfterimageResult};
use crate::foundation::math::byte_len_rgba8;

/// Pixel layout of a [`FrameBuffer`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum PixelFormat {
    /// 8-bit RGBA, straight alpha, row-major, tightly packed.
    #[default]
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Size and format of a buffer. Scratch and history buffers never carry depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl FrameDesc {
    /// RGBA8 descriptor.
    pub fn rgba8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }

    /// `true` when the descriptor covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Storage size in bytes, `None` on overflow.
    pub fn byte_len(self) -> Option<usize> {
        match self.format {
            PixelFormat::Rgba8 => byte_len_rgba8(self.width, self.height),
        }
    }
}

/// An owned 2D color buffer.
///
/// The byte length always equals `width * height * bytes_per_pixel`; every constructor checks
/// it, and no public API can change the dimensions of an existing buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    desc: FrameDesc,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Zero-filled buffer.
    pub fn new(width: u32, height: u32) -> AfterimageResult<Self> {
        Self::with_desc(FrameDesc::rgba8(width, height))
    }

    /// Zero-filled buffer for `desc`.
    pub fn with_desc(desc: FrameDesc) -> AfterimageResult<Self> {
        let len = desc.byte_len().ok_or_else(|| {
            AfterimageError::resource_unavailable(format!(
                "frame buffer size overflow ({}x{})",
                desc.width, desc.height
            ))
        })?;
        Ok(Self {
            desc,
            data: vec![0u8; len],
        })
    }

    /// Wrap existing RGBA8 bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> AfterimageResult<Self> {
        let desc = FrameDesc::rgba8(width, height);
        let expected = desc.byte_len().ok_or_else(|| {
            AfterimageError::resource_unavailable("frame buffer size overflow")
        })?;
        if data.len() != expected {
            return Err(AfterimageError::dimension_mismatch(format!(
                "expected {expected} bytes for {width}x{height} rgba8, got {}",
                data.len()
            )));
        }
        Ok(Self { desc, data })
    }

    /// Buffer filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> AfterimageResult<Self> {
        let mut out = Self::new(width, height)?;
        out.fill(rgba);
        Ok(out)
    }

    /// A 0x0 buffer. Never a valid pipeline source.
    pub fn empty() -> Self {
        Self {
            desc: FrameDesc::rgba8(0, 0),
            data: Vec::new(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Pixel layout.
    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    /// Size and format.
    pub fn desc(&self) -> FrameDesc {
        self.desc
    }

    /// `true` when the buffer covers at least one pixel.
    pub fn is_valid(&self) -> bool {
        !self.desc.is_empty() && Some(self.data.len()) == self.desc.byte_len()
    }

    /// Raw bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes. The length is fixed.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.desc.width || y >= self.desc.height {
            return None;
        }
        let idx = ((y as usize) * (self.desc.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Overwrite every pixel with `rgba`.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Byte-identical copy of `src` into `self`; both must share a descriptor.
    pub fn copy_from(&mut self, src: &FrameBuffer) -> AfterimageResult<()> {
        if self.desc != src.desc {
            return Err(AfterimageError::dimension_mismatch(format!(
                "copy {}x{} into {}x{}",
                src.desc.width, src.desc.height, self.desc.width, self.desc.height
            )));
        }
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    /// Become an exact copy of `src`, reshaping `self` when the descriptors differ.
    ///
    /// Reuses the existing allocation when it is large enough.
    pub fn assign_from(&mut self, src: &FrameBuffer) {
        if self.desc == src.desc {
            self.data.copy_from_slice(&src.data);
            return;
        }
        self.desc = src.desc;
        self.data.clear();
        self.data.extend_from_slice(&src.data);
    }

    /// Reshape to `desc`, zero-filled, when the current descriptor differs.
    pub(crate) fn reshape(&mut self, desc: FrameDesc) -> AfterimageResult<()> {
        if self.desc == desc {
            return Ok(());
        }
        *self = Self::with_desc(desc)?;
        Ok(())
    }

    /// Consume into raw bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Copy into an [`image::RgbaImage`].
    pub fn to_rgba_image(&self) -> AfterimageResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.desc.width, self.desc.height, self.data.clone())
            .ok_or_else(|| AfterimageError::dimension_mismatch("rgba image byte length"))
    }
}

impl From<image::RgbaImage> for FrameBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            desc: FrameDesc::rgba8(width, height),
            data: img.into_raw(),
        }
    }
}

/// Host depth buffer: one linear eye-space depth value per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthFrame {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthFrame {
    /// Wrap `width * height` depth samples.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> AfterimageResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| AfterimageError::resource_unavailable("depth buffer size overflow"))?;
        if data.len() != expected {
            return Err(AfterimageError::dimension_mismatch(format!(
                "expected {expected} depth samples for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Depth frame with every sample set to `depth`.
    pub fn uniform(width: u32, height: u32, depth: f32) -> AfterimageResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| AfterimageError::resource_unavailable("depth buffer size overflow"))?;
        Self::new(width, height, vec![depth; len])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// `true` when this depth frame lines up pixel-for-pixel with `desc`.
    pub fn matches(&self, desc: FrameDesc) -> bool {
        self.width == desc.width && self.height == desc.height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/frame.rs"]
mod tests;
