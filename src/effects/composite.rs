use crate::buffer::frame::FrameBuffer;
use crate::foundation::error::{AfterimageError, AfterimageResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8_weight};

pub type Rgba8 = [u8; 4];

/// Per-channel `a * (1 - t) + b * t` in 8-bit fixed point.
///
/// `t = 0` returns `a` and `t = 1` returns `b` bit-exactly.
pub fn crossfade(a: Rgba8, b: Rgba8, t: f32) -> Rgba8 {
    crossfade_q8(a, b, unit_to_u8_weight(t))
}

fn crossfade_q8(a: Rgba8, b: Rgba8, tt: u16) -> Rgba8 {
    let it = 255u16 - tt;
    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = add_sat_u8(av, bv);
    }
    out
}

/// `dst = crossfade(a, b, t)` for every pixel.
pub fn crossfade_into(
    dst: &mut FrameBuffer,
    a: &FrameBuffer,
    b: &FrameBuffer,
    t: f32,
) -> AfterimageResult<()> {
    ensure_same_desc(dst, a, b, "crossfade_into")?;
    let tt = unit_to_u8_weight(t);
    if tt == 0 {
        return dst.copy_from(a);
    }
    if tt == 255 {
        return dst.copy_from(b);
    }
    for ((d, a), b) in dst
        .pixels_mut()
        .chunks_exact_mut(4)
        .zip(a.pixels().chunks_exact(4))
        .zip(b.pixels().chunks_exact(4))
    {
        let out = crossfade_q8([a[0], a[1], a[2], a[3]], [b[0], b[1], b[2], b[3]], tt);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// `dst = crossfade(a, b, weight(x, y))` with a weight evaluated per pixel.
pub fn crossfade_weighted_into<F>(
    dst: &mut FrameBuffer,
    a: &FrameBuffer,
    b: &FrameBuffer,
    mut weight: F,
) -> AfterimageResult<()>
where
    F: FnMut(u32, u32) -> f32,
{
    ensure_same_desc(dst, a, b, "crossfade_weighted_into")?;
    let width = dst.width();
    let height = dst.height();
    let (ap, bp) = (a.pixels(), b.pixels());
    let dp = dst.pixels_mut();
    for y in 0..height {
        for x in 0..width {
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let pa = [ap[idx], ap[idx + 1], ap[idx + 2], ap[idx + 3]];
            let pb = [bp[idx], bp[idx + 1], bp[idx + 2], bp[idx + 3]];
            let out = crossfade(pa, pb, weight(x, y));
            dp[idx..idx + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

fn ensure_same_desc(
    dst: &FrameBuffer,
    a: &FrameBuffer,
    b: &FrameBuffer,
    what: &str,
) -> AfterimageResult<()> {
    if dst.desc() != a.desc() || dst.desc() != b.desc() {
        return Err(AfterimageError::dimension_mismatch(format!(
            "{what} expects buffers of equal size ({}x{}, {}x{}, {}x{})",
            dst.width(),
            dst.height(),
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
