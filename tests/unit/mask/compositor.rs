use super::*;
use image::{GrayImage, Luma};

const BASE: [u8; 4] = [10, 20, 30, 255];
const EFFECT: [u8; 4] = [200, 150, 100, 255];

fn frames(w: u32, h: u32) -> (FrameBuffer, FrameBuffer, FrameBuffer) {
    (
        FrameBuffer::solid(w, h, BASE).unwrap(),
        FrameBuffer::solid(w, h, EFFECT).unwrap(),
        FrameBuffer::new(w, h).unwrap(),
    )
}

#[test]
fn missing_texture_keeps_effect() {
    let (base, effect, mut dst) = frames(3, 3);
    let src = MaskSource::Texture {
        texture: None,
        threshold: 0.5,
    };
    composite_mask(&base, &effect, &src, &mut dst).unwrap();
    assert_eq!(dst, effect);
}

#[test]
fn missing_or_mismatched_depth_keeps_effect() {
    let (base, effect, mut dst) = frames(3, 3);
    let none = MaskSource::Depth {
        depth: None,
        threshold: 0.5,
        softness: 0.0,
    };
    composite_mask(&base, &effect, &none, &mut dst).unwrap();
    assert_eq!(dst, effect);

    let wrong = DepthFrame::uniform(2, 2, 0.0).unwrap();
    let src = MaskSource::Depth {
        depth: Some(&wrong),
        threshold: 0.5,
        softness: 0.0,
    };
    dst.clear();
    composite_mask(&base, &effect, &src, &mut dst).unwrap();
    assert_eq!(dst, effect);
}

#[test]
fn texture_threshold_selects_per_pixel() {
    let (base, effect, mut dst) = frames(2, 1);
    let mut img = GrayImage::new(2, 1);
    img.put_pixel(0, 0, Luma([255]));
    img.put_pixel(1, 0, Luma([0]));
    let tex = LumaTexture::from_luma(img);
    let src = MaskSource::Texture {
        texture: Some(&tex),
        threshold: 0.5,
    };
    composite_mask(&base, &effect, &src, &mut dst).unwrap();
    assert_eq!(dst.pixel(0, 0), Some(EFFECT));
    assert_eq!(dst.pixel(1, 0), Some(BASE));
}

#[test]
fn texture_is_sampled_in_normalized_space() {
    // 1x1 white texture covers the whole frame regardless of size
    let (base, effect, mut dst) = frames(4, 3);
    let tex = LumaTexture::from_luma(GrayImage::from_pixel(1, 1, Luma([255])));
    let src = MaskSource::Texture {
        texture: Some(&tex),
        threshold: 1.0,
    };
    composite_mask(&base, &effect, &src, &mut dst).unwrap();
    assert_eq!(dst, effect);
}

#[test]
fn hard_depth_step_keeps_near_pixels() {
    let (base, effect, mut dst) = frames(2, 1);
    let depth = DepthFrame::new(2, 1, vec![0.2, 0.8]).unwrap();
    let src = MaskSource::Depth {
        depth: Some(&depth),
        threshold: 0.5,
        softness: 0.0,
    };
    composite_mask(&base, &effect, &src, &mut dst).unwrap();
    assert_eq!(dst.pixel(0, 0), Some(EFFECT));
    assert_eq!(dst.pixel(1, 0), Some(BASE));
}

#[test]
fn soft_depth_blends_around_threshold() {
    let (base, effect, mut dst) = frames(3, 1);
    let depth = DepthFrame::new(3, 1, vec![0.0, 0.5, 1.0]).unwrap();
    let src = MaskSource::Depth {
        depth: Some(&depth),
        threshold: 0.5,
        softness: 0.25,
    };
    composite_mask(&base, &effect, &src, &mut dst).unwrap();
    assert_eq!(dst.pixel(0, 0), Some(EFFECT));
    assert_eq!(dst.pixel(2, 0), Some(BASE));
    let mid = dst.pixel(1, 0).unwrap();
    assert!(mid[0] > BASE[0] && mid[0] < EFFECT[0]);
}
