use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn mul_div255_by_full_weight_is_exact() {
    for x in 0u16..=255 {
        assert_eq!(u16::from(mul_div255_u8(x, 255)), x);
    }
}

#[test]
fn unit_weight_handles_out_of_range_and_nan() {
    assert_eq!(unit_to_u8_weight(-1.0), 0);
    assert_eq!(unit_to_u8_weight(2.0), 255);
    assert_eq!(unit_to_u8_weight(f32::NAN), 0);
    assert_eq!(unit_to_u8_weight(0.5), 128);
}

#[test]
fn smoothstep_is_clamped_at_edges() {
    assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
    assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn wrap_index_handles_negative_offsets() {
    assert_eq!(wrap_index(-1, 4), 3);
    assert_eq!(wrap_index(-5, 4), 3);
    assert_eq!(wrap_index(4, 4), 0);
    assert_eq!(wrap_index(7, 1), 0);
    assert_eq!(wrap_index(-3, 0), 0);
}

#[test]
fn byte_len_detects_overflow() {
    assert_eq!(byte_len_rgba8(2, 3), Some(24));
    assert!(byte_len_rgba8(u32::MAX, u32::MAX).is_none());
}
