use super::*;

#[test]
fn defaults_need_no_correction() {
    let mut cfg = PipelineConfig::default();
    assert_eq!(cfg.sanitize(), 0);
    assert_eq!(cfg, PipelineConfig::default());
}

#[test]
fn out_of_range_values_are_clamped_not_rejected() {
    let mut cfg = PipelineConfig::default();
    cfg.ghost.frames = 0;
    cfg.ghost.capture_interval = 99;
    cfg.ghost.weight_curve = 100.0;
    cfg.pregrade.gamma = 0.0;
    cfg.master.blend = f32::NAN;
    cfg.sampling.pixel_size = 0;

    let fixed = cfg.sanitize();
    assert_eq!(fixed, 6);
    assert_eq!(cfg.ghost.frames, 1);
    assert_eq!(cfg.ghost.capture_interval, 8);
    assert_eq!(cfg.ghost.weight_curve, 4.0);
    assert_eq!(cfg.pregrade.gamma, 0.1);
    assert_eq!(cfg.master.blend, 0.0);
    assert_eq!(cfg.sampling.pixel_size, 1);
}

#[test]
fn ghost_frame_count_is_clamped() {
    let mut cfg = PipelineConfig::default();
    cfg.ghost.frames = 40;
    assert_eq!(cfg.ghost_frame_count(), 16);
    cfg.ghost.frames = 0;
    assert_eq!(cfg.ghost_frame_count(), 1);
}

#[test]
fn partial_json_fills_defaults_and_sanitizes() {
    let cfg = PipelineConfig::from_json_value(serde_json::json!({
        "ghost": { "enabled": true, "frames": 32, "combine_mode": "Max" },
        "dither": { "mode": "Ordered4x4", "strength": 0.5 },
        "master": { "blend": 0.75 }
    }))
    .unwrap();
    assert!(cfg.ghost.enabled);
    assert_eq!(cfg.ghost.frames, 16);
    assert_eq!(cfg.ghost.combine_mode, GhostCombineMode::Max);
    assert_eq!(cfg.ghost.blend, 0.35);
    assert_eq!(cfg.dither.mode, DitherMode::Ordered4x4);
    assert_eq!(cfg.master.blend, 0.75);
    assert_eq!(cfg.pregrade, PregradeParams::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = PipelineConfig::from_json_str("{ \"ghost\": { \"frames\": \"many\" } }").unwrap_err();
    assert!(matches!(err, crate::AfterimageError::Serde(_)));
}

#[test]
fn depth_requirement_follows_depth_mask_and_edges() {
    let mut cfg = PipelineConfig::default();
    assert!(!cfg.requires_depth());
    cfg.edges.enabled = true;
    assert!(cfg.requires_depth());
    cfg.edges.enabled = false;
    cfg.depth_mask.enabled = true;
    assert!(cfg.requires_depth());
    assert!(cfg.any_mask_enabled());
}

#[test]
fn non_finite_vectors_are_zeroed() {
    let mut cfg = PipelineConfig::default();
    cfg.ghost.offset_px = Vec2::new(f64::INFINITY, 2.0);
    assert_eq!(cfg.sanitize(), 1);
    assert_eq!(cfg.ghost.offset_px, Vec2::new(0.0, 2.0));
}
