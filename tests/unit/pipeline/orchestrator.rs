use super::*;
use crate::config::curve::{CurveKey, ResponseCurve};

#[test]
fn new_pipeline_is_inactive_and_unbaked() {
    let p = Pipeline::new(PipelineConfig::default());
    assert!(!p.is_active());
    assert!(p.curve_lut().is_none());
    assert!(!p.requires_depth());
}

#[test]
fn activation_bakes_the_curve_once_per_fingerprint() {
    let mut cfg = PipelineConfig::default();
    let mut p = Pipeline::new(cfg.clone());
    p.activate();
    let first = p.curve_fingerprint;
    assert!(first.is_some());
    assert_eq!(p.curve_lut().unwrap().lookup(255), 1.0);

    cfg.ghost.blend = 0.8;
    p.configure(cfg.clone());
    assert_eq!(p.curve_fingerprint, first);

    cfg.palette.curve = ResponseCurve {
        keys: vec![
            CurveKey { t: 0.0, value: 1.0 },
            CurveKey { t: 1.0, value: 0.0 },
        ],
    };
    p.configure(cfg);
    assert_ne!(p.curve_fingerprint, first);
    assert_eq!(p.curve_lut().unwrap().lookup(0), 1.0);
    assert_eq!(p.curve_lut().unwrap().lookup(255), 0.0);
}

#[test]
fn configure_sanitizes_and_tracks_depth_requirement() {
    let mut p = Pipeline::new(PipelineConfig::default());
    p.activate();
    let mut cfg = PipelineConfig::default();
    cfg.edges.enabled = true;
    cfg.master.blend = 3.0;
    p.configure(cfg);
    assert!(p.requires_depth());
    assert_eq!(p.config().master.blend, 1.0);
}

#[test]
fn frame_input_builders() {
    let color = FrameBuffer::new(2, 2).unwrap();
    let depth = DepthFrame::uniform(2, 2, 0.5).unwrap();
    let input = FrameInput::new(&color).with_depth(&depth).at_time(1.25);
    assert!(input.depth.is_some());
    assert_eq!(input.time_secs, 1.25);
}

#[test]
fn deactivate_releases_persistent_state() {
    let mut cfg = PipelineConfig::default();
    cfg.ghost.enabled = true;
    let mut p = Pipeline::new(cfg);
    p.activate();
    let src = FrameBuffer::solid(4, 4, [1, 2, 3, 255]).unwrap();
    p.process(FrameInput::new(&src));
    assert!(p.ghost().is_seeded());
    assert!(p.pool_stats().retained_buffers > 0);

    p.deactivate();
    assert!(p.ghost().is_empty());
    assert!(p.curve_lut().is_none());
    assert_eq!(p.pool_stats().retained_buffers, 0);
}

#[test]
fn bypassed_frames_leave_the_frame_index_alone() {
    let mut p = Pipeline::new(PipelineConfig::default());
    let src = FrameBuffer::solid(2, 2, [5, 6, 7, 255]).unwrap();
    p.process(FrameInput::new(&src));
    assert_eq!(p.frame_index(), 0);

    p.activate();
    p.process(FrameInput::new(&FrameBuffer::empty()));
    assert_eq!(p.frame_index(), 0);
    assert_eq!(p.stats().frames_bypassed, 2);

    p.process(FrameInput::new(&src));
    assert_eq!(p.frame_index(), 1);
}
