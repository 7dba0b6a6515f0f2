use super::*;
use crate::stages::binding::GridParams;
use std::cell::Cell;
use std::rc::Rc;

fn grid_binding() -> StageBinding<'static> {
    StageBinding::SamplingGrid {
        grid: GridParams {
            pixel_size: 2,
            virtual_resolution: None,
        },
    }
}

#[test]
fn unbound_stage_copies() {
    let reg = StageRegistry::new();
    let src = FrameBuffer::solid(3, 2, [9, 8, 7, 255]).unwrap();
    let mut dst = FrameBuffer::new(3, 2).unwrap();
    let out = reg
        .run(StageKind::SamplingGrid, Some(&grid_binding()), &src, &mut dst)
        .unwrap();
    assert_eq!(out, StageOutcome::Passthrough);
    assert_eq!(dst, src);
}

#[test]
fn bound_stage_without_binding_is_not_invoked() {
    let calls = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&calls);
    let mut reg = StageRegistry::new();
    reg.bind_fn(StageKind::SamplingGrid, move |_src, dst, _b| {
        seen.set(seen.get() + 1);
        dst.fill([255, 0, 0, 255]);
        Ok(())
    });

    let src = FrameBuffer::solid(2, 2, [1, 2, 3, 4]).unwrap();
    let mut dst = FrameBuffer::new(2, 2).unwrap();
    let out = reg.run(StageKind::SamplingGrid, None, &src, &mut dst).unwrap();
    assert_eq!(out, StageOutcome::Passthrough);
    assert_eq!(dst, src);
    assert_eq!(calls.get(), 0);

    let out = reg
        .run(StageKind::SamplingGrid, Some(&grid_binding()), &src, &mut dst)
        .unwrap();
    assert_eq!(out, StageOutcome::Applied);
    assert_eq!(dst.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(calls.get(), 1);
}

#[test]
fn transform_errors_propagate() {
    let mut reg = StageRegistry::new();
    reg.bind_fn(StageKind::SamplingGrid, |_src, _dst, _b| {
        Err(crate::AfterimageError::evaluation("boom"))
    });
    let src = FrameBuffer::new(1, 1).unwrap();
    let mut dst = FrameBuffer::new(1, 1).unwrap();
    let err = reg
        .run(StageKind::SamplingGrid, Some(&grid_binding()), &src, &mut dst)
        .unwrap_err();
    assert!(err.to_string().starts_with("evaluation error:"));
}

#[test]
fn bind_and_unbind_track_slots() {
    let mut reg = StageRegistry::new();
    reg.bind_fn(StageKind::Dithering, |src, dst, _b| dst.copy_from(src));
    reg.bind_fn(StageKind::Pregrade, |src, dst, _b| dst.copy_from(src));
    assert_eq!(
        reg.bound_kinds().collect::<Vec<_>>(),
        vec![StageKind::Pregrade, StageKind::Dithering]
    );
    assert!(reg.unbind(StageKind::Pregrade).is_some());
    assert!(!reg.is_bound(StageKind::Pregrade));
    assert!(reg.unbind(StageKind::Pregrade).is_none());
    assert!(reg.is_bound(StageKind::Dithering));
}
