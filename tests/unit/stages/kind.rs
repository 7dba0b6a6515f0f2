use super::*;

#[test]
fn order_matches_discriminants() {
    for (i, kind) in StageKind::ORDER.iter().enumerate() {
        assert_eq!(kind.index(), i);
    }
    assert_eq!(StageKind::ORDER.first(), Some(&StageKind::SamplingGrid));
    assert_eq!(StageKind::ORDER.last(), Some(&StageKind::EdgeOutline));
}

#[test]
fn ghosting_runs_after_jitter_and_before_tone() {
    let pos = |k: StageKind| StageKind::ORDER.iter().position(|x| *x == k).unwrap();
    assert!(pos(StageKind::ChannelJitter) < pos(StageKind::Ghosting));
    assert!(pos(StageKind::Ghosting) < pos(StageKind::PosterizeTone));
    assert!(pos(StageKind::PosterizeTone) < pos(StageKind::Dithering));
    assert!(pos(StageKind::Dithering) < pos(StageKind::PaletteMapping));
}

#[test]
fn only_sampling_and_pregrade_are_prefix() {
    let prefix: Vec<_> = StageKind::ORDER.into_iter().filter(|k| k.is_prefix()).collect();
    assert_eq!(prefix, vec![StageKind::SamplingGrid, StageKind::Pregrade]);
}

#[test]
fn names_are_unique() {
    let mut names: Vec<_> = StageKind::ORDER.iter().map(|k| k.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), StageKind::COUNT);
    assert_eq!(StageKind::Ghosting.to_string(), "ghosting");
}
