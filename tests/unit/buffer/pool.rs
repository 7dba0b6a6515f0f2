use super::*;

fn desc(w: u32, h: u32) -> FrameDesc {
    FrameDesc::rgba8(w, h)
}

#[test]
fn guard_releases_on_drop() {
    let pool = ScratchPool::default();
    {
        let a = pool.acquire(desc(4, 4)).unwrap();
        let b = pool.acquire(desc(4, 4)).unwrap();
        assert_eq!(a.desc(), desc(4, 4));
        assert_eq!(b.desc(), desc(4, 4));
        assert_eq!(pool.stats().live_buffers, 2);
    }
    let st = pool.stats();
    assert_eq!(st.acquired, 2);
    assert_eq!(st.released, 2);
    assert_eq!(st.live_buffers, 0);
    assert_eq!(st.live_bytes, 0);
    assert_eq!(st.retained_buffers, 2);
}

#[test]
fn released_buffers_are_reused() {
    let pool = ScratchPool::default();
    pool.acquire(desc(8, 8)).unwrap().release();
    let _again = pool.acquire(desc(8, 8)).unwrap();
    let st = pool.stats();
    assert_eq!(st.alloc_buffers, 1);
    assert_eq!(st.retained_buffers, 0);
}

#[test]
fn pool_honors_bucket_cap() {
    let pool = ScratchPool::new(ScratchPoolOpts {
        max_pool_bytes: 1 << 30,
        max_buffers_per_bucket: 1,
        max_live_bytes: None,
    });
    let a = pool.acquire(desc(8, 8)).unwrap();
    let b = pool.acquire(desc(8, 8)).unwrap();
    drop(a);
    drop(b);

    let st = pool.stats();
    assert_eq!(st.retained_buffers, 1);
    assert_eq!(st.dropped_on_release, 1);
}

#[test]
fn pool_honors_global_byte_cap() {
    let bytes_8x8 = desc(8, 8).byte_len().unwrap();
    let pool = ScratchPool::new(ScratchPoolOpts {
        max_pool_bytes: bytes_8x8,
        max_buffers_per_bucket: 8,
        max_live_bytes: None,
    });
    let a = pool.acquire(desc(8, 8)).unwrap();
    let b = pool.acquire(desc(8, 8)).unwrap();
    drop(a);
    drop(b);

    let st = pool.stats();
    assert_eq!(st.retained_bytes, bytes_8x8);
    assert_eq!(st.retained_buffers, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn live_budget_refuses_and_counts_failure() {
    let bytes = desc(4, 4).byte_len().unwrap();
    let pool = ScratchPool::new(ScratchPoolOpts {
        max_live_bytes: Some(bytes * 2),
        ..ScratchPoolOpts::default()
    });
    let a = pool.acquire(desc(4, 4)).unwrap();
    let b = pool.acquire(desc(4, 4)).unwrap();
    let err = pool.acquire(desc(4, 4)).err().unwrap();
    assert!(matches!(err, AfterimageError::ResourceUnavailable(_)));
    drop((a, b));

    let st = pool.stats();
    assert_eq!(st.failed, 1);
    assert_eq!(st.acquired, st.released);
    assert!(pool.acquire(desc(4, 4)).is_ok());
}

#[test]
fn zero_area_acquisition_fails() {
    let pool = ScratchPool::default();
    assert!(pool.acquire(desc(0, 4)).is_err());
    assert_eq!(pool.stats().failed, 1);
    assert_eq!(pool.stats().acquired, 0);
}

#[test]
fn clear_drops_retained_buffers() {
    let pool = ScratchPool::default();
    pool.acquire(desc(2, 2)).unwrap().release();
    assert_eq!(pool.stats().retained_buffers, 1);
    pool.clear();
    let st = pool.stats();
    assert_eq!(st.retained_buffers, 0);
    assert_eq!(st.retained_bytes, 0);
}
