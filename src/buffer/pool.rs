use crate::buffer::frame::{FrameBuffer, FrameDesc};
use crate::foundation::error::{AfterimageError, AfterimageResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// Retention and budget policy for per-frame scratch buffers.
#[derive(Debug, Clone, Copy)]
pub struct ScratchPoolOpts {
    /// Maximum bytes retained across all buckets between frames.
    pub max_pool_bytes: usize,
    /// Maximum number of retained buffers per `(w,h,format)` bucket.
    pub max_buffers_per_bucket: usize,
    /// Upper bound on bytes handed out at the same time. `None` disables the check.
    pub max_live_bytes: Option<usize>,
}

impl Default for ScratchPoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 256 * 1024 * 1024,
            // a, b, and the mask anchor
            max_buffers_per_bucket: 4,
            max_live_bytes: None,
        }
    }
}

/// Pool counters. `acquired == released` whenever no guard is alive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScratchPoolStats {
    /// Successful acquisitions.
    pub acquired: u64,
    /// Releases (one per successful acquisition).
    pub released: u64,
    /// Acquisitions refused by the live budget or by allocation failure.
    pub failed: u64,
    /// Fresh allocations (pool misses).
    pub alloc_buffers: u64,
    /// Bytes of fresh allocations.
    pub alloc_bytes: u64,
    /// Buffers currently handed out.
    pub live_buffers: usize,
    /// Bytes currently handed out.
    pub live_bytes: usize,
    /// Buffers parked for reuse.
    pub retained_buffers: usize,
    /// Bytes parked for reuse.
    pub retained_bytes: usize,
    /// Released buffers dropped instead of parked.
    pub dropped_on_release: u64,
}

struct Bucket {
    key: FrameDesc,
    buffers: Vec<FrameBuffer>,
}

struct PoolState {
    opts: ScratchPoolOpts,
    stats: ScratchPoolStats,
    // Hash lookup is acceptable here: this is per stage chain, not per pixel.
    bucket_idx_by_key: HashMap<FrameDesc, usize>,
    buckets: Vec<Bucket>,
}

/// Bounded pool of per-frame scratch buffers.
///
/// Buffers are handed out as [`ScratchBuffer`] guards that give themselves back on drop, so every
/// exit path of a frame (early return, `?`, degraded passthrough) releases exactly what it
/// acquired. Persistent ghost-history buffers never come from here.
pub struct ScratchPool {
    state: RefCell<PoolState>,
}

impl ScratchPool {
    /// Create an empty pool.
    pub fn new(opts: ScratchPoolOpts) -> Self {
        Self {
            state: RefCell::new(PoolState {
                opts,
                stats: ScratchPoolStats::default(),
                bucket_idx_by_key: HashMap::new(),
                buckets: Vec::new(),
            }),
        }
    }

    /// Current options.
    pub fn opts(&self) -> ScratchPoolOpts {
        self.state.borrow().opts
    }

    /// Replace the options. Already retained buffers are kept.
    pub fn set_opts(&self, opts: ScratchPoolOpts) {
        self.state.borrow_mut().opts = opts;
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> ScratchPoolStats {
        self.state.borrow().stats.clone()
    }

    /// Hand out a buffer matching `desc`. Its contents are unspecified.
    pub fn acquire(&self, desc: FrameDesc) -> AfterimageResult<ScratchBuffer<'_>> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let bytes = match desc.byte_len() {
            Some(b) if !desc.is_empty() => b,
            _ => {
                st.stats.failed = st.stats.failed.saturating_add(1);
                return Err(AfterimageError::resource_unavailable(format!(
                    "cannot acquire scratch buffer {}x{}",
                    desc.width, desc.height
                )));
            }
        };

        if let Some(cap) = st.opts.max_live_bytes
            && st.stats.live_bytes.saturating_add(bytes) > cap
        {
            st.stats.failed = st.stats.failed.saturating_add(1);
            return Err(AfterimageError::resource_unavailable(format!(
                "scratch budget exhausted ({} live + {bytes} > {cap} bytes)",
                st.stats.live_bytes
            )));
        }

        let reused = match st.bucket_idx_by_key.get(&desc).copied() {
            Some(bi) => st.buckets[bi].buffers.pop(),
            None => None,
        };
        let buffer = match reused {
            Some(buf) => {
                st.stats.retained_buffers = st.stats.retained_buffers.saturating_sub(1);
                st.stats.retained_bytes = st.stats.retained_bytes.saturating_sub(bytes);
                buf
            }
            None => match FrameBuffer::with_desc(desc) {
                Ok(buf) => {
                    st.stats.alloc_buffers = st.stats.alloc_buffers.saturating_add(1);
                    st.stats.alloc_bytes = st.stats.alloc_bytes.saturating_add(bytes as u64);
                    buf
                }
                Err(err) => {
                    st.stats.failed = st.stats.failed.saturating_add(1);
                    return Err(err);
                }
            },
        };

        st.stats.acquired = st.stats.acquired.saturating_add(1);
        st.stats.live_buffers = st.stats.live_buffers.saturating_add(1);
        st.stats.live_bytes = st.stats.live_bytes.saturating_add(bytes);
        Ok(ScratchBuffer { pool: self, buffer })
    }

    /// Drop every retained buffer.
    pub fn clear(&self) {
        let mut st = self.state.borrow_mut();
        st.buckets.clear();
        st.bucket_idx_by_key.clear();
        st.stats.retained_buffers = 0;
        st.stats.retained_bytes = 0;
    }

    fn give_back(&self, buffer: FrameBuffer) {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let key = buffer.desc();
        let bytes = key.byte_len().unwrap_or(0);

        st.stats.released = st.stats.released.saturating_add(1);
        st.stats.live_buffers = st.stats.live_buffers.saturating_sub(1);
        st.stats.live_bytes = st.stats.live_bytes.saturating_sub(bytes);

        if st.opts.max_pool_bytes == 0 || st.opts.max_buffers_per_bucket == 0 {
            st.stats.dropped_on_release = st.stats.dropped_on_release.saturating_add(1);
            return;
        }
        if st.stats.retained_bytes.saturating_add(bytes) > st.opts.max_pool_bytes {
            st.stats.dropped_on_release = st.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bi = match st.bucket_idx_by_key.get(&key).copied() {
            Some(i) => i,
            None => {
                let i = st.buckets.len();
                st.buckets.push(Bucket {
                    key,
                    buffers: Vec::new(),
                });
                st.bucket_idx_by_key.insert(key, i);
                i
            }
        };

        let cap = st.opts.max_buffers_per_bucket;
        let bucket = &mut st.buckets[bi];
        debug_assert_eq!(bucket.key, key);
        if bucket.buffers.len() >= cap {
            st.stats.dropped_on_release = st.stats.dropped_on_release.saturating_add(1);
            return;
        }
        bucket.buffers.push(buffer);
        st.stats.retained_buffers = st.stats.retained_buffers.saturating_add(1);
        st.stats.retained_bytes = st.stats.retained_bytes.saturating_add(bytes);
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(ScratchPoolOpts::default())
    }
}

/// A scratch buffer on loan from a [`ScratchPool`]. Returned to the pool when dropped.
pub struct ScratchBuffer<'p> {
    pool: &'p ScratchPool,
    buffer: FrameBuffer,
}

impl ScratchBuffer<'_> {
    /// Give the buffer back now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for ScratchBuffer<'_> {
    type Target = FrameBuffer;

    fn deref(&self) -> &FrameBuffer {
        &self.buffer
    }
}

impl DerefMut for ScratchBuffer<'_> {
    fn deref_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }
}

impl Drop for ScratchBuffer<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::replace(&mut self.buffer, FrameBuffer::empty());
        self.pool.give_back(buffer);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/pool.rs"]
mod tests;
