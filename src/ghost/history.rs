use crate::buffer::frame::{FrameBuffer, FrameDesc};
use crate::config::params::{GhostParams, MAX_GHOST_FRAMES};
use crate::foundation::error::{AfterimageError, AfterimageResult};
use crate::foundation::math::wrap_index;
use smallvec::SmallVec;

/// Seeding state of the ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostState {
    /// Allocated (or not yet allocated) but holding no captured frame.
    Uninitialized,
    /// Every slot holds a captured frame.
    Seeded,
}

/// Fixed-capacity ring of past processed frames plus the weighted composite built from it.
///
/// The buffers persist across frames and are only recreated when the frame size or the ring
/// depth changes.
#[derive(Debug)]
pub struct GhostHistory {
    desc: FrameDesc,
    ring: Vec<FrameBuffer>,
    composite: FrameBuffer,
    accum: Vec<f32>,
    write_index: usize,
    counter: u32,
    state: GhostState,
    max_bytes: Option<usize>,
}

impl Default for GhostHistory {
    fn default() -> Self {
        Self::new(None)
    }
}

impl GhostHistory {
    /// `max_bytes` bounds the ring, the composite and the float accumulator; allocations above
    /// it fail.
    pub fn new(max_bytes: Option<usize>) -> Self {
        Self {
            desc: FrameDesc::rgba8(0, 0),
            ring: Vec::new(),
            composite: FrameBuffer::empty(),
            accum: Vec::new(),
            write_index: 0,
            counter: 0,
            state: GhostState::Uninitialized,
            max_bytes,
        }
    }

    pub fn set_max_bytes(&mut self, max_bytes: Option<usize>) {
        self.max_bytes = max_bytes;
    }

    /// Makes the ring match `width`x`height` with `clamp(frame_count, 1, 16)` slots.
    ///
    /// Returns `Ok(true)` when it had to reallocate, which also drops the seed. On error the
    /// ring is left released and unseeded.
    pub fn ensure_capacity(
        &mut self,
        width: u32,
        height: u32,
        frame_count: usize,
    ) -> AfterimageResult<bool> {
        let n = frame_count.clamp(1, MAX_GHOST_FRAMES as usize);
        let desc = FrameDesc::rgba8(width, height);
        if self.ring.len() == n && self.desc == desc {
            return Ok(false);
        }

        self.release();
        if desc.is_empty() {
            return Err(AfterimageError::validation(format!(
                "ghost ring needs a non-empty frame, got {width}x{height}"
            )));
        }
        let frame_bytes = desc.byte_len().ok_or_else(|| {
            AfterimageError::resource_unavailable(format!(
                "ghost frame size overflow ({width}x{height})"
            ))
        })?;
        let total = frame_bytes
            .checked_mul(n + 1)
            .and_then(|rgba| {
                frame_bytes
                    .checked_mul(std::mem::size_of::<f32>())
                    .and_then(|accum| rgba.checked_add(accum))
            })
            .ok_or_else(|| AfterimageError::resource_unavailable("ghost ring size overflow"))?;
        if let Some(max) = self.max_bytes
            && total > max
        {
            return Err(AfterimageError::resource_unavailable(format!(
                "ghost ring needs {total} bytes, budget is {max}"
            )));
        }

        let mut ring = Vec::with_capacity(n);
        for _ in 0..n {
            ring.push(FrameBuffer::with_desc(desc)?);
        }
        let composite = FrameBuffer::with_desc(desc)?;

        tracing::debug!(width, height, slots = n, bytes = total, "ghost ring reallocated");
        self.desc = desc;
        self.ring = ring;
        self.composite = composite;
        self.accum = vec![0.0; frame_bytes];
        Ok(true)
    }

    /// Drops every persistent buffer and returns to `Uninitialized`.
    pub fn release(&mut self) {
        self.desc = FrameDesc::rgba8(0, 0);
        self.ring = Vec::new();
        self.composite = FrameBuffer::empty();
        self.accum = Vec::new();
        self.write_index = 0;
        self.counter = 0;
        self.state = GhostState::Uninitialized;
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn is_seeded(&self) -> bool {
        self.state == GhostState::Seeded
    }

    /// Number of ring slots.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Slot the next capture overwrites.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Frames skipped since the last capture.
    pub fn capture_counter(&self) -> u32 {
        self.counter
    }

    pub fn desc(&self) -> FrameDesc {
        self.desc
    }

    /// Slot holding the frame `k` captures before the most recent one.
    pub fn slot_index(&self, k: usize) -> usize {
        let n = self.ring.len();
        let k = i64::try_from(k).unwrap_or(i64::MAX);
        let wi = i64::try_from(self.write_index).unwrap_or(0);
        wrap_index(wi.saturating_sub(1).saturating_sub(k), n)
    }

    pub fn slot(&self, index: usize) -> Option<&FrameBuffer> {
        self.ring.get(index)
    }

    pub fn composite(&self) -> &FrameBuffer {
        &self.composite
    }

    /// The composite, only once the ring has been seeded.
    pub fn seeded_composite(&self) -> Option<&FrameBuffer> {
        self.is_seeded().then_some(&self.composite)
    }

    /// Rebuilds the weighted composite for this frame.
    ///
    /// Rank `r` (0 = most recent gathered slot) weighs `((count - r) / count) ^ weight_curve`,
    /// normalized to sum to one.
    pub fn build_composite(&mut self, params: &GhostParams) {
        if !self.is_seeded() || !params.enabled || params.blend <= 0.0 || self.ring.is_empty() {
            self.composite.clear();
            return;
        }

        let n = self.ring.len();
        let start = (params.start_delay as usize).min(n - 1);
        let gathered: SmallVec<[usize; MAX_GHOST_FRAMES as usize]> = (start..n)
            .take(MAX_GHOST_FRAMES as usize)
            .map(|k| self.slot_index(k))
            .collect();

        let count = gathered.len() as f32;
        let curve = if params.weight_curve.is_finite() {
            params.weight_curve.max(0.0)
        } else {
            1.0
        };
        let mut weights: SmallVec<[f32; MAX_GHOST_FRAMES as usize]> = (0..gathered.len())
            .map(|r| ((count - r as f32) / count).powf(curve))
            .collect();
        let sum: f32 = weights.iter().sum();
        if sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= sum);
        }

        self.accum.fill(0.0);
        for (&idx, &w) in gathered.iter().zip(weights.iter()) {
            for (acc, &px) in self.accum.iter_mut().zip(self.ring[idx].pixels()) {
                *acc += w * f32::from(px);
            }
        }
        for (dst, &acc) in self.composite.pixels_mut().iter_mut().zip(self.accum.iter()) {
            *dst = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Records `frame` into the ring.
    ///
    /// The first capture seeds every slot and the composite. After that a frame is written once
    /// every `capture_interval + 1` calls.
    pub fn capture(&mut self, frame: &FrameBuffer, capture_interval: u32) {
        if self.ring.is_empty() {
            return;
        }
        if frame.desc() != self.desc {
            tracing::debug!(
                frame_w = frame.width(),
                frame_h = frame.height(),
                ring_w = self.desc.width,
                ring_h = self.desc.height,
                "ghost capture skipped: size mismatch"
            );
            return;
        }

        if self.state == GhostState::Uninitialized {
            for slot in &mut self.ring {
                slot.pixels_mut().copy_from_slice(frame.pixels());
            }
            self.composite.pixels_mut().copy_from_slice(frame.pixels());
            self.write_index = 0;
            self.counter = 0;
            self.state = GhostState::Seeded;
            tracing::debug!(slots = self.ring.len(), "ghost ring seeded");
            return;
        }

        if self.counter < capture_interval {
            self.counter += 1;
            return;
        }
        self.counter = 0;
        let wi = self.write_index;
        self.ring[wi].pixels_mut().copy_from_slice(frame.pixels());
        self.write_index = (wi + 1) % self.ring.len();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ghost/history.rs"]
mod tests;
