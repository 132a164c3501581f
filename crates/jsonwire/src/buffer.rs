//! Pooled growable output buffer.
//!
//! A [`PoolBuffer`] owns one contiguous region drawn from a process-wide
//! pool and exposes a reserve/commit protocol over its writable tail. The
//! pool is shared and safe for concurrent acquire/recycle; a checked-out
//! region is single-owner. Storage returns to the pool zeroed, on exactly
//! one path: `Drop` (or the explicit [`release`](PoolBuffer::release)).

use std::sync::Mutex;

use crate::error::{Error, ErrorKind, Result};

/// Capacity floor for fresh and default-constructed buffers.
const MIN_CAPACITY: usize = 256;

/// Regions larger than this are dropped on recycle instead of retained.
const MAX_POOLED_REGION: usize = 1 << 20;

/// Retained free-list length cap.
const MAX_POOLED_REGIONS: usize = 16;

static POOL: Pool = Pool::new();

/// Process-wide free-list of zeroed regions. Exhaustion is not an error:
/// when no retained region fits, a fresh one is allocated.
struct Pool {
    regions: Mutex<Vec<Vec<u8>>>,
}

impl Pool {
    const fn new() -> Self {
        Self {
            regions: Mutex::new(Vec::new()),
        }
    }

    /// Returns a zeroed region with `len() >= min`. The caller must not
    /// assume an exact size.
    fn acquire(&self, min: usize) -> Vec<u8> {
        let mut regions = self.regions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(idx) = regions.iter().position(|r| r.len() >= min) {
            return regions.swap_remove(idx);
        }
        drop(regions);
        vec![0; min.max(MIN_CAPACITY)]
    }

    /// Accepts a fully zeroed region back. Oversized or surplus regions are
    /// dropped to bound retained memory.
    fn recycle(&self, region: Vec<u8>) {
        debug_assert!(region.iter().all(|&b| b == 0), "recycled region not zeroed");
        if region.len() > MAX_POOLED_REGION {
            return;
        }
        let mut regions = self.regions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if regions.len() < MAX_POOLED_REGIONS {
            regions.push(region);
        }
    }
}

/// A single-owner growable byte buffer backed by pooled storage.
///
/// The write cursor (`written_len`) is distinct from `capacity`:
/// [`reserve`](PoolBuffer::reserve) hands out the uncommitted tail and
/// [`commit`](PoolBuffer::commit) advances the cursor into it. Growth is
/// geometric — at least `max(requested, capacity)` additional bytes — so a
/// run of small reservations does not thrash the pool.
///
/// Use-after-release cannot be expressed: [`release`](PoolBuffer::release)
/// consumes the buffer, and `Drop` recycles through the same path.
#[derive(Debug)]
pub struct PoolBuffer {
    /// Fully initialized region; `len()` is the capacity.
    storage: Vec<u8>,
    written: usize,
    /// Length of the span handed out by the most recent `reserve`, consumed
    /// by `commit`.
    reserved: usize,
    /// Prefix of the region that may hold nonzero bytes: the committed
    /// prefix plus any tail handed out by `reserve`, whether or not it was
    /// committed. This is the extent that must be zeroed before the region
    /// reaches the pool.
    exposed: usize,
}

impl PoolBuffer {
    /// Acquires a buffer with the default minimum capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: POOL.acquire(MIN_CAPACITY),
            written: 0,
            reserved: 0,
            exposed: 0,
        }
    }

    /// Acquires a buffer with capacity of at least `capacity` bytes.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::BufferState`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::new(
                ErrorKind::BufferState("zero-sized capacity request"),
                0,
            ));
        }
        Ok(Self {
            storage: POOL.acquire(capacity),
            written: 0,
            reserved: 0,
            exposed: 0,
        })
    }

    /// Total capacity of the backing region.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of committed bytes.
    #[must_use]
    pub fn written_len(&self) -> usize {
        self.written
    }

    /// Read-only view of everything committed so far.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.storage[..self.written]
    }

    /// Returns a writable span of at least `min` bytes past the cursor,
    /// growing the backing region if the free tail is too small. The span
    /// may be longer than requested; only bytes subsequently passed to
    /// [`commit`](PoolBuffer::commit) become part of the output.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::BufferState`] if `min` is zero.
    pub fn reserve(&mut self, min: usize) -> Result<&mut [u8]> {
        if min == 0 {
            return Err(Error::new(
                ErrorKind::BufferState("zero-sized reservation request"),
                self.written,
            ));
        }
        if min > self.storage.len() - self.written {
            self.grow(min);
        }
        self.reserved = self.storage.len() - self.written;
        // The caller may scribble anywhere in the span regardless of what
        // it later commits.
        self.exposed = self.storage.len();
        Ok(&mut self.storage[self.written..])
    }

    /// Advances the write cursor by `n` bytes of the most recently reserved
    /// span.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::BufferState`] if `n` exceeds the span returned by the
    /// last [`reserve`](PoolBuffer::reserve).
    pub fn commit(&mut self, n: usize) -> Result<()> {
        if n > self.reserved {
            return Err(Error::new(
                ErrorKind::BufferState("commit exceeds the reserved span"),
                self.written,
            ));
        }
        self.written += n;
        self.reserved = 0;
        Ok(())
    }

    /// Resets the cursor to zero without releasing storage, zeroing every
    /// byte that was written or handed out before reuse.
    pub fn clear(&mut self) {
        self.storage[..self.exposed].fill(0);
        self.written = 0;
        self.reserved = 0;
        self.exposed = 0;
    }

    /// Returns the storage to the pool. Equivalent to dropping, made
    /// explicit for callers that want a visible teardown point.
    pub fn release(self) {
        drop(self);
    }

    /// Appends `bytes` through the reserve/commit protocol.
    pub(crate) fn push_slice(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        // Infallible: len > 0 and both error paths are unreachable here.
        let span = self
            .reserve(bytes.len())
            .unwrap_or_else(|_| unreachable!("non-zero reserve"));
        span[..bytes.len()].copy_from_slice(bytes);
        let _ = self.commit(bytes.len());
    }

    pub(crate) fn push_byte(&mut self, byte: u8) {
        self.push_slice(&[byte]);
    }

    fn grow(&mut self, min: usize) {
        let capacity = self.storage.len();
        let new_capacity = capacity + min.max(capacity);
        let mut next = POOL.acquire(new_capacity);
        next[..self.written].copy_from_slice(&self.storage[..self.written]);
        let old = std::mem::replace(&mut self.storage, next);
        recycle_zeroed(old, self.exposed);
        // Only the committed prefix carried over; reserve re-extends this
        // when it hands out the new tail.
        self.exposed = self.written;
    }
}

impl Default for PoolBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PoolBuffer {
    fn drop(&mut self) {
        let region = std::mem::take(&mut self.storage);
        recycle_zeroed(region, self.exposed);
    }
}

fn recycle_zeroed(mut region: Vec<u8>, dirty: usize) {
    if region.is_empty() {
        return;
    }
    let n = dirty.min(region.len());
    region[..n].fill(0);
    POOL.recycle(region);
}

impl core::fmt::Write for PoolBuffer {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.push_slice(s.as_bytes());
        Ok(())
    }
}
