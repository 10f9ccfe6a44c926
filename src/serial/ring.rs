//! Lock-free byte ring shared between one producer and one consumer context.
//!
//! This is a Lamport queue: the producer only ever writes `put`, the consumer
//! only ever writes `get`, and each side publishes its index with a release
//! store after touching the data slot. One slot is sacrificed so that
//! `put == get` always means empty, giving `C - 1` usable bytes.
//!
//! The single producer / single consumer rule is enforced by
//! [`RingBuffer::split`], which hands out exactly one [`Producer`] and one
//! [`Consumer`] and holds the ring exclusively borrowed while they live. Either
//! end may be moved into interrupt context.

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity byte ring with `C` slots.
pub struct RingBuffer<const C: usize> {
    data: [UnsafeCell<u8>; C],
    /// Next slot to read. Written by the consumer only.
    get: AtomicUsize,
    /// Next slot to write. Written by the producer only.
    put: AtomicUsize,
}

// SAFETY: slot access is coordinated through `get`/`put` as described in the
// module docs, and only the split endpoints touch the slots.
unsafe impl<const C: usize> Sync for RingBuffer<C> {}

impl<const C: usize> RingBuffer<C> {
    /// Empty ring.
    pub const fn new() -> Self {
        assert!(C >= 2, "ring needs at least two slots");
        Self {
            data: [const { UnsafeCell::new(0) }; C],
            get: AtomicUsize::new(0),
            put: AtomicUsize::new(0),
        }
    }

    /// Usable capacity (`C - 1`).
    pub const fn capacity(&self) -> usize {
        C - 1
    }

    /// Break the ring into its two endpoints.
    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        let ring = RingRef {
            data: &self.data,
            get: &self.get,
            put: &self.put,
        };
        (Producer { ring }, Consumer { ring })
    }

    /// Read-only view of the indices.
    pub fn indices(&self) -> RingIndices<'_> {
        RingIndices {
            get: &self.get,
            put: &self.put,
            slots: C,
        }
    }
}

impl<const C: usize> Default for RingBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> fmt::Debug for RingBuffer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.indices(), f)
    }
}

#[derive(Copy, Clone)]
struct RingRef<'r> {
    data: &'r [UnsafeCell<u8>],
    get: &'r AtomicUsize,
    put: &'r AtomicUsize,
}

impl RingRef<'_> {
    fn next(&self, i: usize) -> usize {
        if i + 1 == self.data.len() { 0 } else { i + 1 }
    }

    fn indices(&self) -> RingIndices<'_> {
        RingIndices {
            get: self.get,
            put: self.put,
            slots: self.data.len(),
        }
    }
}

/// Writing end of a ring.
pub struct Producer<'r> {
    ring: RingRef<'r>,
}

// SAFETY: the producer is the only writer of `put` and of the free slots, so
// moving it to another context (e.g. an interrupt handler) keeps that true.
unsafe impl Send for Producer<'_> {}

impl<'r> Producer<'r> {
    /// Append `byte`. Returns `false` and drops the byte if the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        let put = self.ring.put.load(Ordering::Relaxed);
        let next = self.ring.next(put);
        if next == self.ring.get.load(Ordering::Acquire) {
            return false;
        }
        // SAFETY: slot `put` is outside `get..put`, so the consumer does not
        // read it until the store below publishes it.
        unsafe {
            *self.ring.data[put].get() = byte;
        }
        self.ring.put.store(next, Ordering::Release);
        true
    }

    /// True if a push would fail.
    pub fn is_full(&self) -> bool {
        self.ring.indices().is_full()
    }

    /// True if the consumer has drained everything.
    pub fn is_empty(&self) -> bool {
        self.ring.indices().is_empty()
    }

    /// Read-only view of the indices.
    pub fn indices(&self) -> RingIndices<'r> {
        RingIndices {
            get: self.ring.get,
            put: self.ring.put,
            slots: self.ring.data.len(),
        }
    }
}

impl fmt::Debug for Producer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(&self.indices()).finish()
    }
}

/// Reading end of a ring.
pub struct Consumer<'r> {
    ring: RingRef<'r>,
}

// SAFETY: the consumer is the only writer of `get` and the only reader of the
// filled slots.
unsafe impl Send for Consumer<'_> {}

impl<'r> Consumer<'r> {
    /// Remove the oldest byte, if any.
    pub fn pop(&mut self) -> Option<u8> {
        let get = self.ring.get.load(Ordering::Relaxed);
        if get == self.ring.put.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: slot `get` lies in `get..put`, published by the producer's
        // release store and not rewritten until `get` moves past it.
        let byte = unsafe { *self.ring.data[get].get() };
        self.ring.get.store(self.ring.next(get), Ordering::Release);
        Some(byte)
    }

    /// True if there is nothing to pop.
    pub fn is_empty(&self) -> bool {
        self.ring.indices().is_empty()
    }

    /// Read-only view of the indices.
    pub fn indices(&self) -> RingIndices<'r> {
        RingIndices {
            get: self.ring.get,
            put: self.ring.put,
            slots: self.ring.data.len(),
        }
    }
}

impl fmt::Debug for Consumer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Consumer").field(&self.indices()).finish()
    }
}

/// Snapshot access to a ring's indices, for diagnostics.
#[derive(Copy, Clone)]
pub struct RingIndices<'r> {
    get: &'r AtomicUsize,
    put: &'r AtomicUsize,
    slots: usize,
}

impl RingIndices<'_> {
    /// Consumer index.
    pub fn get(&self) -> usize {
        self.get.load(Ordering::Relaxed)
    }

    /// Producer index.
    pub fn put(&self) -> usize {
        self.put.load(Ordering::Relaxed)
    }

    /// Number of slots (one more than the usable capacity).
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Bytes currently queued.
    pub fn len(&self) -> usize {
        let (get, put) = (self.get(), self.put());
        if put >= get { put - get } else { self.slots - get + put }
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.get() == self.put()
    }

    /// True if no more bytes fit.
    pub fn is_full(&self) -> bool {
        (self.put() + 1) % self.slots == self.get()
    }
}

impl fmt::Debug for RingIndices<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingIndices")
            .field("get", &self.get())
            .field("put", &self.put())
            .field("slots", &self.slots)
            .finish()
    }
}
