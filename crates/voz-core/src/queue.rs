//! Bounded per-voice output queue.
//!
//! Each voice owns one [`FrameQueue`]: the rate converter appends converted
//! frames after a block render, and the host tick drains exactly one frame.
//! The queue is a fixed circular buffer — it never allocates, and overflow
//! is impossible by construction because producers are expected to write at
//! most [`FrameQueue::remaining`] frames (a full queue makes the renderer
//! skip that voice for the cycle, which is backpressure rather than data
//! loss).

use crate::frame::Frame;

/// Queue capacity in frames. Power of two so the ring index is a mask.
pub const QUEUE_CAPACITY: usize = 256;

/// Fixed-capacity FIFO of audio frames.
///
/// # Invariants
///
/// - `len <= QUEUE_CAPACITY` at all times
/// - an empty queue pops `None`; the caller holds its previous output value
#[derive(Debug, Clone)]
pub struct FrameQueue<const CH: usize> {
    buf: [Frame<CH>; QUEUE_CAPACITY],
    /// Index of the oldest frame.
    head: usize,
    /// Number of queued frames.
    len: usize,
}

impl<const CH: usize> Default for FrameQueue<CH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CH: usize> FrameQueue<CH> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            buf: [Frame::default(); QUEUE_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no frames are queued.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.len == QUEUE_CAPACITY
    }

    /// Free space in frames.
    pub fn remaining(&self) -> usize {
        QUEUE_CAPACITY - self.len
    }

    /// Append one frame. Returns `false` (dropping the frame) when full.
    #[inline]
    pub fn push(&mut self, frame: Frame<CH>) -> bool {
        if self.is_full() {
            return false;
        }
        let tail = (self.head + self.len) & (QUEUE_CAPACITY - 1);
        self.buf[tail] = frame;
        self.len += 1;
        true
    }

    /// Pop the oldest frame, or `None` when empty.
    #[inline]
    pub fn pop(&mut self) -> Option<Frame<CH>> {
        if self.is_empty() {
            return None;
        }
        let frame = self.buf[self.head];
        self.head = (self.head + 1) & (QUEUE_CAPACITY - 1);
        self.len -= 1;
        Some(frame)
    }

    /// Discard all queued frames.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_fifo_order() {
        let mut q: FrameQueue<1> = FrameQueue::new();
        for i in 0..4 {
            assert!(q.push(Frame::mono(i as f32)));
        }
        for i in 0..4 {
            assert_eq!(q.pop(), Some(Frame::mono(i as f32)));
        }
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn rejects_push_when_full() {
        let mut q: FrameQueue<1> = FrameQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            assert!(q.push(Frame::mono(0.0)));
        }
        assert!(q.is_full());
        assert_eq!(q.remaining(), 0);
        assert!(!q.push(Frame::mono(1.0)));
        assert_eq!(q.len(), QUEUE_CAPACITY);
    }

    #[test]
    fn wraps_around_capacity() {
        let mut q: FrameQueue<1> = FrameQueue::new();
        // Advance head past the middle, then force the tail to wrap.
        for i in 0..200 {
            q.push(Frame::mono(i as f32));
        }
        for _ in 0..150 {
            q.pop();
        }
        for i in 200..350 {
            assert!(q.push(Frame::mono(i as f32)));
        }
        // Remaining frames are 150..350 in order.
        for i in 150..350 {
            assert_eq!(q.pop(), Some(Frame::mono(i as f32)));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn clear_empties_queue() {
        let mut q: FrameQueue<2> = FrameQueue::new();
        q.push(Frame::stereo(1.0, -1.0));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }
}
