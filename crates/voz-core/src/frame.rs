//! Audio frames with a compile-time channel count.
//!
//! A [`Frame`] is one sample tick across `CH` channels: `CH = 1` for mono
//! engines, `CH = 2` for engines with a main/aux output pair. Frames are
//! plain `Copy` values so block buffers and queues can live in fixed arrays
//! on the stack or inside voice records, keeping the audio path free of
//! allocation.

/// One audio frame: `CH` samples, one per channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame<const CH: usize> {
    /// Per-channel sample values, typically in [-1.0, 1.0].
    pub samples: [f32; CH],
}

impl<const CH: usize> Default for Frame<CH> {
    fn default() -> Self {
        Self {
            samples: [0.0; CH],
        }
    }
}

impl<const CH: usize> Frame<CH> {
    /// Create a frame with the same value on every channel.
    pub const fn splat(value: f32) -> Self {
        Self {
            samples: [value; CH],
        }
    }

    /// Multiply every channel by `gain`.
    #[inline]
    pub fn scaled(mut self, gain: f32) -> Self {
        for s in &mut self.samples {
            *s *= gain;
        }
        self
    }
}

impl Frame<1> {
    /// Create a mono frame.
    pub const fn mono(value: f32) -> Self {
        Self { samples: [value] }
    }
}

impl Frame<2> {
    /// Create a two-channel frame (main output, auxiliary output).
    pub const fn stereo(out: f32, aux: f32) -> Self {
        Self {
            samples: [out, aux],
        }
    }
}
