//! Rising-edge detection for trigger and gate inputs.

/// Edge detector with a single previous-level boolean of state.
///
/// The caller converts its input voltage to a boolean with whatever
/// threshold its convention requires (the macro-oscillator module fires
/// strikes at >= 1.0 V; button params use >= 0.5) and feeds the level in
/// once per tick. [`process`](GateDetector::process) returns `true` exactly
/// once per rising edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateDetector {
    last: bool,
}

impl GateDetector {
    /// Create a detector with the line considered low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level; returns `true` on a low-to-high transition.
    #[inline]
    pub fn process(&mut self, high: bool) -> bool {
        let rising = high && !self.last;
        self.last = high;
        rising
    }

    /// Forget the stored level (line considered low again).
    pub fn reset(&mut self) {
        self.last = false;
    }
}
