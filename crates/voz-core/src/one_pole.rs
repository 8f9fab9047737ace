//! One-pole lowpass filter.
//!
//! Difference equation:
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])
//! ```
//!
//! with `coeff = exp(-2π * freq / sample_rate)`. 6 dB/octave, zero latency,
//! one multiply per sample. Used here for drift smoothing and as the
//! reference engines' low-pass-gate element.

use core::f32::consts::TAU;
use libm::expf;

/// One-pole (6 dB/oct) lowpass filter.
///
/// # Invariants
///
/// - `coeff` stays in [0, 1) for stability
/// - state is flushed to zero below 1e-20 (denormal protection)
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    state: f32,
    coeff: f32,
}

impl OnePole {
    /// Create a filter with the given cutoff.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut lp = Self {
            state: 0.0,
            coeff: 0.0,
        };
        lp.set_cutoff(sample_rate, freq_hz);
        lp
    }

    /// Create a filter from a raw smoothing coefficient in [0, 1).
    ///
    /// Useful when the cutoff is expressed relative to an arbitrary update
    /// rate rather than in Hz (drift smoothing, envelope-driven gates).
    pub fn from_coeff(coeff: f32) -> Self {
        Self {
            state: 0.0,
            coeff: coeff.clamp(0.0, 0.9999),
        }
    }

    /// Set the cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, sample_rate: f32, freq_hz: f32) {
        let freq = freq_hz.clamp(0.0, sample_rate * 0.5);
        self.coeff = expf(-TAU * freq / sample_rate).clamp(0.0, 0.9999);
    }

    /// Set the raw smoothing coefficient directly.
    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff = coeff.clamp(0.0, 0.9999);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = input + self.coeff * (self.state - input);
        if self.state.abs() < 1e-20 {
            self.state = 0.0;
        }
        self.state
    }

    /// Clear filter history.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuates_step_input() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        let first = lp.process(1.0);
        assert!(first > 0.0 && first < 1.0);
    }

    #[test]
    fn converges_to_dc() {
        let mut lp = OnePole::new(48000.0, 500.0);
        let mut y = 0.0;
        for _ in 0..48000 {
            y = lp.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "converged to {y}");
    }

    #[test]
    fn zero_cutoff_holds_state() {
        let mut lp = OnePole::from_coeff(0.9999);
        let y = lp.process(1.0);
        assert!(y < 0.01);
    }
}
