//! Streaming sample-rate conversion.
//!
//! Engines render at a fixed internal rate (96 kHz mono or 48 kHz stereo
//! blocks) while the host runs at an arbitrary rate. [`RateConverter`]
//! bridges the two with windowed-sinc interpolation:
//!
//! - 16-tap sinc kernel, Blackman-windowed, cutoff at 90% of the narrower
//!   Nyquist so downsampling stays alias-free
//! - 64 precomputed fractional phases, each row normalized to unity DC gain
//! - position tracked in `f64` input-sample coordinates, so hour-long
//!   streams accumulate no clock drift
//! - a small fixed history ring compacted in place; no allocation anywhere
//!
//! When the input and output rates are equal the converter is a pure
//! pass-through with zero latency. Otherwise latency is half the kernel
//! (8 input frames).
//!
//! # Example
//!
//! ```
//! use voz_core::{Frame, RateConverter};
//!
//! let mut rc: RateConverter<1> = RateConverter::new(96_000.0, 48_000.0);
//! let block = [Frame::mono(0.0); 24];
//! let mut out = Vec::new();
//! rc.process(&block, |f| out.push(f));
//! ```

use core::f32::consts::PI;
use libm::{cosf, sinf};

use crate::frame::Frame;

/// Kernel length in taps.
const TAPS: usize = 16;
/// Taps on each side of the interpolation center.
const HALF: usize = TAPS / 2;
/// Fractional-phase resolution of the kernel table.
const PHASES: usize = 64;
/// History ring capacity in input frames.
const HISTORY: usize = 64;

/// Normalized sinc, `sin(pi x) / (pi x)`.
#[inline]
fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        1.0
    } else {
        sinf(PI * x) / (PI * x)
    }
}

/// Blackman window over `u` in [-1, 1], zero at the edges.
#[inline]
fn blackman(u: f32) -> f32 {
    0.42 + 0.5 * cosf(PI * u) + 0.08 * cosf(2.0 * PI * u)
}

/// Streaming windowed-sinc converter between two fixed sample rates.
///
/// Feed input frames in blocks of any size with
/// [`process`](RateConverter::process); converted frames come out through
/// the callback as soon as enough context exists. State is fully reset when
/// the rate pair changes.
#[derive(Debug, Clone)]
pub struct RateConverter<const CH: usize> {
    in_rate: f32,
    out_rate: f32,
    /// Input frames consumed per output frame.
    ratio: f64,
    /// Position of the next output, in history-buffer coordinates.
    pos: f64,
    history: [Frame<CH>; HISTORY],
    len: usize,
    kernels: [[f32; TAPS]; PHASES],
}

impl<const CH: usize> RateConverter<CH> {
    /// Create a converter for the given rate pair (both in Hz, positive).
    pub fn new(in_rate: f32, out_rate: f32) -> Self {
        let mut rc = Self {
            in_rate: 0.0,
            out_rate: 0.0,
            ratio: 1.0,
            pos: 0.0,
            history: [Frame::default(); HISTORY],
            len: 0,
            kernels: [[0.0; TAPS]; PHASES],
        };
        rc.set_rates(in_rate, out_rate);
        rc
    }

    /// Change the rate pair. Rebuilds the kernel table and discards all
    /// buffered signal, so the next output starts a fresh warmup.
    pub fn set_rates(&mut self, in_rate: f32, out_rate: f32) {
        self.in_rate = in_rate.max(1.0);
        self.out_rate = out_rate.max(1.0);
        self.ratio = f64::from(self.in_rate) / f64::from(self.out_rate);
        self.rebuild_kernels();
        self.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            in_rate = self.in_rate,
            out_rate = self.out_rate,
            "rate pair changed, kernel table rebuilt"
        );
    }

    /// True when the converter is a pass-through.
    pub fn is_identity(&self) -> bool {
        (self.in_rate - self.out_rate).abs() < f32::EPSILON
    }

    /// Discard buffered signal and restart the warmup. The rate pair and
    /// kernel table are kept.
    pub fn reset(&mut self) {
        // Prime the left half of the kernel with silence so the first
        // output is centered on the first real input frame.
        self.history = [Frame::default(); HISTORY];
        self.len = HALF - 1;
        self.pos = (HALF - 1) as f64;
    }

    /// Upper bound on the number of output frames `input_len` input frames
    /// can produce. Callers use this to check queue space before rendering.
    pub fn max_output_for(&self, input_len: usize) -> usize {
        if self.is_identity() {
            return input_len;
        }
        (input_len as f64 / self.ratio) as usize + 2
    }

    /// Feed a block of input frames; converted frames are handed to `emit`
    /// in order as they become available.
    pub fn process<F: FnMut(Frame<CH>)>(&mut self, input: &[Frame<CH>], mut emit: F) {
        if self.is_identity() {
            for &frame in input {
                emit(frame);
            }
            return;
        }
        for &frame in input {
            if self.len == HISTORY {
                self.produce(&mut emit);
                self.compact();
            }
            self.history[self.len] = frame;
            self.len += 1;
        }
        self.produce(&mut emit);
    }

    /// Emit every output whose kernel window fits inside the history.
    fn produce<F: FnMut(Frame<CH>)>(&mut self, emit: &mut F) {
        loop {
            let i = self.pos as usize;
            // The window reads history[i + 1 - HALF ..= i + HALF]; the last
            // tap must already be buffered.
            if i + HALF >= self.len {
                return;
            }
            let frac = (self.pos - i as f64) as f32;
            let phase = ((frac * PHASES as f32) as usize).min(PHASES - 1);
            let row = &self.kernels[phase];
            let mut acc = Frame::<CH>::default();
            for (k, tap) in row.iter().enumerate() {
                let src = &self.history[i + 1 - HALF + k];
                for (a, s) in acc.samples.iter_mut().zip(&src.samples) {
                    *a += s * tap;
                }
            }
            emit(acc);
            self.pos += self.ratio;
        }
    }

    /// Drop history the interpolator has moved past. Called only when the
    /// ring is full, after `produce`, so this always frees space.
    fn compact(&mut self) {
        let start = (self.pos as usize).saturating_sub(HALF - 1);
        debug_assert!(start > 0, "compaction on a full, undrained ring");
        self.history.copy_within(start..self.len, 0);
        self.len -= start;
        self.pos -= start as f64;
    }

    fn rebuild_kernels(&mut self) {
        // Cut below the narrower of the two Nyquist frequencies.
        let cutoff = 0.9 * (1.0 / self.ratio).min(1.0) as f32;
        for (p, row) in self.kernels.iter_mut().enumerate() {
            let frac = p as f32 / PHASES as f32;
            let mut sum = 0.0;
            for (k, tap) in row.iter_mut().enumerate() {
                let d = k as f32 - (HALF - 1) as f32 - frac;
                *tap = sinc(cutoff * d) * blackman(d / HALF as f32);
                sum += *tap;
            }
            // Unity DC gain per phase.
            for tap in row.iter_mut() {
                *tap /= sum;
            }
        }
    }
}
