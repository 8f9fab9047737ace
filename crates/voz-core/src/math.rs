//! Pitch and control math shared by the voice pipeline.
//!
//! Conventions:
//!
//! - Pitch control voltages follow the 1 V/octave standard: one volt is
//!   12 semitones, 0 V is MIDI note 60 (C4).
//! - Engines that take fixed-point pitch use a 7-bit-fraction code,
//!   `code = note * 128`, valid over [0, [`PITCH_CODE_MAX`]].
//! - All mapping functions clamp; nothing on the audio path reports errors.

use libm::{log2f, powf};

/// Upper bound of the fixed-point pitch code range (128 steps per semitone).
pub const PITCH_CODE_MAX: i32 = 16383;

/// Clamp a pitch code into the engine-valid range [0, 16383].
#[inline]
pub fn clamp_pitch_code(code: i32) -> i32 {
    code.clamp(0, PITCH_CODE_MAX)
}

/// Map a 1 V/octave pitch voltage to a clamped fixed-point pitch code.
///
/// `code = (volts * 12 + 60) * 128`, truncated then clamped. Non-finite
/// inputs saturate through the float-to-int cast and land on the range
/// boundary, so arbitrary finite or non-finite voltages always produce a
/// valid code.
#[inline]
pub fn pitch_to_code(pitch_volts: f32) -> i32 {
    clamp_pitch_code(((pitch_volts * 12.0 + 60.0) * 128.0) as i32)
}

/// Convert a pitch code back to a (fractional) MIDI note number.
#[inline]
pub fn code_to_note(code: i32) -> f32 {
    code as f32 / 128.0
}

/// Convert a MIDI note number to frequency in Hz (A4 = 440 Hz).
#[inline]
pub fn note_to_freq(note: f32) -> f32 {
    440.0 * powf(2.0, (note - 69.0) / 12.0)
}

/// Pitch compensation, in volts, for low-CPU rendering.
///
/// In low-CPU mode the engine's fixed-rate block is played back at the host
/// rate without conversion, transposing everything by the rate ratio.
/// Adding `log2(native_rate * host_sample_time)` volts to the pitch input
/// cancels that transposition exactly: at a 48 kHz host and a 96 kHz native
/// rate the offset is +1 octave.
#[inline]
pub fn low_cpu_pitch_offset(native_rate: f32, host_sample_time: f32) -> f32 {
    log2f(native_rate * host_sample_time)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
