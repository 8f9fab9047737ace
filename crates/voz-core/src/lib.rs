//! Voz Core - pipeline primitives for the voz voice engine
//!
//! This crate provides the building blocks shared by the voice-rendering
//! pipeline: fixed-channel audio frames, the bounded per-voice output queue,
//! streaming sample-rate conversion, gate edge detection, pitch math, the
//! seedable drift source, and waveshaping.
//!
//! # Core Abstractions
//!
//! ## Frames and Buffering
//!
//! - [`Frame`] - One audio frame with a compile-time channel count
//! - [`FrameQueue`] - Bounded 256-frame FIFO between renderer and host ticks
//!
//! ## Rate Conversion
//!
//! - [`RateConverter`] - Streaming windowed-sinc converter between the fixed
//!   internal render rate and an arbitrary host rate
//!
//! ## Control Helpers
//!
//! - [`GateDetector`] - Rising-edge detection for trigger/gate inputs
//! - [`DriftSource`] / [`XorShift32`] - Seedable analog-style pitch drift
//! - [`Waveshaper`] / [`FoldbackShaper`] - Output signature waveshaping
//! - [`OnePole`] - 6 dB/oct lowpass used for drift smoothing and gating
//! - Math functions: [`pitch_to_code`], [`note_to_freq`],
//!   [`low_cpu_pitch_offset`], [`lerp`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets. Disable the
//! default `std` feature:
//!
//! ```toml
//! [dependencies]
//! voz-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations, locks, or blocking anywhere
//! - **Pure `no_std`**: math through `libm`
//! - **Everything clamps**: invalid values are coerced into range, never
//!   reported as errors on the audio path

#![cfg_attr(not(feature = "std"), no_std)]

pub mod frame;
pub mod jitter;
pub mod math;
pub mod one_pole;
pub mod queue;
pub mod resampler;
pub mod trigger;
pub mod waveshaper;

pub use frame::Frame;
pub use jitter::{DriftSource, XorShift32};
pub use math::{
    PITCH_CODE_MAX, clamp_pitch_code, code_to_note, lerp, low_cpu_pitch_offset, note_to_freq,
    pitch_to_code,
};
pub use one_pole::OnePole;
pub use queue::{FrameQueue, QUEUE_CAPACITY};
pub use resampler::RateConverter;
pub use trigger::GateDetector;
pub use waveshaper::{FoldbackShaper, Waveshaper, signature_mix};
