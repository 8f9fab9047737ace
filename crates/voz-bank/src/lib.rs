//! Voz Bank - the polyphonic voice bank
//!
//! A bank of up to 16 independently triggerable voices driven by per-tick
//! control voltages. Each host tick the bank:
//!
//! 1. resolves the active voice count (input channels or explicit unison),
//! 2. edge-detects triggers,
//! 3. when voice 0's output queue has run dry, maps knobs + CVs to
//!    engine-native parameters and renders one fixed-size block per voice,
//!    sample-rate-converting the result into each voice's bounded queue,
//! 4. drains exactly one frame per voice to the polyphonic outputs.
//!
//! Two module front-ends wrap that pipeline with their own control mapping:
//!
//! - [`MacroOsc`] - mono macro-oscillator module: pitch-code mapping with
//!   analog-style drift, meta-modulation, signature waveshaping
//! - [`MultiVoice`] - stereo multi-model module: note/harmonics/timbre/morph
//!   mapping, low-pass-gate controls, model bank-step buttons
//!
//! Waveform math lives behind the [`SynthEngine`](voz_engine::SynthEngine)
//! contract in `voz-engine`; this crate never computes a waveform itself.
//!
//! # Real-time Guarantees
//!
//! Nothing on the tick path allocates, locks, or returns errors: every
//! control value is clamped into range, queue overflow is prevented by a
//! capacity check before each render, and underflow holds the previous
//! output value. The only fallible surface is the persisted settings blob.

pub mod bank;
pub mod lane;
pub mod macro_osc;
pub mod multi_voice;
pub mod poly;
pub mod settings;
pub mod spread;

pub use bank::{Polyphony, RateMode, VoiceBank};
pub use lane::{MAX_BLOCK, VoiceLane};
pub use macro_osc::{MacroInputs, MacroOsc, MacroParams};
pub use multi_voice::{MultiInputs, MultiParams, MultiVoice};
pub use poly::{MAX_VOICES, PolyInput, PolyOutput};
pub use settings::{MacroSettings, SettingsError, VoiceSettings};
pub use spread::spread_offset;
