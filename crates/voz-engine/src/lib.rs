//! Voz Engine - synthesis engine contract and reference engines
//!
//! The voice bank never computes waveforms itself: each voice owns a boxed
//! or inlined synthesis engine behind the [`SynthEngine`] trait and talks to
//! it through two plain-data structs, [`Patch`] (slow, knob-derived
//! parameters) and [`Modulations`] (per-block CV-derived inputs). This crate
//! defines that contract and ships two reference engines:
//!
//! - [`MacroWaves`] - a mono macro-shape oscillator: 8 shapes, PolyBLEP
//!   band-limiting, 24-frame blocks at a native 96 kHz
//! - [`MultiWaves`] - a stereo multi-model voice: 16 models, internal
//!   low-pass gate, 12-frame blocks at a native 48 kHz
//!
//! Engines are deliberately self-contained: they own every sample of state
//! they need, never allocate, and clamp every input instead of erroring.
//!
//! # no_std Support
//!
//! `no_std` compatible with default features disabled; math through `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

mod blep;
pub mod engine;
pub mod macro_osc;
pub mod multi_voice;
pub mod patch;

pub use engine::SynthEngine;
pub use macro_osc::MacroWaves;
pub use multi_voice::MultiWaves;
pub use patch::{Modulations, Patch};
