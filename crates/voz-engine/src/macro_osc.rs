//! `MacroWaves`: the mono macro-shape reference engine.
//!
//! Eight oscillator shapes behind one knob set. TIMBRE is each shape's main
//! character control (fold depth, pulse width, sync ratio, noise color);
//! MORPH is secondary where a shape has one. Renders 24-frame mono blocks at
//! a native 96 kHz.
//!
//! | # | Shape       | TIMBRE            | MORPH        |
//! |---|-------------|-------------------|--------------|
//! | 0 | Sine        | wavefold depth    | -            |
//! | 1 | Triangle    | wavefold depth    | -            |
//! | 2 | Saw         | octave-up blend   | -            |
//! | 3 | Pulse       | width             | -            |
//! | 4 | Saw/Pulse   | crossfade         | pulse width  |
//! | 5 | Sync saw    | slave ratio       | -            |
//! | 6 | Ring sine   | modulator ratio   | -            |
//! | 7 | Noise       | lowpass cutoff    | -            |
//!
//! An internal exponential pluck envelope shapes the output when the trigger
//! input is patched; [`strike`](SynthEngine::strike) re-excites it. With no
//! trigger patched the oscillator free-runs at full level.

use core::f32::consts::TAU;
use libm::{expf, powf, sinf};

use voz_core::{
    FoldbackShaper, Frame, OnePole, Waveshaper, XorShift32, lerp, note_to_freq,
};

use crate::blep::{Phasor, pulse, saw, triangle};
use crate::engine::SynthEngine;
use crate::patch::{Modulations, Patch};

const BLOCK_SIZE: usize = 24;
const NATIVE_RATE: f32 = 96_000.0;
const MODEL_COUNT: usize = 8;

/// Mono macro-shape oscillator. See the module docs for the shape table.
#[derive(Debug, Clone)]
pub struct MacroWaves {
    patch: Patch,
    active: usize,
    main: Phasor,
    slave: Phasor,
    ring: Phasor,
    rng: XorShift32,
    noise_lp: OnePole,
    fold: FoldbackShaper,
    env: f32,
}

impl MacroWaves {
    /// Create an engine in its post-`init` state.
    pub fn new() -> Self {
        Self {
            patch: Patch::default(),
            active: 0,
            main: Phasor::default(),
            slave: Phasor::default(),
            ring: Phasor::default(),
            rng: XorShift32::new(0x6d61_6372),
            noise_lp: OnePole::new(NATIVE_RATE, 8000.0),
            fold: FoldbackShaper,
            env: 0.0,
        }
    }

    #[inline]
    fn shape_sample(&mut self, dt: f32, timbre: f32, morph: f32) -> f32 {
        let t = self.main.tick(dt);
        match self.active {
            0 => {
                let raw = sinf(TAU * t);
                self.fold.transform(raw * (1.0 + timbre * 4.0))
            }
            1 => self.fold.transform(triangle(t) * (1.0 + timbre * 2.0)),
            2 => {
                let mut t2 = 2.0 * t;
                if t2 >= 1.0 {
                    t2 -= 1.0;
                }
                lerp(saw(t, dt), saw(t2, 2.0 * dt), timbre)
            }
            3 => pulse(t, dt, timbre),
            4 => lerp(saw(t, dt), pulse(t, dt, morph), timbre),
            5 => {
                // Slave saw hard-synced to the master cycle.
                if self.main.phase < t {
                    self.slave.sync();
                }
                let ratio = 1.0 + timbre * 3.0;
                saw(self.slave.tick(dt * ratio), dt * ratio)
            }
            6 => {
                let ratio = 0.5 + timbre * 7.5;
                sinf(TAU * t) * sinf(TAU * self.ring.tick(dt * ratio))
            }
            _ => self.noise_lp.process(self.rng.next_bipolar()),
        }
    }
}

impl Default for MacroWaves {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthEngine<1> for MacroWaves {
    fn init(&mut self) {
        *self = Self::new();
    }

    fn set_parameters(&mut self, patch: &Patch) {
        self.patch = *patch;
        self.active = patch.model.min(MODEL_COUNT - 1);
    }

    fn strike(&mut self) {
        self.env = 1.0;
    }

    fn render(&mut self, modulations: &Modulations, sync: &[u8], output: &mut [Frame<1>]) {
        let mut note = self.patch.note + modulations.note;
        if modulations.frequency_patched {
            note += modulations.frequency * self.patch.frequency_modulation_amount;
        }
        let dt = (note_to_freq(note) / NATIVE_RATE).clamp(0.0, 0.45);

        let mut timbre = self.patch.timbre;
        if modulations.timbre_patched {
            timbre += modulations.timbre * self.patch.timbre_modulation_amount;
        }
        let timbre = timbre.clamp(0.0, 1.0);
        let mut morph = self.patch.morph;
        if modulations.morph_patched {
            morph += modulations.morph * self.patch.morph_modulation_amount;
        }
        let morph = morph.clamp(0.0, 1.0);

        if self.active == 7 {
            let cutoff = 100.0 * powf(2.0, timbre * 7.0);
            self.noise_lp.set_cutoff(NATIVE_RATE, cutoff);
        }
        let decay_time = 0.02 + self.patch.decay * self.patch.decay * 2.0;
        let decay_coeff = expf(-1.0 / (decay_time * NATIVE_RATE));

        for (frame, &s) in output.iter_mut().zip(sync) {
            if s != 0 {
                self.main.sync();
                self.slave.sync();
                self.ring.sync();
            }
            let sample = self.shape_sample(dt, timbre, morph);
            let amp = if modulations.trigger_patched {
                self.env *= decay_coeff;
                self.env
            } else {
                1.0
            };
            *frame = Frame::mono(sample * amp);
        }
    }

    fn active_model(&self) -> usize {
        self.active
    }

    fn model_count(&self) -> usize {
        MODEL_COUNT
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn native_rate(&self) -> f32 {
        NATIVE_RATE
    }
}
