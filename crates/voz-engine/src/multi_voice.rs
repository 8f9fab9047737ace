//! `MultiWaves`: the stereo multi-model reference engine.
//!
//! Sixteen synthesis models behind one knob set, rendering 12-frame stereo
//! blocks (main output on channel 0, a related auxiliary signal on channel 1)
//! at a native 48 kHz. Models 0-9 and 15 are sustained sources shaped by the
//! internal low-pass gate; models 10-14 carry their own excitation envelope
//! and bypass the gate.
//!
//! | #  | Model            | TIMBRE             | MORPH              |
//! |----|------------------|--------------------|--------------------|
//! | 0  | Virtual analog   | detune             | pulse width (aux)  |
//! | 1  | Waveshaper       | fold drive         | bias               |
//! | 2  | Two-op FM        | index              | -                  |
//! | 3  | Formant          | formant frequency  | second formant     |
//! | 4  | Harmonic         | bump width         | -                  |
//! | 5  | Wave morph       | shape position     | -                  |
//! | 6  | Chord            | minor/major third  | octave level       |
//! | 7  | Saw swarm        | detune spread      | -                  |
//! | 8  | Filtered noise   | cutoff             | -                  |
//! | 9  | Particle         | impulse density    | filter cutoff      |
//! | 10 | Plucked string   | damping            | -                  |
//! | 11 | Modal            | decay time         | partial stretch    |
//! | 12 | Kick             | pitch sweep        | decay time         |
//! | 13 | Snare            | tone/noise balance | -                  |
//! | 14 | Hi-hat           | decay time         | -                  |
//! | 15 | Phase distortion | warp point         | aux partial        |
//!
//! The low-pass gate is a decay envelope driving a one-pole lowpass whose
//! response morphs from pure VCA (`lpg_colour` 0) to pure VCF (`lpg_colour`
//! 1). With the trigger input patched the gate opens on rising edges through
//! 0.3; otherwise the voice free-runs and only the LEVEL input (when
//! patched) scales it.

use core::f32::consts::TAU;
use libm::{cosf, expf, floorf, powf, sinf};

use voz_core::{
    FoldbackShaper, Frame, GateDetector, OnePole, Waveshaper, XorShift32, lerp, note_to_freq,
};

use crate::blep::{Phasor, pulse, saw, triangle};
use crate::engine::SynthEngine;
use crate::patch::{Modulations, Patch};

const BLOCK_SIZE: usize = 12;
const NATIVE_RATE: f32 = 48_000.0;
const MODEL_COUNT: usize = 16;
const KS_LEN: usize = 2048;
/// Trigger level the internal edge detector fires through.
const TRIGGER_THRESHOLD: f32 = 0.3;

/// Per-block envelope coefficients, computed once per render.
struct Coeffs {
    lpg: f32,
    drum: f32,
    kick_pitch: f32,
    modal: [f32; 3],
}

/// Stereo multi-model voice. See the module docs for the model table.
#[derive(Debug, Clone)]
pub struct MultiWaves {
    patch: Patch,
    active: usize,
    gate: GateDetector,
    fold: FoldbackShaper,
    rng: XorShift32,
    main: Phasor,
    aux: Phasor,
    extra: [Phasor; 6],
    lp_a: OnePole,
    lp_b: OnePole,
    lpg_lp: [OnePole; 2],
    lpg_env: f32,
    ks: [f32; KS_LEN],
    ks_pos: usize,
    burst: usize,
    modal_amp: [f32; 3],
    drum_amp: f32,
    pitch_env: f32,
}

impl MultiWaves {
    /// Create an engine in its post-`init` state.
    pub fn new() -> Self {
        Self {
            patch: Patch::default(),
            active: 0,
            gate: GateDetector::new(),
            fold: FoldbackShaper,
            rng: XorShift32::new(0x706c_7473),
            main: Phasor::default(),
            aux: Phasor::default(),
            extra: [Phasor::default(); 6],
            lp_a: OnePole::new(NATIVE_RATE, 8000.0),
            lp_b: OnePole::new(NATIVE_RATE, 2000.0),
            lpg_lp: [OnePole::new(NATIVE_RATE, 18_000.0); 2],
            lpg_env: 0.0,
            ks: [0.0; KS_LEN],
            ks_pos: 0,
            burst: 0,
            modal_amp: [0.0; 3],
            drum_amp: 0.0,
            pitch_env: 0.0,
        }
    }

    /// Whether a model carries its own excitation envelope (and therefore
    /// bypasses the low-pass gate).
    fn self_enveloped(model: usize) -> bool {
        (10..=14).contains(&model)
    }

    /// Note-on: open the gate and re-excite the physical models.
    fn excite(&mut self) {
        self.lpg_env = 1.0;
        self.burst = 64;
        self.modal_amp = [1.0, 0.7, 0.5];
        self.drum_amp = 1.0;
        self.pitch_env = 1.0;
    }

    fn sync_phases(&mut self) {
        self.main.sync();
        self.aux.sync();
        for p in &mut self.extra {
            p.sync();
        }
    }

    #[allow(clippy::too_many_lines)]
    fn model_sample(
        &mut self,
        dt: f32,
        harmonics: f32,
        timbre: f32,
        morph: f32,
        coeffs: &Coeffs,
    ) -> (f32, f32) {
        match self.active {
            0 => {
                let detune = 1.0 + timbre * 0.02;
                let dt2 = dt * detune;
                let a = saw(self.main.tick(dt), dt);
                let b = saw(self.extra[0].tick(dt2), dt2);
                let square = pulse(self.aux.tick(dt), dt, 0.3 + morph * 0.4);
                (0.5 * (a + b), square)
            }
            1 => {
                let t = self.main.tick(dt);
                let drive = 1.0 + timbre * 9.0;
                let bias = morph - 0.5;
                let out = self.fold.transform((sinf(TAU * t) + bias) * drive);
                let alt = self.fold.transform(triangle(t) * drive);
                (out, alt)
            }
            2 => {
                let ratio = 0.5 + floorf(harmonics * 7.0) * 0.5;
                let index = timbre * 6.0;
                let m = sinf(TAU * self.aux.tick(dt * ratio));
                (sinf(TAU * self.main.tick(dt) + index * m), m)
            }
            3 => {
                let t = self.main.tick(dt);
                let f0 = (dt * NATIVE_RATE).max(1.0);
                let r1 = (200.0 * powf(2.0, timbre * 4.0) / f0).min(64.0);
                let r2 = (r1 * (1.0 + morph * 2.0)).min(64.0);
                // Raised-cosine window keeps the formant bursts click-free.
                let window = 0.5 - 0.5 * cosf(TAU * t);
                (sinf(TAU * t * r1) * window, sinf(TAU * t * r2) * window)
            }
            4 => {
                let t = self.main.tick(dt);
                let center = harmonics * 7.0;
                let width = 0.25 + timbre * 2.0;
                let mut out = 0.0;
                let mut odd = 0.0;
                let mut norm = 0.0;
                for k in 0..8 {
                    let d = (k as f32 - center) / width;
                    let a = expf(-d * d);
                    let s = a * sinf(TAU * t * (k + 1) as f32);
                    norm += a;
                    out += s;
                    if k % 2 == 0 {
                        odd += s;
                    }
                }
                let norm = norm.max(1e-3);
                (out / norm, odd / norm)
            }
            5 => {
                let t = self.main.tick(dt);
                let shape = |j: usize| match j {
                    0 => sinf(TAU * t),
                    1 => triangle(t),
                    2 => saw(t, dt),
                    _ => pulse(t, dt, 0.5),
                };
                let pos = timbre * 3.0;
                let i = (pos as usize).min(2);
                (lerp(shape(i), shape(i + 1), pos - i as f32), shape(i + 1))
            }
            6 => {
                let third = if timbre < 0.5 { 3.0 } else { 4.0 };
                let offsets = [0.0, third, 7.0, 12.0];
                let mut sum = 0.0;
                let mut root = 0.0;
                for (k, &off) in offsets.iter().enumerate() {
                    let r = powf(2.0, off / 12.0);
                    let s = sinf(TAU * self.extra[k].tick(dt * r));
                    sum += if k == 3 { morph * s } else { s };
                    if k == 0 {
                        root = s;
                    }
                }
                (sum * 0.3, root)
            }
            7 => {
                let spread = timbre * 0.5;
                let mut sum = 0.0;
                for v in 0..6 {
                    let st = spread * (v as f32 - 2.5) / 2.5;
                    let r = powf(2.0, st / 12.0);
                    sum += saw(self.extra[v].tick(dt * r), dt * r);
                }
                (sum / 6.0, saw(self.main.tick(dt), dt))
            }
            8 => {
                let w = self.rng.next_bipolar();
                let low = self.lp_a.process(w);
                (low, w - low)
            }
            9 => {
                let density = 0.001 + timbre * timbre * 0.1;
                let roll = self.rng.next_u32() as f32 / u32::MAX as f32;
                let imp = if roll < density {
                    self.rng.next_bipolar() * 1.5
                } else {
                    0.0
                };
                (self.lp_b.process(imp), imp)
            }
            10 => {
                let delay = ((1.0 / dt.max(1e-4)) as usize).clamp(2, KS_LEN - 2);
                if self.ks_pos >= delay {
                    self.ks_pos = 0;
                }
                let i = self.ks_pos;
                let next = if i + 1 >= delay { 0 } else { i + 1 };
                let excitation = if self.burst > 0 {
                    self.burst -= 1;
                    self.rng.next_bipolar()
                } else {
                    0.0
                };
                let damping = 0.98 - timbre * 0.9;
                let avg = 0.5 * (self.ks[i] + self.ks[next]);
                let fb = lerp(self.ks[i], avg, damping) * 0.995 + excitation * 0.5;
                self.ks[i] = fb;
                self.ks_pos = next;
                (fb, excitation)
            }
            11 => {
                let stretch = 1.0 + morph * 0.3;
                let ratios = [1.0, 2.76 * stretch, 5.40 * stretch * stretch];
                let mut sum = 0.0;
                let mut first = 0.0;
                for k in 0..3 {
                    let d = (dt * ratios[k]).min(0.45);
                    let s = self.modal_amp[k] * sinf(TAU * self.extra[3 + k].tick(d));
                    self.modal_amp[k] *= coeffs.modal[k];
                    if k == 0 {
                        first = s;
                    }
                    sum += s;
                }
                (sum * 0.5, first)
            }
            12 => {
                self.pitch_env *= coeffs.kick_pitch;
                self.drum_amp *= coeffs.drum;
                let sweep = (dt * (1.0 + timbre * 8.0 * self.pitch_env)).min(0.45);
                let tone = sinf(TAU * self.main.tick(sweep));
                let out = self.fold.transform(tone * (1.0 + timbre)) * self.drum_amp;
                (out, tone * self.drum_amp)
            }
            13 => {
                self.drum_amp *= coeffs.drum;
                let tone = sinf(TAU * self.main.tick(dt));
                let noise = self.rng.next_bipolar();
                (
                    lerp(tone, noise, timbre) * self.drum_amp,
                    noise * self.drum_amp,
                )
            }
            14 => {
                self.drum_amp *= coeffs.drum;
                let w = self.rng.next_bipolar();
                let low = self.lp_a.process(w);
                ((w - low) * self.drum_amp, w * self.drum_amp)
            }
            _ => {
                let t = self.main.tick(dt);
                let d = 0.5 - timbre * 0.45;
                let warped = if t < d {
                    0.5 * t / d
                } else {
                    0.5 + 0.5 * (t - d) / (1.0 - d)
                };
                let out = cosf(TAU * warped);
                let partial = sinf(TAU * t * (1.0 + floorf(morph * 15.0))) * (1.0 - t);
                (out, partial)
            }
        }
    }
}

impl Default for MultiWaves {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthEngine<2> for MultiWaves {
    fn init(&mut self) {
        *self = Self::new();
    }

    fn set_parameters(&mut self, patch: &Patch) {
        self.patch = *patch;
    }

    fn strike(&mut self) {
        self.excite();
    }

    fn render(&mut self, modulations: &Modulations, sync: &[u8], output: &mut [Frame<2>]) {
        let count = MODEL_COUNT as f32;
        let shifted = self.patch.model as f32 + modulations.engine * count;
        self.active = (shifted + 0.5).clamp(0.0, count - 1.0) as usize;

        let mut note = self.patch.note + modulations.note;
        if modulations.frequency_patched {
            note += modulations.frequency * self.patch.frequency_modulation_amount;
        }
        let dt = (note_to_freq(note) / NATIVE_RATE).clamp(0.0, 0.45);
        let harmonics = (self.patch.harmonics + modulations.harmonics).clamp(0.0, 1.0);
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

        if modulations.trigger_patched && self.gate.process(modulations.trigger > TRIGGER_THRESHOLD)
        {
            self.excite();
        }

        // Per-block filter setup for the noise-based models.
        match self.active {
            8 => {
                let cutoff = 100.0 * powf(2.0, timbre * 7.0);
                self.lp_a.set_cutoff(NATIVE_RATE, cutoff);
            }
            9 => {
                let cutoff = 200.0 * powf(2.0, morph * 6.0);
                self.lp_b.set_cutoff(NATIVE_RATE, cutoff);
            }
            14 => self.lp_a.set_cutoff(NATIVE_RATE, 6000.0),
            _ => {}
        }

        let decay = self.patch.decay.clamp(0.0, 1.0);
        let lpg_time = 0.02 + decay * decay * 2.0;
        let drum_time = match self.active {
            12 => 0.04 + morph * 0.4,
            13 => 0.05 + decay * 0.2,
            14 => 0.015 + timbre * 0.1,
            _ => 0.1,
        };
        let modal_time = 0.05 + timbre * 2.0;
        let coeffs = Coeffs {
            lpg: expf(-1.0 / (lpg_time * NATIVE_RATE)),
            drum: expf(-1.0 / (drum_time * NATIVE_RATE)),
            kick_pitch: expf(-1.0 / (0.02 * NATIVE_RATE)),
            modal: core::array::from_fn(|k| {
                expf(-1.0 / (modal_time / (1.0 + k as f32 * 1.5) * NATIVE_RATE))
            }),
        };

        let level = if modulations.level_patched {
            modulations.level.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let colour = self.patch.lpg_colour.clamp(0.0, 1.0);

        // The gate filter tracks the envelope at block rate.
        let gate_gain = if modulations.trigger_patched {
            self.lpg_env
        } else {
            1.0
        } * level;
        let cutoff = 20.0 + gate_gain * gate_gain * 18_000.0;
        for lp in &mut self.lpg_lp {
            lp.set_cutoff(NATIVE_RATE, cutoff);
        }

        let gated = !Self::self_enveloped(self.active);
        for (frame, &s) in output.iter_mut().zip(sync) {
            if s != 0 {
                self.sync_phases();
            }
            let (out, alt) = self.model_sample(dt, harmonics, timbre, morph, &coeffs);
            let (out, alt) = if gated {
                let env = if modulations.trigger_patched {
                    self.lpg_env *= coeffs.lpg;
                    self.lpg_env
                } else {
                    1.0
                };
                let g = env * level;
                let lo0 = self.lpg_lp[0].process(out);
                let lo1 = self.lpg_lp[1].process(alt);
                (lerp(out, lo0, colour) * g, lerp(alt, lo1, colour) * g)
            } else {
                (out * level, alt * level)
            };
            *frame = Frame::stereo(out, alt);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn render_block(engine: &mut MultiWaves, mods: &Modulations) -> [Frame<2>; BLOCK_SIZE] {
        let mut block = [Frame::default(); BLOCK_SIZE];
        let sync = [0u8; BLOCK_SIZE];
        engine.render(mods, &sync, &mut block);
        block
    }

    #[test]
    fn every_model_is_bounded() {
        for model in 0..MODEL_COUNT {
            let mut engine = MultiWaves::new();
            engine.init();
            engine.set_parameters(&Patch {
                model,
                harmonics: 0.6,
                timbre: 0.7,
                morph: 0.4,
                ..Patch::default()
            });
            engine.strike();
            for _ in 0..200 {
                for frame in render_block(&mut engine, &Modulations::default()) {
                    for s in frame.samples {
                        assert!(s.abs() <= 2.5, "model {model} produced {s}");
                    }
                }
            }
        }
    }

    #[test]
    fn engine_cv_shifts_active_model() {
        let mut engine = MultiWaves::new();
        engine.set_parameters(&Patch {
            model: 4,
            ..Patch::default()
        });
        let mods = Modulations {
            engine: 0.25,
            ..Modulations::default()
        };
        render_block(&mut engine, &mods);
        assert_eq!(engine.active_model(), 8);
        let mods = Modulations {
            engine: 1.0,
            ..Modulations::default()
        };
        render_block(&mut engine, &mods);
        assert_eq!(engine.active_model(), MODEL_COUNT - 1);
    }

    #[test]
    fn gate_opens_on_trigger_edge_only() {
        let mut engine = MultiWaves::new();
        engine.init();
        engine.set_parameters(&Patch {
            model: 0,
            decay: 0.2,
            ..Patch::default()
        });
        let low = Modulations {
            trigger_patched: true,
            trigger: 0.0,
            ..Modulations::default()
        };
        let high = Modulations {
            trigger: 1.0,
            ..low
        };
        // Closed gate: silence.
        let quiet = render_block(&mut engine, &low);
        assert!(quiet.iter().all(|f| f.samples[0].abs() < 1e-4));
        // Rising edge opens it.
        let open = render_block(&mut engine, &high);
        let energy: f32 = open.iter().map(|f| f.samples[0].abs()).sum();
        assert!(energy > 0.0);
    }

    #[test]
    fn level_input_scales_output() {
        let mut engine = MultiWaves::new();
        engine.init();
        engine.set_parameters(&Patch {
            model: 0,
            lpg_colour: 0.0,
            ..Patch::default()
        });
        let full = Modulations {
            level_patched: true,
            level: 1.0,
            ..Modulations::default()
        };
        let half = Modulations {
            level: 0.5,
            ..full
        };
        let mut a = MultiWaves::new();
        a.init();
        a.set_parameters(&Patch {
            model: 0,
            lpg_colour: 0.0,
            ..Patch::default()
        });
        let loud: f32 = render_block(&mut engine, &full)
            .iter()
            .map(|f| f.samples[0].abs())
            .sum();
        let soft: f32 = render_block(&mut a, &half)
            .iter()
            .map(|f| f.samples[0].abs())
            .sum();
        assert!((soft - loud * 0.5).abs() < 1e-3);
    }

    #[test]
    fn string_rings_after_strike() {
        let mut engine = MultiWaves::new();
        engine.init();
        engine.set_parameters(&Patch {
            model: 10,
            timbre: 0.2,
            ..Patch::default()
        });
        engine.strike();
        // Skip the excitation burst, then check the string still rings.
        for _ in 0..20 {
            render_block(&mut engine, &Modulations::default());
        }
        let ring: f32 = render_block(&mut engine, &Modulations::default())
            .iter()
            .map(|f| f.samples[0].abs())
            .sum();
        assert!(ring > 1e-3, "string decayed to {ring}");
    }
}
