//! Multi-model voice module front-end.
//!
//! Wraps a stereo [`VoiceBank`] with the multi-engine control surface:
//! note-domain pitch, harmonics/timbre/morph macros with attenuverters,
//! low-pass-gate colour and decay from persisted sliders plus CV, and the
//! model selected by persisted settings with two bank-step buttons.
//!
//! Control mapping per voice:
//!
//! - `note = 60 + (freq_knob + low-CPU compensation) * 12 + spread offset`
//! - LPG colour/decay `= slider + cv(i) / 10`, clamped to [0, 1]
//! - modulations: `engine = cv / 5`, `note = cv * 12`, `frequency =
//!   fm[0] * 6`, `harmonics = cv / 5`, `timbre = cv / 8`, `morph = cv / 8`,
//!   `trigger = cv / 3`, `level = cv / 8`, plus the five patched flags
//!
//! Trigger edges are detected inside the engine (a ~0.9 V gate crosses its
//! 0.3 threshold after the `/ 3` scaling), so this module never calls
//! `strike` itself. Both outputs are inverted, at 5 V full scale.

use voz_core::{GateDetector, XorShift32, low_cpu_pitch_offset};
use voz_engine::{MultiWaves, SynthEngine};

use crate::bank::{Polyphony, RateMode, VoiceBank};
use crate::poly::{PolyInput, PolyOutput};
use crate::settings::{SettingsError, VoiceSettings};
use crate::spread::spread_offset;

/// Knob values for one tick.
#[derive(Debug, Clone, Copy)]
pub struct MultiParams {
    /// Coarse frequency in volts (octaves), nominally [-4, 4].
    pub frequency: f32,
    /// Harmonics macro, [0, 1].
    pub harmonics: f32,
    /// Timbre macro, [0, 1].
    pub timbre: f32,
    /// Morph macro, [0, 1].
    pub morph: f32,
    /// FM CV attenuverter, [-1, 1].
    pub frequency_cv: f32,
    /// Timbre CV attenuverter, [-1, 1].
    pub timbre_cv: f32,
    /// Morph CV attenuverter, [-1, 1].
    pub morph_cv: f32,
}

impl Default for MultiParams {
    fn default() -> Self {
        Self {
            frequency: 0.0,
            harmonics: 0.5,
            timbre: 0.5,
            morph: 0.5,
            frequency_cv: 0.0,
            timbre_cv: 0.0,
            morph_cv: 0.0,
        }
    }
}

/// Input port snapshot for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiInputs {
    /// Model-select CV.
    pub engine: PolyInput,
    /// 1 V/octave note input; also the polyphony channel source.
    pub note: PolyInput,
    /// FM input (channel 0 only).
    pub fm: PolyInput,
    /// Harmonics CV.
    pub harmonics: PolyInput,
    /// Timbre CV.
    pub timbre: PolyInput,
    /// Morph CV.
    pub morph: PolyInput,
    /// Trigger input, forwarded to the engine's internal edge detector.
    pub trigger: PolyInput,
    /// Level input for the low-pass gate.
    pub level: PolyInput,
    /// LPG colour CV.
    pub lpg_colour: PolyInput,
    /// LPG decay CV.
    pub lpg_decay: PolyInput,
}

/// The multi-model voice module: 16-voice stereo bank plus control mapping.
#[derive(Debug)]
pub struct MultiVoice<E: SynthEngine<2> = MultiWaves> {
    bank: VoiceBank<E, 2>,
    settings: VoiceSettings,
    button_a: GateDetector,
    button_b: GateDetector,
    polyphony: Polyphony,
    spread: f32,
}

impl MultiVoice {
    /// Build the module with the default engine.
    pub fn new(host_rate: f32) -> Self {
        Self::with_engines(host_rate, |_| MultiWaves::new())
    }
}

impl<E: SynthEngine<2>> MultiVoice<E> {
    /// Build the module from an engine factory.
    pub fn with_engines(host_rate: f32, make: impl FnMut(usize) -> E) -> Self {
        Self {
            bank: VoiceBank::new(host_rate, make),
            settings: VoiceSettings::default(),
            button_a: GateDetector::new(),
            button_b: GateDetector::new(),
            polyphony: Polyphony::PerChannel,
            spread: 0.0,
        }
    }

    /// Run one host tick: a render cycle when due, then one frame per voice
    /// to the main and auxiliary outputs (both inverted, 5 V full scale).
    pub fn process(
        &mut self,
        params: &MultiParams,
        inputs: &MultiInputs,
        out: &mut PolyOutput,
        aux: &mut PolyOutput,
    ) {
        let voices = VoiceBank::<E, 2>::voices(self.polyphony, &inputs.note);
        out.set_channels(voices);
        aux.set_channels(voices);

        if self.bank.needs_render() {
            let settings = self.settings;
            let mode = if settings.low_cpu {
                RateMode::LowCpu
            } else {
                RateMode::Converted
            };
            let compensation = if settings.low_cpu {
                let native = self.bank.lane(0).engine.native_rate();
                low_cpu_pitch_offset(native, self.bank.host_sample_time())
            } else {
                0.0
            };
            let count = self.bank.lane(0).engine.model_count();
            let model = settings.model.min(count.saturating_sub(1));
            let spread_amount = self.spread;
            self.bank.render_cycle(
                voices,
                mode,
                |i, lane| {
                    lane.patch.note = 60.0
                        + (params.frequency + compensation) * 12.0
                        + spread_offset(voices, i, spread_amount);
                    lane.patch.harmonics = params.harmonics.clamp(0.0, 1.0);
                    lane.patch.timbre = params.timbre.clamp(0.0, 1.0);
                    lane.patch.morph = params.morph.clamp(0.0, 1.0);
                    lane.patch.model = model;
                    lane.patch.frequency_modulation_amount = params.frequency_cv;
                    lane.patch.timbre_modulation_amount = params.timbre_cv;
                    lane.patch.morph_modulation_amount = params.morph_cv;
                    lane.patch.lpg_colour =
                        (settings.lpg_colour + inputs.lpg_colour.voltage(i) / 10.0)
                            .clamp(0.0, 1.0);
                    lane.patch.decay = (settings.decay + inputs.lpg_decay.voltage(i) / 10.0)
                        .clamp(0.0, 1.0);

                    let m = &mut lane.modulations;
                    m.engine = inputs.engine.voltage(i) / 5.0;
                    m.note = inputs.note.voltage(i) * 12.0;
                    m.frequency = inputs.fm.channel0() * 6.0;
                    m.harmonics = inputs.harmonics.voltage(i) / 5.0;
                    m.timbre = inputs.timbre.voltage(i) / 8.0;
                    m.morph = inputs.morph.voltage(i) / 8.0;
                    m.trigger = inputs.trigger.voltage(i) / 3.0;
                    m.level = inputs.level.voltage(i) / 8.0;
                    m.frequency_patched = inputs.fm.is_connected();
                    m.timbre_patched = inputs.timbre.is_connected();
                    m.morph_patched = inputs.morph.is_connected();
                    m.trigger_patched = inputs.trigger.is_connected();
                    m.level_patched = inputs.level.is_connected();
                },
                |sample| sample,
            );
        }

        self.bank.drain_into(voices, |i, frame| {
            out.set_voltage(i, -5.0 * frame.samples[0]);
            aux.set_voltage(i, -5.0 * frame.samples[1]);
        });
    }

    /// Step within the lower model bank, or drop back into it from the
    /// upper one. Edge-detected: pass the raw button level every tick.
    pub fn step_model_bank_a(&mut self, pressed: bool) {
        if self.button_a.process(pressed) {
            let half = self.half_count();
            let model = self.settings.model;
            self.settings.model = if model >= half {
                model - half
            } else {
                (model + 1) % half
            };
        }
    }

    /// Step within the upper model bank, or jump into it from the lower
    /// one. Edge-detected: pass the raw button level every tick.
    pub fn step_model_bank_b(&mut self, pressed: bool) {
        if self.button_b.process(pressed) {
            let half = self.half_count();
            let model = self.settings.model;
            self.settings.model = if model < half {
                model + half
            } else {
                half + (model - half + 1) % half
            };
        }
    }

    /// Pick a random model.
    pub fn randomize_model(&mut self, rng: &mut XorShift32) {
        let count = self.bank.lane(0).engine.model_count().max(1);
        self.settings.model = rng.next_u32() as usize % count;
    }

    /// The model voice 0 is actually sounding, after model-select CV.
    pub fn active_model(&self) -> usize {
        self.bank.lane(0).engine.active_model()
    }

    /// Current settings.
    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Mutable settings access (menu-item updates).
    pub fn settings_mut(&mut self) -> &mut VoiceSettings {
        &mut self.settings
    }

    /// Serialize the persisted settings blob.
    pub fn save_settings(&self) -> Result<String, SettingsError> {
        self.settings.save()
    }

    /// Merge a persisted settings blob, field-tolerantly.
    pub fn load_settings(&mut self, blob: &str) -> Result<(), SettingsError> {
        self.settings.load(blob)
    }

    /// Restore model 0 and centered LPG sliders.
    pub fn reset_settings(&mut self) {
        self.settings = VoiceSettings::default();
    }

    /// Set the voice-count policy.
    pub fn set_polyphony(&mut self, polyphony: Polyphony) {
        self.polyphony = polyphony;
    }

    /// Set the unison spread amount, [0, 1].
    pub fn set_spread(&mut self, spread: f32) {
        self.spread = spread.clamp(0.0, 1.0);
    }

    /// Follow a host sample-rate change.
    pub fn set_host_rate(&mut self, host_rate: f32) {
        self.bank.set_host_rate(host_rate);
    }

    /// The underlying bank (tests and benches).
    pub fn bank(&self) -> &VoiceBank<E, 2> {
        &self.bank
    }

    fn half_count(&self) -> usize {
        (self.bank.lane(0).engine.model_count() / 2).max(1)
    }
}
