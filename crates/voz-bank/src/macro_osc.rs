//! Macro-oscillator module front-end.
//!
//! Wraps a mono [`VoiceBank`] with the macro-oscillator control surface:
//! pitch in fixed-point code units with analog-style drift, a shape knob
//! over the engine's model list, meta-modulation (the FM input steps the
//! shape instead of bending pitch), and "signature" output waveshaping.
//!
//! Control mapping per voice:
//!
//! - `fm = fm_knob * fm_input[0]` - the FM input always reads channel 0
//! - `pitch = pitch_in(i) + coarse + fine / 12` volts, plus `fm` when meta
//!   modulation is off, plus low-CPU compensation, plus the unison spread
//!   offset in semitones / 12
//! - pitch code `= (pitch * 12 + 60) * 128 + drift`, clamped to [0, 16383]
//! - `timbre = timbre_knob + modulation_knob * timbre_in(i) / 5`
//! - `color = color_knob + color_in(i) / 5`
//! - shape `= round(shape_knob * (count - 1))`, plus
//!   `round(fm / 10 * (count - 1))` under meta modulation, clamped
//!
//! The trigger input is edge-detected here at 1.0 V and strikes the engine
//! directly.

use voz_core::{
    FoldbackShaper, Waveshaper, clamp_pitch_code, code_to_note, low_cpu_pitch_offset,
    signature_mix,
};
use voz_engine::{MacroWaves, SynthEngine};

use crate::bank::{Polyphony, RateMode, VoiceBank};
use crate::poly::{PolyInput, PolyOutput};
use crate::settings::{MacroSettings, SettingsError};
use crate::spread::spread_offset;

/// Knob values for one tick. All unit ranges are documented per field;
/// out-of-range values are clamped downstream.
#[derive(Debug, Clone, Copy)]
pub struct MacroParams {
    /// Shape selector, [0, 1] over the engine's model list.
    pub shape: f32,
    /// Coarse tune in volts (octaves), nominally [-2, 2].
    pub coarse: f32,
    /// Fine tune in semitones, nominally [-1, 1].
    pub fine: f32,
    /// FM attenuverter, [-1, 1].
    pub fm: f32,
    /// Timbre base, [0, 1].
    pub timbre: f32,
    /// Timbre CV attenuverter, [-1, 1].
    pub modulation: f32,
    /// Color base, [0, 1].
    pub color: f32,
}

impl Default for MacroParams {
    fn default() -> Self {
        Self {
            shape: 0.0,
            coarse: 0.0,
            fine: 0.0,
            fm: 0.0,
            timbre: 0.5,
            modulation: 0.0,
            color: 0.5,
        }
    }
}

/// Input port snapshot for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroInputs {
    /// 1 V/octave pitch; also the polyphony channel source.
    pub pitch: PolyInput,
    /// Trigger input, edge-detected at 1.0 V.
    pub trigger: PolyInput,
    /// Timbre CV.
    pub timbre: PolyInput,
    /// Color CV.
    pub color: PolyInput,
    /// FM CV (channel 0 only).
    pub fm: PolyInput,
}

/// The macro-oscillator module: 16-voice bank plus control mapping.
///
/// Generic over the engine and the signature waveshaper so tests can
/// substitute instrumented collaborators.
#[derive(Debug)]
pub struct MacroOsc<E: SynthEngine<1> = MacroWaves, W: Waveshaper = FoldbackShaper> {
    bank: VoiceBank<E, 1>,
    settings: MacroSettings,
    shaper: W,
    polyphony: Polyphony,
    spread: f32,
}

impl MacroOsc {
    /// Build the module with the default engine and shaper.
    pub fn new(host_rate: f32) -> Self {
        Self::with_parts(host_rate, |_| MacroWaves::new(), FoldbackShaper)
    }
}

impl<E: SynthEngine<1>, W: Waveshaper> MacroOsc<E, W> {
    /// Build the module from an engine factory and a shaper collaborator.
    pub fn with_parts(host_rate: f32, make: impl FnMut(usize) -> E, shaper: W) -> Self {
        Self {
            bank: VoiceBank::new(host_rate, make),
            settings: MacroSettings::default(),
            shaper,
            polyphony: Polyphony::PerChannel,
            spread: 0.0,
        }
    }

    /// Run one host tick: trigger detection, a render cycle when due, and
    /// one output frame per voice at 5 V full scale.
    pub fn process(&mut self, params: &MacroParams, inputs: &MacroInputs, output: &mut PolyOutput) {
        let voices = VoiceBank::<E, 1>::voices(self.polyphony, &inputs.pitch);
        output.set_channels(voices);

        let trigger_connected = inputs.trigger.is_connected();
        for i in 0..voices {
            let lane = self.bank.lane_mut(i);
            let high = trigger_connected && inputs.trigger.voltage(i) >= 1.0;
            if lane.gate.process(high) {
                lane.engine.strike();
            }
        }

        if self.bank.needs_render() {
            let settings = self.settings;
            let mode = if settings.low_cpu {
                RateMode::LowCpu
            } else {
                RateMode::Converted
            };
            let fm = params.fm * inputs.fm.channel0();
            let compensation = if settings.low_cpu {
                let native = self.bank.lane(0).engine.native_rate();
                low_cpu_pitch_offset(native, self.bank.host_sample_time())
            } else {
                0.0
            };
            let count = self.bank.lane(0).engine.model_count();
            let mut shape = (params.shape * (count - 1) as f32).round() as i32;
            if settings.meta_modulation {
                shape += (fm / 10.0 * (count - 1) as f32).round() as i32;
            }
            let shape = shape.clamp(0, count as i32 - 1) as usize;
            self.settings.shape = shape;

            let spread_amount = self.spread;
            let signature = {
                let s = f32::from(settings.signature) / 4.0;
                s * s
            };
            let shaper = &self.shaper;
            self.bank.render_cycle(
                voices,
                mode,
                |i, lane| {
                    let mut pitch = inputs.pitch.voltage(i) + params.coarse + params.fine / 12.0;
                    if !settings.meta_modulation {
                        pitch += fm;
                    }
                    pitch += compensation;
                    pitch += spread_offset(voices, i, spread_amount) / 12.0;
                    let mut code = ((pitch * 12.0 + 60.0) * 128.0) as i32;
                    code += lane.drift.render(settings.vco_drift);
                    lane.patch.note = code_to_note(clamp_pitch_code(code));
                    lane.patch.model = shape;
                    lane.patch.timbre =
                        (params.timbre + params.modulation * inputs.timbre.voltage(i) / 5.0)
                            .clamp(0.0, 1.0);
                    lane.patch.morph =
                        (params.color + inputs.color.voltage(i) / 5.0).clamp(0.0, 1.0);
                    lane.modulations.trigger_patched = trigger_connected;
                },
                |sample| signature_mix(shaper, sample, signature),
            );
        }

        self.bank
            .drain_into(voices, |i, frame| output.set_voltage(i, 5.0 * frame.samples[0]));
    }

    /// Current settings.
    pub fn settings(&self) -> &MacroSettings {
        &self.settings
    }

    /// Mutable settings access (menu-item updates).
    pub fn settings_mut(&mut self) -> &mut MacroSettings {
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

    /// Restore default settings.
    pub fn reset_settings(&mut self) {
        self.settings = MacroSettings::default();
    }

    /// The model voice 0 is actually sounding (display feedback).
    pub fn active_model(&self) -> usize {
        self.bank.lane(0).engine.active_model()
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
    pub fn bank(&self) -> &VoiceBank<E, 1> {
        &self.bank
    }
}
