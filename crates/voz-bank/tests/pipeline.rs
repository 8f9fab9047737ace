//! End-to-end pipeline tests: multiplexing, triggering, render gating,
//! backpressure, rate conversion, and the two module front-ends.

use voz_bank::bank::RateMode;
use voz_bank::{
    MacroInputs, MacroOsc, MacroParams, MultiInputs, MultiParams, MultiVoice, Polyphony,
    PolyInput, PolyOutput, VoiceLane,
};
use voz_core::{Frame, XorShift32};
use voz_engine::{MacroWaves, Modulations, Patch, SynthEngine};

// ---------------------------------------------------------------------------
// Instrumented engines
// ---------------------------------------------------------------------------

/// Mono engine that counts calls and plays back a constant taken from the
/// patch timbre, scaled up so waveshaping has something to fold.
#[derive(Debug, Clone)]
struct CountingEngine {
    native: f32,
    renders: usize,
    strikes: usize,
    value: f32,
}

impl CountingEngine {
    fn new(native: f32) -> Self {
        Self {
            native,
            renders: 0,
            strikes: 0,
            value: 0.0,
        }
    }
}

impl SynthEngine<1> for CountingEngine {
    fn init(&mut self) {
        self.renders = 0;
        self.strikes = 0;
    }

    fn set_parameters(&mut self, patch: &Patch) {
        self.value = patch.timbre * 2.0;
    }

    fn strike(&mut self) {
        self.strikes += 1;
    }

    fn render(&mut self, _modulations: &Modulations, _sync: &[u8], output: &mut [Frame<1>]) {
        self.renders += 1;
        for frame in output {
            *frame = Frame::mono(self.value);
        }
    }

    fn active_model(&self) -> usize {
        0
    }

    fn model_count(&self) -> usize {
        8
    }

    fn block_size(&self) -> usize {
        24
    }

    fn native_rate(&self) -> f32 {
        self.native
    }
}

/// Stereo engine playing a constant on both channels (aux negated).
#[derive(Debug, Clone)]
struct ConstStereo {
    value: f32,
}

impl SynthEngine<2> for ConstStereo {
    fn init(&mut self) {}
    fn set_parameters(&mut self, _patch: &Patch) {}
    fn strike(&mut self) {}

    fn render(&mut self, _modulations: &Modulations, _sync: &[u8], output: &mut [Frame<2>]) {
        for frame in output {
            *frame = Frame::stereo(self.value, -self.value);
        }
    }

    fn active_model(&self) -> usize {
        0
    }

    fn model_count(&self) -> usize {
        16
    }

    fn block_size(&self) -> usize {
        12
    }

    fn native_rate(&self) -> f32 {
        48_000.0
    }
}

fn macro_module(host_rate: f32) -> MacroOsc {
    MacroOsc::new(host_rate)
}

// ---------------------------------------------------------------------------
// Multiplexing
// ---------------------------------------------------------------------------

#[test]
fn output_channels_follow_pitch_input() {
    let mut module = macro_module(48_000.0);
    let mut output = PolyOutput::new();
    for n in 1..=16 {
        let inputs = MacroInputs {
            pitch: PolyInput::new(&vec![0.0; n]),
            ..MacroInputs::default()
        };
        module.process(&MacroParams::default(), &inputs, &mut output);
        assert_eq!(output.channels(), n, "with {n} pitch channels");
    }
}

#[test]
fn disconnected_pitch_still_yields_one_voice() {
    let mut module = macro_module(48_000.0);
    let mut output = PolyOutput::new();
    module.process(
        &MacroParams::default(),
        &MacroInputs::default(),
        &mut output,
    );
    assert_eq!(output.channels(), 1);
}

#[test]
fn unison_mode_overrides_input_channels() {
    let mut module = macro_module(48_000.0);
    module.set_polyphony(Polyphony::Unison(6));
    let mut output = PolyOutput::new();
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    module.process(&MacroParams::default(), &inputs, &mut output);
    assert_eq!(output.channels(), 6);
}

#[test]
fn several_modules_coexist_in_one_stack_frame() {
    // The lane arena lives on the heap, so module values stay small and a
    // handful of them can be plain locals in one function.
    assert!(std::mem::size_of::<MultiVoice>() < 256);
    assert!(std::mem::size_of::<MacroOsc>() < 256);
    let mut multi_a = MultiVoice::new(48_000.0);
    let mut multi_b = MultiVoice::new(48_000.0);
    let mut macro_a = macro_module(48_000.0);
    let mut macro_b = macro_module(48_000.0);
    let mut out = PolyOutput::new();
    let mut aux = PolyOutput::new();
    let multi_in = MultiInputs {
        note: PolyInput::mono(0.0),
        ..MultiInputs::default()
    };
    let macro_in = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    for _ in 0..24 {
        multi_a.process(&MultiParams::default(), &multi_in, &mut out, &mut aux);
        multi_b.process(&MultiParams::default(), &multi_in, &mut out, &mut aux);
        macro_a.process(&MacroParams::default(), &macro_in, &mut out);
        macro_b.process(&MacroParams::default(), &macro_in, &mut out);
    }
}

// ---------------------------------------------------------------------------
// Triggering
// ---------------------------------------------------------------------------

#[test]
fn trigger_sequence_fires_exactly_two_strikes() {
    let mut module = MacroOsc::with_parts(
        96_000.0,
        |_| CountingEngine::new(96_000.0),
        voz_core::FoldbackShaper,
    );
    let mut output = PolyOutput::new();
    for volts in [0.0_f32, 0.0, 1.0, 1.0, 0.0, 1.0] {
        let inputs = MacroInputs {
            pitch: PolyInput::mono(0.0),
            trigger: PolyInput::mono(volts),
            ..MacroInputs::default()
        };
        module.process(&MacroParams::default(), &inputs, &mut output);
    }
    assert_eq!(module.bank().lane(0).engine.strikes, 2);
}

#[test]
fn disconnected_trigger_never_strikes() {
    let mut module = MacroOsc::with_parts(
        96_000.0,
        |_| CountingEngine::new(96_000.0),
        voz_core::FoldbackShaper,
    );
    let mut output = PolyOutput::new();
    for _ in 0..100 {
        let inputs = MacroInputs {
            pitch: PolyInput::mono(0.0),
            ..MacroInputs::default()
        };
        module.process(&MacroParams::default(), &inputs, &mut output);
    }
    assert_eq!(module.bank().lane(0).engine.strikes, 0);
}

// ---------------------------------------------------------------------------
// Render gating and backpressure
// ---------------------------------------------------------------------------

#[test]
fn renders_are_gated_by_voice_zero_queue() {
    let mut module = MacroOsc::with_parts(
        96_000.0,
        |_| CountingEngine::new(96_000.0),
        voz_core::FoldbackShaper,
    );
    let mut output = PolyOutput::new();
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    // Identity conversion: one 24-frame block serves 24 ticks.
    for _ in 0..240 {
        module.process(&MacroParams::default(), &inputs, &mut output);
    }
    assert_eq!(module.bank().lane(0).engine.renders, 10);
}

#[test]
fn full_queue_skips_the_engine_entirely() {
    let mut lane: VoiceLane<CountingEngine, 1> =
        VoiceLane::new(CountingEngine::new(96_000.0), 1, 96_000.0);
    for _ in 0..10 {
        assert!(lane.render_block(RateMode::Converted, |s| s));
    }
    assert_eq!(lane.engine.renders, 10);
    // 240 of 256 frames queued: no room for a full block.
    assert!(!lane.render_block(RateMode::Converted, |s| s));
    assert_eq!(lane.engine.renders, 10, "render was not skipped");
}

// ---------------------------------------------------------------------------
// Rate conversion and low-CPU mode
// ---------------------------------------------------------------------------

fn count_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count()
}

#[test]
fn low_cpu_compensation_preserves_pitch() {
    // Model 0 at timbre 0 is a pure sine; compare fundamental frequency
    // with conversion against low-CPU playback at a 48 kHz host.
    let params = MacroParams {
        timbre: 0.0,
        ..MacroParams::default()
    };
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    let ticks = 24_000;
    let mut crossings = [0usize; 2];
    for (slot, low_cpu) in [(0, false), (1, true)] {
        let mut module = macro_module(48_000.0);
        module.settings_mut().low_cpu = low_cpu;
        let mut output = PolyOutput::new();
        let mut samples = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            module.process(&params, &inputs, &mut output);
            samples.push(output.voltage(0));
        }
        crossings[slot] = count_crossings(&samples[1000..]);
    }
    let diff = crossings[0].abs_diff(crossings[1]);
    assert!(
        diff * 20 < crossings[0].max(1),
        "converted {} vs low-cpu {} crossings",
        crossings[0],
        crossings[1]
    );
}

#[test]
fn host_rate_change_restarts_queues() {
    let mut module = macro_module(44_100.0);
    let mut output = PolyOutput::new();
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    module.process(&MacroParams::default(), &inputs, &mut output);
    assert!(!module.bank().needs_render());
    module.set_host_rate(96_000.0);
    assert!(module.bank().needs_render());
}

// ---------------------------------------------------------------------------
// Control mapping
// ---------------------------------------------------------------------------

#[test]
fn meta_modulation_steps_the_shape() {
    let mut module = macro_module(96_000.0);
    module.settings_mut().meta_modulation = true;
    let mut output = PolyOutput::new();
    let params = MacroParams {
        fm: 1.0,
        ..MacroParams::default()
    };
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        fm: PolyInput::mono(5.0),
        ..MacroInputs::default()
    };
    module.process(&params, &inputs, &mut output);
    // shape 0 + round(5 / 10 * 7) = 4
    assert_eq!(module.settings().shape, 4);
    assert_eq!(module.active_model(), 4);
}

#[test]
fn fm_bends_pitch_when_meta_is_off() {
    let mut module = macro_module(96_000.0);
    let mut output = PolyOutput::new();
    let params = MacroParams {
        fm: 1.0,
        ..MacroParams::default()
    };
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        fm: PolyInput::mono(1.0),
        ..MacroInputs::default()
    };
    module.process(&params, &inputs, &mut output);
    // +1 V of FM is one octave: note 72 instead of 60.
    let note = module.bank().lane(0).patch.note;
    assert!((note - 72.0).abs() < 0.02, "note was {note}");
}

#[test]
fn signature_waveshaping_folds_overdriven_output() {
    // The counting engine plays a constant 2.0 (timbre 1.0 doubled): full
    // signature folds it back to 0, no signature passes it to 10 V.
    let params = MacroParams {
        timbre: 1.0,
        ..MacroParams::default()
    };
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    for (signature, expected) in [(0u8, 10.0f32), (4, 0.0)] {
        let mut module = MacroOsc::with_parts(
            96_000.0,
            |_| CountingEngine::new(96_000.0),
            voz_core::FoldbackShaper,
        );
        module.settings_mut().signature = signature;
        let mut output = PolyOutput::new();
        module.process(&params, &inputs, &mut output);
        assert!(
            (output.voltage(0) - expected).abs() < 1e-4,
            "signature {signature} gave {}",
            output.voltage(0)
        );
    }
}

#[test]
fn unison_spread_lands_on_octaves_at_full_amount() {
    let mut module = macro_module(96_000.0);
    module.set_polyphony(Polyphony::Unison(4));
    module.set_spread(1.0);
    let mut output = PolyOutput::new();
    let inputs = MacroInputs {
        pitch: PolyInput::mono(0.0),
        ..MacroInputs::default()
    };
    module.process(&MacroParams::default(), &inputs, &mut output);
    let expected = [48.0, 60.0, 72.0, 48.0];
    for (i, want) in expected.into_iter().enumerate() {
        let note = module.bank().lane(i).patch.note;
        assert!((note - want).abs() < 0.02, "voice {i}: note {note}");
    }
}

// ---------------------------------------------------------------------------
// Multi-voice module
// ---------------------------------------------------------------------------

#[test]
fn multi_outputs_are_inverted_and_scaled() {
    let mut module = MultiVoice::with_engines(48_000.0, |_| ConstStereo { value: 0.4 });
    let mut out = PolyOutput::new();
    let mut aux = PolyOutput::new();
    let inputs = MultiInputs {
        note: PolyInput::mono(0.0),
        ..MultiInputs::default()
    };
    module.process(&MultiParams::default(), &inputs, &mut out, &mut aux);
    assert!((out.voltage(0) + 2.0).abs() < 1e-5);
    assert!((aux.voltage(0) - 2.0).abs() < 1e-5);
}

#[test]
fn multi_trigger_gates_the_voice() {
    let mut module = MultiVoice::new(48_000.0);
    let mut out = PolyOutput::new();
    let mut aux = PolyOutput::new();
    let quiet = MultiInputs {
        note: PolyInput::mono(0.0),
        trigger: PolyInput::mono(0.0),
        ..MultiInputs::default()
    };
    let mut energy = 0.0_f32;
    for _ in 0..48 {
        module.process(&MultiParams::default(), &quiet, &mut out, &mut aux);
        energy += out.voltage(0).abs();
    }
    assert!(energy < 1e-3, "gated voice leaked {energy}");
    let struck = MultiInputs {
        trigger: PolyInput::mono(3.0),
        ..quiet
    };
    let mut energy = 0.0_f32;
    for _ in 0..48 {
        module.process(&MultiParams::default(), &struck, &mut out, &mut aux);
        energy += out.voltage(0).abs();
    }
    assert!(energy > 0.01, "trigger did not open the gate");
}

#[test]
fn model_bank_buttons_step_and_cross_banks() {
    let mut module = MultiVoice::new(48_000.0);
    assert_eq!(module.settings().model, 0);
    module.step_model_bank_a(true);
    module.step_model_bank_a(false);
    module.step_model_bank_a(true);
    assert_eq!(module.settings().model, 2);
    // Jump to the upper bank, step within it.
    module.step_model_bank_b(true);
    assert_eq!(module.settings().model, 10);
    module.step_model_bank_b(false);
    module.step_model_bank_b(true);
    assert_eq!(module.settings().model, 11);
    // Button A drops back into the lower bank.
    module.step_model_bank_a(false);
    module.step_model_bank_a(true);
    assert_eq!(module.settings().model, 3);
}

#[test]
fn randomize_model_stays_in_range() {
    let mut module = MultiVoice::new(48_000.0);
    let mut rng = XorShift32::new(99);
    for _ in 0..100 {
        module.randomize_model(&mut rng);
        assert!(module.settings().model < 16);
    }
}

#[test]
fn settings_round_trip_through_modules() {
    let mut module = MultiVoice::new(48_000.0);
    module.settings_mut().model = 9;
    module.settings_mut().low_cpu = true;
    module.settings_mut().decay = 0.8;
    let blob = module.save_settings().unwrap();
    let mut restored = MultiVoice::new(48_000.0);
    restored.load_settings(&blob).unwrap();
    assert_eq!(restored.settings(), module.settings());

    let mut module = macro_module(48_000.0);
    module.settings_mut().vco_drift = 2;
    module.settings_mut().signature = 3;
    let blob = module.save_settings().unwrap();
    let mut restored = macro_module(48_000.0);
    restored.load_settings(&blob).unwrap();
    assert_eq!(restored.settings(), module.settings());
}
