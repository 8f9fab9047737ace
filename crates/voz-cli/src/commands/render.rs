//! Offline render command: drive a module front-end tick by tick and write
//! the mixed voice outputs to a WAV file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::debug;

use voz_bank::{
    MacroInputs, MacroOsc, MacroParams, MultiInputs, MultiParams, MultiVoice, Polyphony,
    PolyInput, PolyOutput,
};
use voz_engine::{MacroWaves, MultiWaves, SynthEngine};

use super::models::CliModule;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    pub(crate) output: PathBuf,

    /// Module to render
    #[arg(long, value_enum, default_value = "multi")]
    pub(crate) module: CliModule,

    /// Model / shape index
    #[arg(long, default_value = "0")]
    pub(crate) model: usize,

    /// Pitch in volts (1 V/octave, 0 V = C4)
    #[arg(long, default_value = "0.0")]
    pub(crate) pitch: f32,

    /// Harmonics macro (multi module), 0-1
    #[arg(long, default_value = "0.5")]
    pub(crate) harmonics: f32,

    /// Timbre macro, 0-1
    #[arg(long, default_value = "0.5")]
    pub(crate) timbre: f32,

    /// Morph / color macro, 0-1
    #[arg(long, default_value = "0.5")]
    pub(crate) morph: f32,

    /// Number of unison voices, 1-16
    #[arg(long, default_value = "1")]
    pub(crate) voices: u8,

    /// Unison spread amount, 0-1
    #[arg(long, default_value = "0.0")]
    pub(crate) spread: f32,

    /// Trigger rate in Hz (0 = free-running, no trigger cable)
    #[arg(long, default_value = "0.0")]
    pub(crate) trigger_hz: f32,

    /// Duration in seconds
    #[arg(long, default_value = "1.0")]
    pub(crate) duration: f32,

    /// Host sample rate
    #[arg(long, default_value = "48000")]
    pub(crate) sample_rate: u32,

    /// Skip rate conversion (low-CPU mode)
    #[arg(long)]
    pub(crate) low_cpu: bool,
}

/// Square-wave trigger voltage for tick `i`, or `None` when free-running.
fn trigger_voltage(args: &RenderArgs, tick: usize) -> Option<f32> {
    if args.trigger_hz <= 0.0 {
        return None;
    }
    let period = (args.sample_rate as f32 / args.trigger_hz).max(2.0) as usize;
    Some(if tick % period < period / 2 { 5.0 } else { 0.0 })
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let ticks = (args.duration * args.sample_rate as f32) as usize;
    let voices = args.voices.clamp(1, 16);
    println!(
        "Rendering {:?} model {} for {:.2}s at {} Hz ({} voice(s))...",
        args.module, args.model, args.duration, args.sample_rate, voices
    );
    debug!(ticks, low_cpu = args.low_cpu, "render loop starting");

    let (samples, channels) = match args.module {
        CliModule::Macro => (render_macro(&args, ticks, voices), 1),
        CliModule::Multi => (render_multi(&args, ticks, voices), 2),
    };

    let spec = hound::WavSpec {
        channels,
        sample_rate: args.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for &sample in &samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    println!(
        "Wrote {} samples to {}",
        samples.len(),
        args.output.display()
    );
    Ok(())
}

/// Mix the active voices of a poly output down to one normalized sample.
fn mixdown(output: &PolyOutput) -> f32 {
    let n = output.channels();
    let sum: f32 = (0..n).map(|c| output.voltage(c)).sum();
    sum / (5.0 * n as f32)
}

fn render_macro(args: &RenderArgs, ticks: usize, voices: u8) -> Vec<f32> {
    let mut module = MacroOsc::new(args.sample_rate as f32);
    module.settings_mut().low_cpu = args.low_cpu;
    module.set_polyphony(Polyphony::Unison(voices));
    module.set_spread(args.spread);
    let count = MacroWaves::new().model_count();
    let params = MacroParams {
        shape: args.model.min(count - 1) as f32 / (count - 1) as f32,
        timbre: args.timbre,
        color: args.morph,
        ..MacroParams::default()
    };
    let mut output = PolyOutput::new();
    let mut samples = Vec::with_capacity(ticks);
    for tick in 0..ticks {
        let inputs = MacroInputs {
            pitch: PolyInput::mono(args.pitch),
            trigger: trigger_voltage(args, tick).map_or_else(PolyInput::default, PolyInput::mono),
            ..MacroInputs::default()
        };
        module.process(&params, &inputs, &mut output);
        samples.push(mixdown(&output));
    }
    samples
}

fn render_multi(args: &RenderArgs, ticks: usize, voices: u8) -> Vec<f32> {
    let mut module = MultiVoice::new(args.sample_rate as f32);
    module.settings_mut().model = args.model.min(MultiWaves::new().model_count() - 1);
    module.settings_mut().low_cpu = args.low_cpu;
    module.set_polyphony(Polyphony::Unison(voices));
    module.set_spread(args.spread);
    let params = MultiParams {
        frequency: args.pitch,
        harmonics: args.harmonics,
        timbre: args.timbre,
        morph: args.morph,
        ..MultiParams::default()
    };
    let mut out = PolyOutput::new();
    let mut aux = PolyOutput::new();
    let mut samples = Vec::with_capacity(ticks * 2);
    for tick in 0..ticks {
        let inputs = MultiInputs {
            note: PolyInput::mono(args.pitch),
            trigger: trigger_voltage(args, tick).map_or_else(PolyInput::default, PolyInput::mono),
            ..MultiInputs::default()
        };
        module.process(&params, &inputs, &mut out, &mut aux);
        samples.push(mixdown(&out));
        samples.push(mixdown(&aux));
    }
    samples
}
