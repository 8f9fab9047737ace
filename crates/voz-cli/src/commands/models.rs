//! Model listing command.

use clap::{Args, ValueEnum};
use voz_engine::{MacroWaves, MultiWaves, SynthEngine};

/// Module selector shared with the render command.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliModule {
    /// Mono macro-shape oscillator (24-frame blocks at 96 kHz)
    Macro,
    /// Stereo multi-model voice (12-frame blocks at 48 kHz)
    #[default]
    Multi,
}

pub(crate) const MACRO_MODEL_NAMES: [&str; 8] = [
    "sine (folded)",
    "triangle (folded)",
    "saw / octave blend",
    "pulse",
    "saw-pulse morph",
    "sync saw",
    "ring sine",
    "filtered noise",
];

pub(crate) const MULTI_MODEL_NAMES: [&str; 16] = [
    "virtual analog",
    "waveshaper",
    "two-op FM",
    "formant",
    "harmonic",
    "wave morph",
    "chord",
    "saw swarm",
    "filtered noise",
    "particle",
    "plucked string",
    "modal",
    "kick",
    "snare",
    "hi-hat",
    "phase distortion",
];

#[derive(Args)]
pub struct ModelsArgs {
    /// Module to list; omit for both
    #[arg(long, value_enum)]
    module: Option<CliModule>,
}

pub fn run(args: ModelsArgs) -> anyhow::Result<()> {
    let both = args.module.is_none();
    if both || matches!(args.module, Some(CliModule::Macro)) {
        let engine = MacroWaves::new();
        println!(
            "macro module: {} shapes, {} frames/block at {} Hz",
            engine.model_count(),
            engine.block_size(),
            engine.native_rate()
        );
        for (i, name) in MACRO_MODEL_NAMES.iter().enumerate() {
            println!("  {i:2}  {name}");
        }
    }
    if both || matches!(args.module, Some(CliModule::Multi)) {
        let engine = MultiWaves::new();
        println!(
            "multi module: {} models, {} frames/block at {} Hz",
            engine.model_count(),
            engine.block_size(),
            engine.native_rate()
        );
        for (i, name) in MULTI_MODEL_NAMES.iter().enumerate() {
            println!("  {i:2}  {name}");
        }
    }
    Ok(())
}
