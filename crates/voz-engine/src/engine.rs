//! The synthesis engine contract.

use voz_core::Frame;

use crate::patch::{Modulations, Patch};

/// A fixed-block synthesis engine with `CH` output channels.
///
/// The voice bank drives every engine through this trait and nothing else:
///
/// 1. [`init`](SynthEngine::init) once after construction,
/// 2. [`set_parameters`](SynthEngine::set_parameters) then
///    [`render`](SynthEngine::render) once per block,
/// 3. [`strike`](SynthEngine::strike) on externally detected trigger edges.
///
/// # Contract
///
/// - `render` always receives exactly [`block_size`](SynthEngine::block_size)
///   frames and a `sync` slice of the same length (nonzero bytes request a
///   hard phase reset at that frame); it must fill the whole buffer.
/// - Output samples are nominally in [-1.0, 1.0]; the bank scales to volts.
/// - Engines clamp every parameter; nothing in the render path can fail.
/// - `render` must not allocate, lock, or block.
pub trait SynthEngine<const CH: usize> {
    /// Reset all internal state. Called once before first use.
    fn init(&mut self);

    /// Latch the slow parameters for the next block.
    fn set_parameters(&mut self, patch: &Patch);

    /// Excite the voice (note-on). Engines without excitation state may
    /// ignore this.
    fn strike(&mut self);

    /// Render one block of `block_size()` frames into `output`.
    fn render(&mut self, modulations: &Modulations, sync: &[u8], output: &mut [Frame<CH>]);

    /// The model actually sounding, after model-select CV is applied.
    fn active_model(&self) -> usize;

    /// Number of selectable models.
    fn model_count(&self) -> usize;

    /// Fixed render block length in frames.
    fn block_size(&self) -> usize;

    /// Fixed internal sample rate in Hz.
    fn native_rate(&self) -> f32;
}
