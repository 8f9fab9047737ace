//! Per-voice state.
//!
//! A [`VoiceLane`] is one slot of the fixed 16-entry voice arena: the owned
//! engine instance plus everything the pipeline keeps per voice - patch,
//! modulations, trigger memory, drift source, rate-converter history, and
//! the bounded output queue. Lanes never share state; the only cross-voice
//! coupling in the whole bank is the voice-0 render gate in
//! [`VoiceBank`](crate::bank::VoiceBank).

use voz_core::{DriftSource, Frame, FrameQueue, GateDetector, RateConverter};
use voz_engine::{Modulations, Patch, SynthEngine};

use crate::bank::RateMode;

/// Largest engine block the pipeline supports, in frames.
pub const MAX_BLOCK: usize = 24;

/// One voice: engine, control state, and output plumbing.
#[derive(Debug)]
pub struct VoiceLane<E: SynthEngine<CH>, const CH: usize> {
    /// The owned synthesis engine.
    pub engine: E,
    /// Slow parameters, rewritten by the control mapper before each block.
    pub patch: Patch,
    /// Per-block CV-derived inputs.
    pub modulations: Modulations,
    /// Trigger-edge memory for externally detected strikes.
    pub gate: GateDetector,
    /// Analog-style pitch drift, independently seeded per lane.
    pub drift: DriftSource,
    converter: RateConverter<CH>,
    queue: FrameQueue<CH>,
    last: Frame<CH>,
}

impl<E: SynthEngine<CH>, const CH: usize> VoiceLane<E, CH> {
    /// Build a lane around an engine. The engine is initialized here; the
    /// converter starts at `native_rate -> host_rate`.
    pub fn new(mut engine: E, drift_seed: u32, host_rate: f32) -> Self {
        engine.init();
        debug_assert!(engine.block_size() <= MAX_BLOCK);
        let native = engine.native_rate();
        Self {
            engine,
            patch: Patch::default(),
            modulations: Modulations::default(),
            gate: GateDetector::new(),
            drift: DriftSource::new(drift_seed),
            converter: RateConverter::new(native, host_rate),
            queue: FrameQueue::new(),
            last: Frame::default(),
        }
    }

    /// Point the converter at a new host rate and drop queued frames.
    pub fn set_host_rate(&mut self, host_rate: f32) {
        self.converter.set_rates(self.engine.native_rate(), host_rate);
        self.queue.clear();
    }

    /// The lane's output queue.
    pub fn queue(&self) -> &FrameQueue<CH> {
        &self.queue
    }

    /// Render one engine block into the queue, applying `shape` to every
    /// sample first.
    ///
    /// Returns `false` without touching the engine when the queue cannot
    /// hold the block's worth of converted frames - the backpressure rule:
    /// a full queue skips the voice for the cycle rather than dropping
    /// frames mid-block.
    pub fn render_block(&mut self, mode: RateMode, shape: impl Fn(f32) -> f32) -> bool {
        let len = self.engine.block_size().min(MAX_BLOCK);
        let needed = match mode {
            RateMode::LowCpu => len,
            RateMode::Converted => self.converter.max_output_for(len),
        };
        if self.queue.remaining() < needed {
            return false;
        }
        let mut block = [Frame::<CH>::default(); MAX_BLOCK];
        let sync = [0u8; MAX_BLOCK];
        self.engine.set_parameters(&self.patch);
        self.engine
            .render(&self.modulations, &sync[..len], &mut block[..len]);
        for frame in &mut block[..len] {
            for sample in &mut frame.samples {
                *sample = shape(*sample);
            }
        }
        match mode {
            RateMode::LowCpu => {
                for &frame in &block[..len] {
                    self.queue.push(frame);
                }
            }
            RateMode::Converted => {
                let queue = &mut self.queue;
                self.converter.process(&block[..len], |frame| {
                    queue.push(frame);
                });
            }
        }
        true
    }

    /// Pop one frame for this tick. An empty queue holds the previous
    /// output value.
    pub fn drain(&mut self) -> Frame<CH> {
        if let Some(frame) = self.queue.pop() {
            self.last = frame;
        }
        self.last
    }

    /// Reset engine and plumbing to the just-built state.
    pub fn reset(&mut self) {
        self.engine.init();
        self.patch = Patch::default();
        self.modulations = Modulations::default();
        self.gate.reset();
        self.drift.reset();
        self.converter.reset();
        self.queue.clear();
        self.last = Frame::default();
    }
}
