//! The voice bank: a fixed arena of 16 lanes and the per-tick pipeline.

use voz_core::Frame;
use voz_engine::SynthEngine;

use crate::lane::VoiceLane;
use crate::poly::{MAX_VOICES, PolyInput};

/// How the active voice count is resolved each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polyphony {
    /// One voice per channel of the pitch/note input, at least one.
    PerChannel,
    /// A fixed voice count, all playing the same note with unison spread.
    Unison(u8),
}

/// Whether rendered blocks pass through the sample-rate converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
    /// Windowed-sinc conversion from the engine's native rate to the host
    /// rate.
    Converted,
    /// Native-rate frames played back directly; the control mapper adds a
    /// pitch compensation instead.
    LowCpu,
}

/// Fixed arena of 16 voice lanes plus the host-rate bookkeeping.
///
/// The bank is the render-side half of a module front-end: the front-end
/// maps controls, the bank owns gating, rendering, and draining. Voice 0's
/// queue is the render gate for the whole bank: a cycle renders every
/// active voice exactly when voice 0 has run dry, which keeps all queues in
/// lockstep without per-voice bookkeeping.
///
/// The arena is boxed: a lane carries kilobytes of queue, converter, and
/// engine state, so 16 of them by value would make every module a
/// stack-buster. The one allocation happens at construction, never on the
/// tick path.
#[derive(Debug)]
pub struct VoiceBank<E: SynthEngine<CH>, const CH: usize> {
    lanes: Box<[VoiceLane<E, CH>]>,
    host_rate: f32,
}

impl<E: SynthEngine<CH>, const CH: usize> VoiceBank<E, CH> {
    /// Build 16 lanes from an engine factory. Each lane gets its own drift
    /// seed so unison voices wander independently. Lanes are collected
    /// straight into the heap so construction never stages the full arena
    /// on the stack.
    pub fn new(host_rate: f32, mut make: impl FnMut(usize) -> E) -> Self {
        Self {
            lanes: (0..MAX_VOICES)
                .map(|i| {
                    let seed = 0x6472_6674 ^ (i as u32).wrapping_mul(0x9e37_79b9);
                    VoiceLane::new(make(i), seed, host_rate)
                })
                .collect(),
            host_rate,
        }
    }

    /// Re-point every converter at a new host rate.
    pub fn set_host_rate(&mut self, host_rate: f32) {
        self.host_rate = host_rate.max(1.0);
        for lane in self.lanes.iter_mut() {
            lane.set_host_rate(self.host_rate);
        }
    }

    /// Host sample period in seconds.
    pub fn host_sample_time(&self) -> f32 {
        1.0 / self.host_rate
    }

    /// Resolve the active voice count for this tick, in [1, 16].
    pub fn voices(polyphony: Polyphony, channel_source: &PolyInput) -> usize {
        match polyphony {
            Polyphony::PerChannel => channel_source.channels().max(1),
            Polyphony::Unison(v) => (v as usize).clamp(1, MAX_VOICES),
        }
    }

    /// True when voice 0's queue has run dry and a render cycle is due.
    pub fn needs_render(&self) -> bool {
        self.lanes[0].queue().is_empty()
    }

    /// Run one render cycle over the first `count` lanes: `map` rewrites a
    /// lane's patch and modulations, then the lane renders one block (or
    /// skips itself under backpressure). No-op unless a cycle is due.
    pub fn render_cycle(
        &mut self,
        count: usize,
        mode: RateMode,
        mut map: impl FnMut(usize, &mut VoiceLane<E, CH>),
        shape: impl Fn(f32) -> f32,
    ) {
        if !self.needs_render() {
            return;
        }
        for (i, lane) in self.lanes.iter_mut().take(count.min(MAX_VOICES)).enumerate() {
            map(i, lane);
            lane.render_block(mode, &shape);
        }
    }

    /// Pop one frame from each of the first `count` lanes.
    pub fn drain_into(&mut self, count: usize, mut write: impl FnMut(usize, Frame<CH>)) {
        for (i, lane) in self.lanes.iter_mut().take(count.min(MAX_VOICES)).enumerate() {
            write(i, lane.drain());
        }
    }

    /// Shared access to one lane.
    pub fn lane(&self, index: usize) -> &VoiceLane<E, CH> {
        &self.lanes[index.min(MAX_VOICES - 1)]
    }

    /// Exclusive access to one lane.
    pub fn lane_mut(&mut self, index: usize) -> &mut VoiceLane<E, CH> {
        &mut self.lanes[index.min(MAX_VOICES - 1)]
    }

    /// Reset every lane to the just-built state.
    pub fn reset(&mut self) {
        for lane in self.lanes.iter_mut() {
            lane.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voz_engine::MacroWaves;

    fn bank() -> VoiceBank<MacroWaves, 1> {
        VoiceBank::new(96_000.0, |_| MacroWaves::new())
    }

    #[test]
    fn voice_count_follows_input_channels() {
        let poly = PolyInput::new(&[0.0; 5]);
        assert_eq!(VoiceBank::<MacroWaves, 1>::voices(Polyphony::PerChannel, &poly), 5);
        let none = PolyInput::disconnected();
        assert_eq!(VoiceBank::<MacroWaves, 1>::voices(Polyphony::PerChannel, &none), 1);
    }

    #[test]
    fn unison_count_clamps() {
        let poly = PolyInput::mono(0.0);
        assert_eq!(VoiceBank::<MacroWaves, 1>::voices(Polyphony::Unison(0), &poly), 1);
        assert_eq!(VoiceBank::<MacroWaves, 1>::voices(Polyphony::Unison(99), &poly), 16);
    }

    #[test]
    fn render_cycle_waits_for_voice_zero() {
        let mut bank = bank();
        assert!(bank.needs_render());
        bank.render_cycle(2, RateMode::Converted, |_, _| {}, |s| s);
        assert!(!bank.needs_render());
        let filled = bank.lane(0).queue().len();
        // Until voice 0 drains, further cycles are no-ops.
        bank.render_cycle(2, RateMode::Converted, |_, _| {}, |s| s);
        assert_eq!(bank.lane(0).queue().len(), filled);
    }

    #[test]
    fn mapper_sees_each_active_lane_once() {
        let mut bank = bank();
        let mut seen = Vec::new();
        bank.render_cycle(3, RateMode::Converted, |i, _| seen.push(i), |s| s);
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn drain_pops_one_frame_per_lane() {
        let mut bank = bank();
        bank.render_cycle(4, RateMode::Converted, |_, _| {}, |s| s);
        let before = bank.lane(2).queue().len();
        let mut drained = 0;
        bank.drain_into(4, |_, _| drained += 1);
        assert_eq!(drained, 4);
        assert_eq!(bank.lane(2).queue().len(), before - 1);
    }
}
