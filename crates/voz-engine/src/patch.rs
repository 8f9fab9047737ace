//! Parameter and modulation structs shared across the engine boundary.
//!
//! [`Patch`] carries the slow, knob-derived state of a voice; the voice bank
//! rewrites it once per render block from knobs, menu settings, and unison
//! offsets. [`Modulations`] carries the per-block CV-derived inputs, already
//! scaled to engine-native ranges, together with `*_patched` flags saying
//! which CV inputs are actually connected (engines fall back to internal
//! behavior for unpatched ones, e.g. a free-running low-pass gate when no
//! trigger cable is present).

/// Slow, knob-derived voice parameters.
#[derive(Debug, Clone, Copy)]
pub struct Patch {
    /// Fractional MIDI note number (60.0 = C4).
    pub note: f32,
    /// Harmonic content macro, [0, 1].
    pub harmonics: f32,
    /// Primary timbre macro, [0, 1].
    pub timbre: f32,
    /// Secondary timbre macro, [0, 1].
    pub morph: f32,
    /// Selected model index; clamped against the engine's model count.
    pub model: usize,
    /// Attenuverter for the frequency-modulation CV, [-1, 1].
    pub frequency_modulation_amount: f32,
    /// Attenuverter for the timbre CV, [-1, 1].
    pub timbre_modulation_amount: f32,
    /// Attenuverter for the morph CV, [-1, 1].
    pub morph_modulation_amount: f32,
    /// Low-pass-gate decay time, [0, 1].
    pub decay: f32,
    /// Low-pass-gate response, 0 = pure VCA, 1 = pure VCF.
    pub lpg_colour: f32,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            note: 60.0,
            harmonics: 0.5,
            timbre: 0.5,
            morph: 0.5,
            model: 0,
            frequency_modulation_amount: 0.0,
            timbre_modulation_amount: 0.0,
            morph_modulation_amount: 0.0,
            decay: 0.5,
            lpg_colour: 0.5,
        }
    }
}

/// Per-block CV-derived inputs, pre-scaled to engine-native ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modulations {
    /// Model-select offset, [-1, 1] sweeps the whole model range.
    pub engine: f32,
    /// Additive note offset in semitones.
    pub note: f32,
    /// Frequency-modulation input in semitones, scaled by the patch amount.
    pub frequency: f32,
    /// Additive harmonics offset.
    pub harmonics: f32,
    /// Additive timbre offset, scaled by the patch amount.
    pub timbre: f32,
    /// Additive morph offset, scaled by the patch amount.
    pub morph: f32,
    /// Trigger level; engines fire on a rising edge through 0.3.
    pub trigger: f32,
    /// External level input, [0, 1].
    pub level: f32,
    /// True when the frequency-modulation input is connected.
    pub frequency_patched: bool,
    /// True when the timbre input is connected.
    pub timbre_patched: bool,
    /// True when the morph input is connected.
    pub morph_patched: bool,
    /// True when the trigger input is connected.
    pub trigger_patched: bool,
    /// True when the level input is connected.
    pub level_patched: bool,
}
