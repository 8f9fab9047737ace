//! Persisted module settings.
//!
//! Each module front-end owns a small settings struct saved as a JSON blob
//! by the host. Loading is deliberately tolerant: a blob that is not valid
//! JSON is rejected with [`SettingsError`], but within valid JSON every
//! field is extracted individually — a missing or wrong-typed field leaves
//! the current value untouched, so blobs from older versions load cleanly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Settings blob failures, surfaced at the host boundary only.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The blob was not valid JSON at all.
    #[error("invalid settings blob: {0}")]
    InvalidBlob(#[from] serde_json::Error),
}

/// Persisted state of the macro-oscillator module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSettings {
    /// Last selected shape (saved for display restoration).
    pub shape: usize,
    /// FM input selects the shape instead of modulating pitch.
    pub meta_modulation: bool,
    /// Analog-style pitch drift depth, 0..4.
    pub vco_drift: u8,
    /// Output waveshaping depth, 0..4.
    pub signature: u8,
    /// Skip rate conversion and play native-rate blocks directly.
    pub low_cpu: bool,
}

impl Default for MacroSettings {
    fn default() -> Self {
        Self {
            shape: 0,
            meta_modulation: false,
            vco_drift: 0,
            signature: 0,
            low_cpu: false,
        }
    }
}

impl MacroSettings {
    /// Serialize to the persisted JSON blob.
    pub fn save(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Merge a persisted blob into the current settings, field by field.
    pub fn load(&mut self, blob: &str) -> Result<(), SettingsError> {
        let value: Value = serde_json::from_str(blob)?;
        if let Some(shape) = value.get("shape").and_then(Value::as_u64) {
            self.shape = shape as usize;
        }
        if let Some(meta) = value.get("meta_modulation").and_then(Value::as_bool) {
            self.meta_modulation = meta;
        }
        if let Some(drift) = value.get("vco_drift").and_then(Value::as_u64) {
            self.vco_drift = drift.min(4) as u8;
        }
        if let Some(signature) = value.get("signature").and_then(Value::as_u64) {
            self.signature = signature.min(4) as u8;
        }
        if let Some(low_cpu) = value.get("low_cpu").and_then(Value::as_bool) {
            self.low_cpu = low_cpu;
        }
        Ok(())
    }
}

/// Persisted state of the multi-model voice module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Selected synthesis model.
    pub model: usize,
    /// Skip rate conversion and play native-rate blocks directly.
    pub low_cpu: bool,
    /// Low-pass-gate response, [0, 1].
    pub lpg_colour: f32,
    /// Low-pass-gate decay, [0, 1].
    pub decay: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            model: 0,
            low_cpu: false,
            lpg_colour: 0.5,
            decay: 0.5,
        }
    }
}

impl VoiceSettings {
    /// Serialize to the persisted JSON blob.
    pub fn save(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Merge a persisted blob into the current settings, field by field.
    pub fn load(&mut self, blob: &str) -> Result<(), SettingsError> {
        let value: Value = serde_json::from_str(blob)?;
        if let Some(model) = value.get("model").and_then(Value::as_u64) {
            self.model = model as usize;
        }
        if let Some(low_cpu) = value.get("low_cpu").and_then(Value::as_bool) {
            self.low_cpu = low_cpu;
        }
        if let Some(colour) = value.get("lpg_colour").and_then(Value::as_f64) {
            self.lpg_colour = (colour as f32).clamp(0.0, 1.0);
        }
        if let Some(decay) = value.get("decay").and_then(Value::as_f64) {
            self.decay = (decay as f32).clamp(0.0, 1.0);
        }
        Ok(())
    }
}
