//! Polyphonic voltage ports.
//!
//! The host contract is plain data: a [`PolyInput`] snapshot per input port
//! each tick, a [`PolyOutput`] the bank writes at most once per channel per
//! tick. Channel semantics follow the usual polyphonic-cable convention: a
//! port carrying fewer than two channels broadcasts channel 0 to every
//! voice; a port carrying two or more addresses voices directly, with
//! missing channels reading 0 V.

/// Maximum number of voices (and port channels).
pub const MAX_VOICES: usize = 16;

/// Snapshot of one polyphonic input port.
#[derive(Debug, Clone, Copy)]
pub struct PolyInput {
    voltages: [f32; MAX_VOICES],
    channels: usize,
}

impl PolyInput {
    /// An unconnected port: zero channels, reads 0 V everywhere.
    pub const fn disconnected() -> Self {
        Self {
            voltages: [0.0; MAX_VOICES],
            channels: 0,
        }
    }

    /// A connected port carrying the given channel voltages (at most 16).
    pub fn new(voltages: &[f32]) -> Self {
        let mut port = Self::disconnected();
        port.channels = voltages.len().min(MAX_VOICES);
        port.voltages[..port.channels].copy_from_slice(&voltages[..port.channels]);
        port
    }

    /// A connected monophonic port.
    pub fn mono(voltage: f32) -> Self {
        Self::new(&[voltage])
    }

    /// True when a cable is present.
    pub fn is_connected(&self) -> bool {
        self.channels > 0
    }

    /// Number of channels carried (0 when disconnected).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Voltage for `voice` under the broadcast rule: fewer than two
    /// channels broadcast channel 0; otherwise the voice's own channel, or
    /// 0 V past the carried count.
    pub fn voltage(&self, voice: usize) -> f32 {
        if self.channels < 2 {
            self.voltages[0]
        } else if voice < self.channels {
            self.voltages[voice]
        } else {
            0.0
        }
    }

    /// Channel 0 regardless of voice (the FM input convention).
    pub fn channel0(&self) -> f32 {
        self.voltages[0]
    }
}

impl Default for PolyInput {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// One polyphonic output port.
#[derive(Debug, Clone, Copy)]
pub struct PolyOutput {
    voltages: [f32; MAX_VOICES],
    channels: usize,
}

impl PolyOutput {
    /// A silent output carrying one channel.
    pub const fn new() -> Self {
        Self {
            voltages: [0.0; MAX_VOICES],
            channels: 1,
        }
    }

    /// Set the carried channel count, clamped to [1, 16].
    pub fn set_channels(&mut self, channels: usize) {
        self.channels = channels.clamp(1, MAX_VOICES);
    }

    /// Number of carried channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Write one voice's voltage. Out-of-range voices are ignored.
    pub fn set_voltage(&mut self, voice: usize, voltage: f32) {
        if voice < MAX_VOICES {
            self.voltages[voice] = voltage;
        }
    }

    /// Read one channel's voltage.
    pub fn voltage(&self, channel: usize) -> f32 {
        if channel < MAX_VOICES {
            self.voltages[channel]
        } else {
            0.0
        }
    }
}

impl Default for PolyOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_reads_zero() {
        let port = PolyInput::disconnected();
        assert!(!port.is_connected());
        assert_eq!(port.voltage(0), 0.0);
        assert_eq!(port.voltage(7), 0.0);
    }

    #[test]
    fn mono_broadcasts_to_every_voice() {
        let port = PolyInput::mono(2.5);
        assert_eq!(port.channels(), 1);
        for voice in 0..MAX_VOICES {
            assert_eq!(port.voltage(voice), 2.5);
        }
    }

    #[test]
    fn poly_addresses_voices_directly() {
        let port = PolyInput::new(&[1.0, 2.0, 3.0]);
        assert_eq!(port.voltage(0), 1.0);
        assert_eq!(port.voltage(2), 3.0);
        // Channels beyond the carried count read 0 V.
        assert_eq!(port.voltage(5), 0.0);
    }

    #[test]
    fn input_clamps_to_sixteen_channels() {
        let port = PolyInput::new(&[1.0; 32]);
        assert_eq!(port.channels(), MAX_VOICES);
    }

    #[test]
    fn output_channel_count_clamps() {
        let mut out = PolyOutput::new();
        out.set_channels(0);
        assert_eq!(out.channels(), 1);
        out.set_channels(99);
        assert_eq!(out.channels(), MAX_VOICES);
    }
}
