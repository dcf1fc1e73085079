use serde::{Deserialize, Serialize};

use super::session::EventMode;

/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Highest accepted interleaved channel count.
pub const MAX_CHANNELS: u16 = 32;

/// Caller-supplied stream parameters for `SessionController::open`.
///
/// Immutable once passed to `open`. Deserializable so a host can keep it
/// in a JSON settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamConfig {
    /// Sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Bit depth of the PCM stream (default: 16). Valid values: 16, 24, 32.
    pub bits_per_sample: u16,

    /// Interleaved channel count (default: 2).
    pub channels: u16,

    /// Requested device buffer duration in milliseconds (default: 20).
    pub target_buffer_ms: u32,

    /// Ask the backend for a raw stream with minimal signal processing.
    pub prefer_raw: bool,

    /// Try exclusive mode first, falling back to shared once.
    pub prefer_exclusive: bool,

    /// How the render loop learns a period has elapsed (default: event-driven).
    pub event_mode: EventMode,
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.sample_rate > MAX_SAMPLE_RATE {
            return Err(format!(
                "sample rate {} exceeds {} Hz",
                self.sample_rate, MAX_SAMPLE_RATE
            ));
        }
        if ![16, 24, 32].contains(&self.bits_per_sample) {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.channels > MAX_CHANNELS {
            return Err(format!(
                "channel count {} exceeds {}",
                self.channels, MAX_CHANNELS
            ));
        }
        if self.target_buffer_ms == 0 {
            return Err("target buffer duration must be positive".into());
        }
        Ok(())
    }

    /// Bytes per interleaved frame.
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.bits_per_sample as usize / 8
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            bits_per_sample: 16,
            channels: 2,
            target_buffer_ms: 20,
            prefer_raw: false,
            prefer_exclusive: false,
            event_mode: EventMode::EventDriven,
        }
    }
}
