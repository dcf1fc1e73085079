//! Fixed-layout request/response structs for the C ABI.
//!
//! Both are six consecutive `i32` fields; `#[repr(C)]` with uniform field
//! types has no padding, so the layout matches a packed C struct.

use super::config::StreamConfig;
use super::session::EventMode;
use super::status::StatusSnapshot;

/// Open request as laid out on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenRequest {
    pub sample_rate: i32,
    pub bits_per_sample: i32,
    pub channel_count: i32,
    pub target_buffer_ms: i32,
    pub prefer_raw: i32,
    pub prefer_exclusive: i32,
}

impl OpenRequest {
    /// Converts to a `StreamConfig`, rejecting negative or out-of-range fields.
    ///
    /// Wire requests are always event-driven.
    pub fn to_config(&self) -> Result<StreamConfig, String> {
        let positive = |name: &str, v: i32| -> Result<u32, String> {
            if v <= 0 {
                Err(format!("{} must be positive, got {}", name, v))
            } else {
                Ok(v as u32)
            }
        };
        let bits = u16::try_from(positive("bitsPerSample", self.bits_per_sample)?)
            .map_err(|_| format!("unsupported bit depth: {}", self.bits_per_sample))?;
        let channels = u16::try_from(positive("channelCount", self.channel_count)?)
            .map_err(|_| format!("unsupported channel count: {}", self.channel_count))?;

        let config = StreamConfig {
            sample_rate: positive("sampleRate", self.sample_rate)?,
            bits_per_sample: bits,
            channels,
            target_buffer_ms: positive("targetBufferMs", self.target_buffer_ms)?,
            prefer_raw: self.prefer_raw != 0,
            prefer_exclusive: self.prefer_exclusive != 0,
            event_mode: EventMode::EventDriven,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<&StreamConfig> for OpenRequest {
    fn from(c: &StreamConfig) -> Self {
        Self {
            sample_rate: c.sample_rate as i32,
            bits_per_sample: c.bits_per_sample as i32,
            channel_count: c.channels as i32,
            target_buffer_ms: c.target_buffer_ms as i32,
            prefer_raw: c.prefer_raw as i32,
            prefer_exclusive: c.prefer_exclusive as i32,
        }
    }
}

/// Status response as laid out on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusResponse {
    pub requested_ms: i32,
    pub quantized_ms: i32,
    pub effective_ms: i32,
    pub path: i32,
    pub event_mode: i32,
    pub running: i32,
}

impl From<&StatusSnapshot> for StatusResponse {
    fn from(s: &StatusSnapshot) -> Self {
        Self {
            requested_ms: s.requested_ms as i32,
            quantized_ms: s.quantized_ms as i32,
            effective_ms: s.effective_ms as i32,
            path: s.path as i32,
            event_mode: s.event_mode as i32,
            running: s.running as i32,
        }
    }
}
