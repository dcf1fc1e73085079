use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::processing::wave_format::WaveFormat;

/// Device sharing mode requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareMode {
    Shared,
    Exclusive,
}

/// Resolved output path. Discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderPath {
    #[default]
    Shared = 0,
    Exclusive = 1,
    ExclusiveRaw = 2,
}

impl RenderPath {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Shared),
            1 => Some(Self::Exclusive),
            2 => Some(Self::ExclusiveRaw),
            _ => None,
        }
    }
}

/// How the render loop is woken each period. Discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventMode {
    /// Timer-driven: the loop services the device every half buffer.
    Poll = 0,
    /// The backend signals a period-ready event.
    #[default]
    EventDriven = 1,
}

impl EventMode {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Poll),
            1 => Some(Self::EventDriven),
            _ => None,
        }
    }
}

/// Resolved state of a successful open.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSession {
    pub id: Uuid,
    pub format: WaveFormat,
    /// Device-reported buffer capacity in frames.
    pub buffer_frames: u32,
    pub path: RenderPath,
    pub event_mode: EventMode,
    pub requested_ms: u32,
    pub quantized_ms: u32,
    /// `buffer_frames * 1000 / sample_rate`, what the device actually granted.
    pub effective_ms: u32,
}

impl RenderSession {
    /// Size of the realized device buffer in bytes.
    pub fn buffer_bytes(&self) -> usize {
        self.format.frames_to_bytes(self.buffer_frames)
    }

    /// Ring buffer capacity: twice the realized device buffer.
    pub fn ring_capacity(&self) -> usize {
        self.buffer_bytes() * 2
    }
}

/// Milliseconds of audio held by `frames` at `sample_rate`, truncated.
pub fn frames_to_ms(frames: u32, sample_rate: u32) -> u32 {
    (frames as u64 * 1000 / sample_rate.max(1) as u64) as u32
}
