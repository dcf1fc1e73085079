use serde::{Deserialize, Serialize};

use super::session::{EventMode, RenderPath};
use super::state::RenderState;

/// Render loop counters, useful when chasing glitches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDiagnostics {
    /// Periods whose device buffer was acquired and committed.
    pub periods_rendered: u64,
    /// Committed periods that needed silence padding.
    pub underrun_periods: u64,
    /// Total zero bytes padded into committed periods.
    pub silence_bytes: u64,
    /// Periods skipped because padding/acquire failed or the device was full.
    pub skipped_periods: u64,
    /// Bytes accepted by `write`.
    pub bytes_accepted: u64,
    /// Bytes refused by `write` because the ring buffer was full.
    pub bytes_rejected: u64,
}

/// Read-only copy of the live session fields.
///
/// All-zero with `running == false` when no session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub requested_ms: u32,
    pub quantized_ms: u32,
    pub effective_ms: u32,
    pub path: RenderPath,
    pub event_mode: EventMode,
    pub running: bool,
    pub state: RenderState,
    pub diagnostics: RenderDiagnostics,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            requested_ms: 0,
            quantized_ms: 0,
            effective_ms: 0,
            path: RenderPath::Shared,
            event_mode: EventMode::Poll,
            running: false,
            state: RenderState::Idle,
            diagnostics: RenderDiagnostics::default(),
        }
    }
}

impl StatusSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
