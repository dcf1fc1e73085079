use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

use crate::models::session::{EventMode, RenderPath, RenderSession};
use crate::models::state::RenderState;
use crate::models::status::{RenderDiagnostics, StatusSnapshot};

/// Live session fields shared between the controller, the render thread and
/// status readers. Every field is an atomic, so snapshots never take a lock.
#[derive(Debug, Default)]
pub(crate) struct SharedStatus {
    requested_ms: AtomicU32,
    quantized_ms: AtomicU32,
    effective_ms: AtomicU32,
    path: AtomicU8,
    event_mode: AtomicU8,
    running: AtomicBool,
    state: AtomicU8,

    periods_rendered: AtomicU64,
    underrun_periods: AtomicU64,
    silence_bytes: AtomicU64,
    skipped_periods: AtomicU64,
    bytes_accepted: AtomicU64,
    bytes_rejected: AtomicU64,
}

impl SharedStatus {
    pub fn publish(&self, session: &RenderSession) {
        self.reset_diagnostics();
        self.requested_ms.store(session.requested_ms, Ordering::SeqCst);
        self.quantized_ms.store(session.quantized_ms, Ordering::SeqCst);
        self.effective_ms.store(session.effective_ms, Ordering::SeqCst);
        self.path.store(session.path as u8, Ordering::SeqCst);
        self.event_mode.store(session.event_mode as u8, Ordering::SeqCst);
    }

    /// Back to the all-zero closed state.
    pub fn clear(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.state.store(RenderState::Idle as u8, Ordering::SeqCst);
        self.requested_ms.store(0, Ordering::SeqCst);
        self.quantized_ms.store(0, Ordering::SeqCst);
        self.effective_ms.store(0, Ordering::SeqCst);
        self.path.store(0, Ordering::SeqCst);
        self.event_mode.store(0, Ordering::SeqCst);
        self.reset_diagnostics();
    }

    fn reset_diagnostics(&self) {
        for counter in [
            &self.periods_rendered,
            &self.underrun_periods,
            &self.silence_bytes,
            &self.skipped_periods,
            &self.bytes_accepted,
            &self.bytes_rejected,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn state(&self) -> RenderState {
        RenderState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn set_state(&self, state: RenderState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// A committed period; `silence` is the zero-padded byte count.
    pub fn record_period(&self, silence: usize) {
        self.periods_rendered.fetch_add(1, Ordering::Relaxed);
        if silence > 0 {
            self.underrun_periods.fetch_add(1, Ordering::Relaxed);
            self.silence_bytes.fetch_add(silence as u64, Ordering::Relaxed);
        }
    }

    pub fn record_skip(&self) {
        self.skipped_periods.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self, accepted: usize, rejected: usize) {
        self.bytes_accepted.fetch_add(accepted as u64, Ordering::Relaxed);
        if rejected > 0 {
            self.bytes_rejected.fetch_add(rejected as u64, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            requested_ms: self.requested_ms.load(Ordering::SeqCst),
            quantized_ms: self.quantized_ms.load(Ordering::SeqCst),
            effective_ms: self.effective_ms.load(Ordering::SeqCst),
            path: RenderPath::from_wire(self.path.load(Ordering::SeqCst) as i32).unwrap_or_default(),
            event_mode: EventMode::from_wire(self.event_mode.load(Ordering::SeqCst) as i32)
                .unwrap_or(EventMode::Poll),
            running: self.is_running(),
            state: self.state(),
            diagnostics: RenderDiagnostics {
                periods_rendered: self.periods_rendered.load(Ordering::Relaxed),
                underrun_periods: self.underrun_periods.load(Ordering::Relaxed),
                silence_bytes: self.silence_bytes.load(Ordering::Relaxed),
                skipped_periods: self.skipped_periods.load(Ordering::Relaxed),
                bytes_accepted: self.bytes_accepted.load(Ordering::Relaxed),
                bytes_rejected: self.bytes_rejected.load(Ordering::Relaxed),
            },
        }
    }
}
