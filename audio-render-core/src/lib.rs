//! # audio-render-core
//!
//! Platform-agnostic low-latency PCM render core.
//!
//! Provides format negotiation, buffer quantization, the producer ring buffer,
//! the real-time render loop and session orchestration. Platform backends
//! (Windows WASAPI) implement the `AudioBackend` trait family and plug into
//! the generic `SessionController`.
//!
//! ## Architecture
//!
//! ```text
//! audio-render-core (this crate)
//! ├── traits/       ← AudioBackend, RenderDevice, StreamClient, RenderService, PeriodSignal
//! ├── models/       ← OpenError, RenderState, StreamConfig, RenderSession, StatusSnapshot, wire structs
//! ├── processing/   ← RingBuffer, quantizer, WaveFormat, CondvarSignal
//! └── session/      ← negotiator, RenderLoop, SessionController
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::StreamConfig;
pub use models::error::{BackendError, EndpointError, OpenError};
pub use models::session::{EventMode, RenderPath, RenderSession, ShareMode};
pub use models::state::RenderState;
pub use models::status::{RenderDiagnostics, StatusSnapshot};
pub use models::wire::{OpenRequest, StatusResponse};
pub use processing::condvar_signal::CondvarSignal;
pub use processing::quantizer::{quantize, ReferenceTime};
pub use processing::ring_buffer::RingBuffer;
pub use processing::wave_format::WaveFormat;
pub use session::controller::SessionController;
pub use traits::backend::{AudioBackend, RenderDevice, SchedulingElevation};
pub use traits::period_signal::{PeriodSignal, WaitOutcome};
pub use traits::stream_client::{DevicePeriod, RenderService, StreamClient};
