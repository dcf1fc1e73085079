use std::sync::Arc;

use crate::models::error::BackendError;
use crate::models::session::{EventMode, ShareMode};
use crate::processing::quantizer::ReferenceTime;
use crate::processing::wave_format::WaveFormat;

use super::period_signal::PeriodSignal;

/// Device scheduling periods in 100-ns units. Zero means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevicePeriod {
    pub default_period: ReferenceTime,
    pub minimum_period: ReferenceTime,
}

/// One stream on a render endpoint.
///
/// Created uninitialized by `RenderDevice::activate`. After `initialize`
/// succeeds the client moves to the render thread, which is the only user
/// until the controller joins it back.
pub trait StreamClient: Send + 'static {
    type Render: RenderService;

    /// Whether the client accepts stream category/option properties.
    fn supports_stream_properties(&self) -> bool {
        false
    }

    /// Request a raw stream (minimal engine-side processing). Must be
    /// called before `initialize`.
    fn set_raw_stream_properties(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("stream properties"))
    }

    fn device_period(&self) -> Result<DevicePeriod, BackendError>;

    /// Initialize the stream with non-persisted session flags.
    ///
    /// `buffer_duration` is in 100-ns units. Event-driven mode enables the
    /// period-ready callback.
    fn initialize(
        &mut self,
        mode: ShareMode,
        event_mode: EventMode,
        format: &WaveFormat,
        buffer_duration: ReferenceTime,
    ) -> Result<(), BackendError>;

    /// Realized buffer capacity in frames.
    fn buffer_size(&self) -> Result<u32, BackendError>;

    fn render_service(&self) -> Result<Self::Render, BackendError>;

    /// Create the period-ready notification and register it with the stream.
    fn create_period_signal(&mut self) -> Result<Arc<dyn PeriodSignal>, BackendError>;

    /// Frames queued in the device buffer awaiting playback.
    fn current_padding(&self) -> Result<u32, BackendError>;

    fn start(&self) -> Result<(), BackendError>;

    fn stop(&self) -> Result<(), BackendError>;
}

/// Write access to the device buffer.
///
/// Every successful `get_buffer` must be followed by `release_buffer` with
/// the same frame count before the next `get_buffer`.
pub trait RenderService: Send + 'static {
    /// Borrow `frames` frames of device buffer for writing.
    fn get_buffer(&mut self, frames: u32) -> Result<&mut [u8], BackendError>;

    /// Commit `frames` frames for playback.
    fn release_buffer(&mut self, frames: u32) -> Result<(), BackendError>;
}
