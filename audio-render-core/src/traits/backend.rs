use crate::models::error::{BackendError, EndpointError};

use super::stream_client::StreamClient;

/// Entry point into a platform audio stack.
///
/// Implemented by:
/// - `WasapiBackend` (Windows)
/// - `FakeBackend` (unit tests)
pub trait AudioBackend: Send + Sync + 'static {
    type Device: RenderDevice<Client = Self::Client>;
    type Client: StreamClient;

    /// Resolve the default render endpoint.
    fn default_render_device(&self) -> Result<Self::Device, EndpointError>;

    /// Raise the calling thread's scheduling class for real-time rendering.
    ///
    /// Called on the render thread. `None` means the capability is absent or
    /// the request failed; rendering continues at normal priority.
    fn elevate_render_thread(&self) -> Option<SchedulingElevation> {
        None
    }
}

/// A render endpoint that can hand out fresh stream clients.
pub trait RenderDevice {
    type Client: StreamClient;

    /// Activate a new, uninitialized stream client on this endpoint.
    fn activate(&self) -> Result<Self::Client, BackendError>;
}

/// Scheduling elevation held by the render thread. Reverts on drop.
pub struct SchedulingElevation {
    revert: Option<Box<dyn FnOnce()>>,
}

impl SchedulingElevation {
    pub fn new(revert: impl FnOnce() + 'static) -> Self {
        Self {
            revert: Some(Box::new(revert)),
        }
    }
}

impl Drop for SchedulingElevation {
    fn drop(&mut self) {
        if let Some(revert) = self.revert.take() {
            revert();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn elevation_reverts_once_on_drop() {
        let reverted = Rc::new(Cell::new(0));
        let counter = Rc::clone(&reverted);
        let guard = SchedulingElevation::new(move || counter.set(counter.get() + 1));
        assert_eq!(reverted.get(), 0);
        drop(guard);
        assert_eq!(reverted.get(), 1);
    }
}
