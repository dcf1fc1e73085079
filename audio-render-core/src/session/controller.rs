use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;

use crate::models::config::StreamConfig;
use crate::models::error::OpenError;
use crate::models::session::{EventMode, RenderSession};
use crate::models::status::StatusSnapshot;
use crate::processing::condvar_signal::CondvarSignal;
use crate::processing::ring_buffer::RingBuffer;
use crate::traits::backend::AudioBackend;
use crate::traits::period_signal::PeriodSignal;
use crate::traits::stream_client::StreamClient;

use super::negotiator::negotiate;
use super::render_loop::RenderLoop;
use super::status::SharedStatus;

struct ActiveSession<C: StreamClient> {
    session: RenderSession,
    render_loop: RenderLoop<C>,
}

/// Owns at most one render session and exposes the producer-facing surface.
///
/// ```text
/// [Producer] → write() → [RingBuffer] → [Render thread] → [Device buffer]
///                                            │
///                         status() ← [SharedStatus atomics]
/// ```
///
/// `open`/`close` are serialized by an internal lock. `write` only contends
/// with the render thread on the ring buffer lock, and `status` takes no
/// lock at all.
pub struct SessionController<B: AudioBackend> {
    backend: Arc<B>,
    active: Mutex<Option<ActiveSession<B::Client>>>,
    ring: Arc<Mutex<RingBuffer>>,
    status: Arc<SharedStatus>,
}

impl<B: AudioBackend> SessionController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            active: Mutex::new(None),
            ring: Arc::new(Mutex::new(RingBuffer::empty())),
            status: Arc::new(SharedStatus::default()),
        }
    }

    /// Open a render session on the default endpoint, replacing any open one.
    ///
    /// On error nothing is left allocated and the status reads as closed.
    pub fn open(&self, config: &StreamConfig) -> Result<(), OpenError> {
        let mut active = self.active.lock();
        self.close_locked(&mut active);

        config.validate().map_err(OpenError::InvalidConfig)?;

        let device = self.backend.default_render_device()?;
        let negotiated = negotiate(&device, config)?;
        let mut client = negotiated.client;
        let session = negotiated.session;

        let service = client.render_service().map_err(OpenError::RenderService)?;
        let signal: Arc<dyn PeriodSignal> = match session.event_mode {
            EventMode::EventDriven => client
                .create_period_signal()
                .map_err(OpenError::Notification)?,
            EventMode::Poll => Arc::new(CondvarSignal::new()),
        };

        *self.ring.lock() = RingBuffer::new(session.ring_capacity());
        self.status.publish(&session);
        self.status.set_running(true);

        let render_loop = match RenderLoop::spawn(
            Arc::clone(&self.backend),
            client,
            service,
            signal,
            Arc::clone(&self.ring),
            Arc::clone(&self.status),
            &session,
        ) {
            Ok(render_loop) => render_loop,
            Err(e) => {
                self.status.clear();
                *self.ring.lock() = RingBuffer::empty();
                return Err(e);
            }
        };

        info!(
            "Render session {} open: ring {} bytes, device buffer {} frames",
            session.id,
            session.ring_capacity(),
            session.buffer_frames
        );
        *active = Some(ActiveSession {
            session,
            render_loop,
        });
        Ok(())
    }

    /// Stop rendering and release every session resource. No-op when closed.
    pub fn close(&self) {
        let mut active = self.active.lock();
        self.close_locked(&mut active);
    }

    fn close_locked(&self, active: &mut Option<ActiveSession<B::Client>>) {
        let Some(previous) = active.take() else {
            return;
        };

        if let Some((client, service)) = previous.render_loop.stop() {
            // The render thread stops the stream on its way out; repeat in
            // case it never got that far.
            if let Err(e) = client.stop() {
                warn!("Failed to stop render stream on close: {}", e);
            }
            drop(service);
            drop(client);
        }

        *self.ring.lock() = RingBuffer::empty();
        self.status.clear();
        info!("Render session {} closed", previous.session.id);
    }

    /// Lock-free view of the current session.
    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    /// Enqueue PCM bytes for playback. Returns how many were accepted; the
    /// rest did not fit and the caller should retry them later. Returns 0
    /// when no session is open.
    pub fn write(&self, data: &[u8]) -> usize {
        let mut ring = self.ring.lock();
        if ring.capacity() == 0 {
            return 0;
        }
        let accepted = ring.write(data);
        // Must stay under the ring lock: close empties the ring before it
        // clears the status.
        self.status.record_write(accepted, data.len() - accepted);
        accepted
    }

    /// Bytes `write` would accept right now.
    pub fn free_bytes(&self) -> usize {
        self.ring.lock().free()
    }

    pub fn session(&self) -> Option<RenderSession> {
        self.active.lock().as_ref().map(|a| a.session.clone())
    }

    pub fn is_open(&self) -> bool {
        self.active.lock().is_some()
    }
}

impl<B: AudioBackend> Drop for SessionController<B> {
    fn drop(&mut self) {
        let mut active = self.active.lock();
        self.close_locked(&mut active);
    }
}
