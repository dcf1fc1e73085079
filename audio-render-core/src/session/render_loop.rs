use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;

use crate::models::error::OpenError;
use crate::models::session::{EventMode, RenderSession};
use crate::models::state::RenderState;
use crate::processing::ring_buffer::RingBuffer;
use crate::traits::backend::AudioBackend;
use crate::traits::period_signal::{PeriodSignal, WaitOutcome};
use crate::traits::stream_client::{RenderService, StreamClient};

use super::status::SharedStatus;

/// Upper bound on a single wait, so stop requests are noticed promptly even
/// if a notification is lost.
pub const WAIT_TIMEOUT: Duration = Duration::from_millis(10);

/// Per-session constants the render thread needs.
#[derive(Debug, Clone, Copy)]
struct RenderParams {
    buffer_frames: u32,
    block_align: usize,
    event_mode: EventMode,
    wait_timeout: Duration,
}

impl RenderParams {
    fn new(session: &RenderSession) -> Self {
        let wait_timeout = match session.event_mode {
            EventMode::EventDriven => WAIT_TIMEOUT,
            // Service the device twice per buffer.
            EventMode::Poll => Duration::from_millis((session.effective_ms as u64 / 2).clamp(1, 10)),
        };
        Self {
            buffer_frames: session.buffer_frames,
            block_align: session.format.block_align as usize,
            event_mode: session.event_mode,
            wait_timeout,
        }
    }
}

/// Handle to the real-time consumer thread.
///
/// The thread owns the stream client and render service while it runs and
/// hands them back on join, so the controller can release them.
pub struct RenderLoop<C: StreamClient> {
    status: Arc<SharedStatus>,
    signal: Arc<dyn PeriodSignal>,
    handle: Option<thread::JoinHandle<(C, C::Render)>>,
}

impl<C: StreamClient> RenderLoop<C> {
    /// Spawn the render thread. It primes the device with silence, starts
    /// the stream and services every period until stopped.
    ///
    /// The caller must have set the shared running flag.
    pub(crate) fn spawn<B>(
        backend: Arc<B>,
        client: C,
        service: C::Render,
        signal: Arc<dyn PeriodSignal>,
        ring: Arc<Mutex<RingBuffer>>,
        status: Arc<SharedStatus>,
        session: &RenderSession,
    ) -> Result<Self, OpenError>
    where
        B: AudioBackend<Client = C>,
    {
        let params = RenderParams::new(session);
        let thread_signal = Arc::clone(&signal);
        let thread_status = Arc::clone(&status);

        let handle = thread::Builder::new()
            .name("audio-render".into())
            .spawn(move || {
                let mut service = service;
                run(
                    &*backend,
                    &client,
                    &mut service,
                    thread_signal.as_ref(),
                    &ring,
                    &thread_status,
                    &params,
                );
                (client, service)
            })
            .map_err(|e| OpenError::RenderThread(e.to_string()))?;

        Ok(Self {
            status,
            signal,
            handle: Some(handle),
        })
    }

    /// Request stop, wake the thread and join it.
    ///
    /// Blocks for at most one wait timeout plus join overhead. Returns the
    /// client and render service, or `None` if the thread panicked.
    pub fn stop(mut self) -> Option<(C, C::Render)> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<(C, C::Render)> {
        let handle = self.handle.take()?;
        self.status.set_running(false);
        self.signal.notify();
        match handle.join() {
            Ok(resources) => Some(resources),
            Err(_) => {
                error!("Render thread panicked");
                None
            }
        }
    }
}

impl<C: StreamClient> Drop for RenderLoop<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Render thread body: priming → running → stopping → idle.
fn run<B, C>(
    backend: &B,
    client: &C,
    service: &mut C::Render,
    signal: &dyn PeriodSignal,
    ring: &Mutex<RingBuffer>,
    status: &SharedStatus,
    params: &RenderParams,
) where
    B: AudioBackend<Client = C>,
    C: StreamClient,
{
    status.set_state(RenderState::Priming);

    let elevation = backend.elevate_render_thread();
    if elevation.is_none() {
        debug!("Render thread running without scheduling elevation");
    }

    prime(client, service, params);

    if let Err(e) = client.start() {
        error!("Failed to start render stream: {}", e);
        status.set_running(false);
        status.set_state(RenderState::Idle);
        return;
    }
    status.set_state(RenderState::Running);
    info!("Render stream started");

    while status.is_running() {
        let outcome = signal.wait(params.wait_timeout);
        if !status.is_running() {
            break;
        }
        // In poll mode the timeout is the tick.
        if outcome == WaitOutcome::TimedOut && params.event_mode == EventMode::EventDriven {
            continue;
        }
        render_period(client, service, ring, status, params);
    }

    status.set_state(RenderState::Stopping);
    if let Err(e) = client.stop() {
        warn!("Failed to stop render stream: {}", e);
    }
    drop(elevation);
    status.set_state(RenderState::Idle);
    info!("Render stream stopped");
}

/// Fill whatever the device buffer can take with silence before starting,
/// so the first period does not underrun.
fn prime<C: StreamClient>(client: &C, service: &mut C::Render, params: &RenderParams) {
    let padding = match client.current_padding() {
        Ok(p) => p,
        Err(e) => {
            warn!("Padding query failed before start, skipping pre-fill: {}", e);
            return;
        }
    };
    let frames = params.buffer_frames.saturating_sub(padding);
    if frames == 0 {
        return;
    }
    match service.get_buffer(frames) {
        Ok(buffer) => {
            buffer.fill(0);
            if let Err(e) = service.release_buffer(frames) {
                warn!("Failed to commit pre-fill silence: {}", e);
            }
        }
        Err(e) => warn!("Failed to acquire pre-fill buffer: {}", e),
    }
}

/// Service one period: drain the ring buffer into the free part of the
/// device buffer and zero-fill any shortfall.
///
/// Failures skip the period; the next signal retries.
fn render_period<C: StreamClient>(
    client: &C,
    service: &mut C::Render,
    ring: &Mutex<RingBuffer>,
    status: &SharedStatus,
    params: &RenderParams,
) {
    let padding = match client.current_padding() {
        Ok(p) => p,
        Err(e) => {
            trace!("Padding query failed, skipping period: {}", e);
            status.record_skip();
            return;
        }
    };

    let frames = params.buffer_frames.saturating_sub(padding);
    if frames == 0 {
        status.record_skip();
        return;
    }

    let buffer = match service.get_buffer(frames) {
        Ok(b) => b,
        Err(e) => {
            trace!("GetBuffer({}) failed, skipping period: {}", frames, e);
            status.record_skip();
            return;
        }
    };

    let need = (frames as usize * params.block_align).min(buffer.len());
    let out = &mut buffer[..need];
    let taken = ring.lock().read_into(out);
    out[taken..].fill(0);

    if let Err(e) = service.release_buffer(frames) {
        trace!("ReleaseBuffer({}) failed: {}", frames, e);
        status.record_skip();
        return;
    }
    status.record_period(need - taken);
}
