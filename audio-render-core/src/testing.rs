//! In-process fake audio stack for unit tests.
//!
//! The fake device drains `period_frames` of padding every `tick` and fires
//! the period signal, so render-loop tests run against a simulated clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::{BackendError, EndpointError};
use crate::models::session::{EventMode, ShareMode};
use crate::processing::condvar_signal::CondvarSignal;
use crate::processing::quantizer::{ms_to_hns, ReferenceTime};
use crate::processing::wave_format::WaveFormat;
use crate::traits::backend::{AudioBackend, RenderDevice, SchedulingElevation};
use crate::traits::period_signal::PeriodSignal;
use crate::traits::stream_client::{DevicePeriod, RenderService, StreamClient};

/// Byte pattern written into freshly acquired device buffers.
pub const GARBAGE: u8 = 0xCD;

#[derive(Debug, Clone)]
pub struct FakeConfig {
    pub fail_enumerator: bool,
    pub fail_default_endpoint: bool,
    pub fail_activate: bool,
    pub supports_properties: bool,
    pub fail_raw_properties: bool,
    /// `None` makes the period query fail.
    pub device_period: Option<DevicePeriod>,
    pub fail_exclusive: bool,
    pub fail_shared: bool,
    pub fail_buffer_size: bool,
    pub fail_render_service: bool,
    pub fail_period_signal: bool,
    pub fail_start: bool,
    /// Fail every nth padding query. 0 never fails.
    pub fail_every_nth_padding: u32,
    /// Fail every nth buffer acquisition. 0 never fails.
    pub fail_every_nth_acquire: u32,
    pub elevate: bool,
    pub buffer_frames: u32,
    pub period_frames: u32,
    pub tick: Duration,
}

impl Default for FakeConfig {
    fn default() -> Self {
        Self {
            fail_enumerator: false,
            fail_default_endpoint: false,
            fail_activate: false,
            supports_properties: true,
            fail_raw_properties: false,
            device_period: Some(DevicePeriod {
                default_period: ms_to_hns(10),
                minimum_period: ms_to_hns(3),
            }),
            fail_exclusive: false,
            fail_shared: false,
            fail_buffer_size: false,
            fail_render_service: false,
            fail_period_signal: false,
            fail_start: false,
            fail_every_nth_padding: 0,
            fail_every_nth_acquire: 0,
            elevate: true,
            buffer_frames: 960,
            period_frames: 480,
            tick: Duration::from_millis(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeCall {
    pub mode: ShareMode,
    pub event_mode: EventMode,
    pub duration: ReferenceTime,
}

/// Everything the fake observed.
#[derive(Debug, Clone, Default)]
pub struct FakeLog {
    pub activations: u32,
    pub live_clients: i32,
    pub raw_properties_set: u32,
    pub initialize_calls: Vec<InitializeCall>,
    pub signals_created: u32,
    pub starts: u32,
    pub stops: u32,
    pub elevations: u32,
    pub reverts: u32,
    /// Bytes of every committed device buffer, in order.
    pub commits: Vec<Vec<u8>>,
}

#[derive(Debug, Default)]
struct DeviceState {
    padding: u32,
    padding_queries: u32,
    acquisitions: u32,
}

#[derive(Debug)]
struct Shared {
    config: FakeConfig,
    log: Mutex<FakeLog>,
    device: Mutex<DeviceState>,
}

fn fail(what: &str) -> BackendError {
    BackendError::new(-100, format!("fake {} failure", what))
}

fn nth(counter: &mut u32, every: u32) -> bool {
    *counter += 1;
    every > 0 && *counter % every == 0
}

pub struct FakeBackend {
    shared: Arc<Shared>,
}

impl FakeBackend {
    pub fn new(config: FakeConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                log: Mutex::new(FakeLog::default()),
                device: Mutex::new(DeviceState::default()),
            }),
        }
    }

    pub fn log(&self) -> FakeLog {
        self.shared.log.lock().clone()
    }
}

impl AudioBackend for FakeBackend {
    type Device = FakeDevice;
    type Client = FakeClient;

    fn default_render_device(&self) -> Result<FakeDevice, EndpointError> {
        if self.shared.config.fail_enumerator {
            return Err(EndpointError::Enumerator(fail("enumerator")));
        }
        if self.shared.config.fail_default_endpoint {
            return Err(EndpointError::NoDefault(fail("endpoint")));
        }
        Ok(FakeDevice {
            shared: Arc::clone(&self.shared),
        })
    }

    fn elevate_render_thread(&self) -> Option<SchedulingElevation> {
        if !self.shared.config.elevate {
            return None;
        }
        self.shared.log.lock().elevations += 1;
        let shared = Arc::clone(&self.shared);
        Some(SchedulingElevation::new(move || {
            shared.log.lock().reverts += 1;
        }))
    }
}

pub struct FakeDevice {
    shared: Arc<Shared>,
}

impl RenderDevice for FakeDevice {
    type Client = FakeClient;

    fn activate(&self) -> Result<FakeClient, BackendError> {
        if self.shared.config.fail_activate {
            return Err(fail("activation"));
        }
        let mut log = self.shared.log.lock();
        log.activations += 1;
        log.live_clients += 1;
        Ok(FakeClient {
            shared: Arc::clone(&self.shared),
            format: None,
            signal: None,
            clock: Mutex::new(None),
        })
    }
}

/// Simulated device clock thread.
struct Clock {
    stop: Arc<AtomicBool>,
    wake: Arc<CondvarSignal>,
    handle: thread::JoinHandle<()>,
}

impl Clock {
    fn start(shared: Arc<Shared>, signal: Option<Arc<CondvarSignal>>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(CondvarSignal::new());
        let handle = {
            let stop = Arc::clone(&stop);
            let wake = Arc::clone(&wake);
            thread::spawn(move || loop {
                wake.wait(shared.config.tick);
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                {
                    let mut device = shared.device.lock();
                    device.padding = device.padding.saturating_sub(shared.config.period_frames);
                }
                if let Some(signal) = &signal {
                    signal.notify();
                }
            })
        };
        Self { stop, wake, handle }
    }

    fn halt(self) {
        self.stop.store(true, Ordering::SeqCst);
        self.wake.notify();
        let _ = self.handle.join();
    }
}

pub struct FakeClient {
    shared: Arc<Shared>,
    format: Option<WaveFormat>,
    signal: Option<Arc<CondvarSignal>>,
    clock: Mutex<Option<Clock>>,
}

impl StreamClient for FakeClient {
    type Render = FakeRenderService;

    fn supports_stream_properties(&self) -> bool {
        self.shared.config.supports_properties
    }

    fn set_raw_stream_properties(&mut self) -> Result<(), BackendError> {
        if self.shared.config.fail_raw_properties {
            return Err(fail("stream properties"));
        }
        self.shared.log.lock().raw_properties_set += 1;
        Ok(())
    }

    fn device_period(&self) -> Result<DevicePeriod, BackendError> {
        self.shared.config.device_period.ok_or_else(|| fail("device period"))
    }

    fn initialize(
        &mut self,
        mode: ShareMode,
        event_mode: EventMode,
        format: &WaveFormat,
        buffer_duration: ReferenceTime,
    ) -> Result<(), BackendError> {
        self.shared.log.lock().initialize_calls.push(InitializeCall {
            mode,
            event_mode,
            duration: buffer_duration,
        });
        let rejected = match mode {
            ShareMode::Exclusive => self.shared.config.fail_exclusive,
            ShareMode::Shared => self.shared.config.fail_shared,
        };
        if rejected {
            return Err(fail("initialize"));
        }
        self.format = Some(*format);
        self.shared.device.lock().padding = 0;
        Ok(())
    }

    fn buffer_size(&self) -> Result<u32, BackendError> {
        if self.shared.config.fail_buffer_size {
            return Err(fail("buffer size"));
        }
        Ok(self.shared.config.buffer_frames)
    }

    fn render_service(&self) -> Result<FakeRenderService, BackendError> {
        if self.shared.config.fail_render_service {
            return Err(fail("render service"));
        }
        let format = self.format.ok_or_else(|| fail("uninitialized render service"))?;
        Ok(FakeRenderService {
            shared: Arc::clone(&self.shared),
            block_align: format.block_align as usize,
            scratch: Vec::new(),
            pending: None,
        })
    }

    fn create_period_signal(&mut self) -> Result<Arc<dyn PeriodSignal>, BackendError> {
        if self.shared.config.fail_period_signal {
            return Err(fail("event"));
        }
        self.shared.log.lock().signals_created += 1;
        let signal = Arc::new(CondvarSignal::new());
        self.signal = Some(Arc::clone(&signal));
        Ok(signal)
    }

    fn current_padding(&self) -> Result<u32, BackendError> {
        let mut device = self.shared.device.lock();
        if nth(&mut device.padding_queries, self.shared.config.fail_every_nth_padding) {
            return Err(fail("padding"));
        }
        Ok(device.padding)
    }

    fn start(&self) -> Result<(), BackendError> {
        if self.shared.config.fail_start {
            return Err(fail("start"));
        }
        self.shared.log.lock().starts += 1;
        let mut clock = self.clock.lock();
        if clock.is_none() {
            *clock = Some(Clock::start(Arc::clone(&self.shared), self.signal.clone()));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), BackendError> {
        self.shared.log.lock().stops += 1;
        if let Some(clock) = self.clock.lock().take() {
            clock.halt();
        }
        Ok(())
    }
}

impl Drop for FakeClient {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.get_mut().take() {
            clock.halt();
        }
        self.shared.log.lock().live_clients -= 1;
    }
}

pub struct FakeRenderService {
    shared: Arc<Shared>,
    block_align: usize,
    scratch: Vec<u8>,
    pending: Option<u32>,
}

impl RenderService for FakeRenderService {
    fn get_buffer(&mut self, frames: u32) -> Result<&mut [u8], BackendError> {
        if self.pending.is_some() {
            return Err(fail("nested acquire"));
        }
        {
            let mut device = self.shared.device.lock();
            if nth(&mut device.acquisitions, self.shared.config.fail_every_nth_acquire) {
                return Err(fail("acquire"));
            }
            if frames > self.shared.config.buffer_frames.saturating_sub(device.padding) {
                return Err(fail("oversized acquire"));
            }
        }
        self.pending = Some(frames);
        self.scratch.clear();
        self.scratch.resize(frames as usize * self.block_align, GARBAGE);
        Ok(&mut self.scratch)
    }

    fn release_buffer(&mut self, frames: u32) -> Result<(), BackendError> {
        if self.pending.take() != Some(frames) {
            return Err(fail("unmatched release"));
        }
        self.shared.log.lock().commits.push(self.scratch.clone());
        self.shared.device.lock().padding += frames;
        Ok(())
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
