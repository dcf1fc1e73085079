//! WASAPI stream client, render service and period event.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use windows::core::{Interface, PCWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Threading::{CreateEventW, SetEvent, WaitForSingleObject};

use audio_render_core::models::error::BackendError;
use audio_render_core::models::session::{EventMode, ShareMode};
use audio_render_core::processing::quantizer::ReferenceTime;
use audio_render_core::processing::wave_format::WaveFormat;
use audio_render_core::traits::period_signal::{PeriodSignal, WaitOutcome};
use audio_render_core::traits::stream_client::{DevicePeriod, RenderService, StreamClient};

use crate::wasapi_backend::backend_error;

/// One `IAudioClient` on the default render endpoint.
pub struct WasapiClient {
    client: IAudioClient,
    block_align: Option<usize>,
}

// SAFETY: the client is created in the MTA, where WASAPI interfaces are
// free-threaded. After open it is used only by the render thread, then by
// the closing thread once that thread has been joined.
unsafe impl Send for WasapiClient {}

impl WasapiClient {
    pub(crate) fn new(client: IAudioClient) -> Self {
        Self {
            client,
            block_align: None,
        }
    }
}

impl StreamClient for WasapiClient {
    type Render = WasapiRenderService;

    fn supports_stream_properties(&self) -> bool {
        self.client.cast::<IAudioClient2>().is_ok()
    }

    fn set_raw_stream_properties(&mut self) -> Result<(), BackendError> {
        let client2: IAudioClient2 = self
            .client
            .cast()
            .map_err(|e| backend_error("QueryInterface(IAudioClient2)", e))?;
        let properties = AudioClientProperties {
            cbSize: std::mem::size_of::<AudioClientProperties>() as u32,
            bIsOffload: false.into(),
            eCategory: AudioCategory_Media,
            Options: AUDCLNT_STREAMOPTIONS_RAW,
        };
        unsafe { client2.SetClientProperties(&properties) }
            .map_err(|e| backend_error("IAudioClient2::SetClientProperties", e))
    }

    fn device_period(&self) -> Result<DevicePeriod, BackendError> {
        let mut default_period: i64 = 0;
        let mut minimum_period: i64 = 0;
        unsafe {
            self.client
                .GetDevicePeriod(Some(&mut default_period as *mut _), Some(&mut minimum_period as *mut _))
        }
        .map_err(|e| backend_error("IAudioClient::GetDevicePeriod", e))?;
        Ok(DevicePeriod {
            default_period,
            minimum_period,
        })
    }

    fn initialize(
        &mut self,
        mode: ShareMode,
        event_mode: EventMode,
        format: &WaveFormat,
        buffer_duration: ReferenceTime,
    ) -> Result<(), BackendError> {
        let (share_mode, periodicity) = match mode {
            ShareMode::Shared => (AUDCLNT_SHAREMODE_SHARED, 0),
            // Exclusive event-driven streams require periodicity == duration.
            ShareMode::Exclusive => (AUDCLNT_SHAREMODE_EXCLUSIVE, buffer_duration),
        };
        let mut flags = AUDCLNT_STREAMFLAGS_NOPERSIST;
        if event_mode == EventMode::EventDriven {
            flags |= AUDCLNT_STREAMFLAGS_EVENTCALLBACK;
        }

        // WAVEFORMATEX is packed, so the serialized bytes can be passed as is.
        let descriptor = format.to_bytes();
        unsafe {
            self.client.Initialize(
                share_mode,
                flags,
                buffer_duration,
                periodicity,
                descriptor.as_ptr().cast::<WAVEFORMATEX>(),
                None,
            )
        }
        .map_err(|e| backend_error("IAudioClient::Initialize", e))?;

        self.block_align = Some(format.block_align as usize);
        Ok(())
    }

    fn buffer_size(&self) -> Result<u32, BackendError> {
        unsafe { self.client.GetBufferSize() }.map_err(|e| backend_error("IAudioClient::GetBufferSize", e))
    }

    fn render_service(&self) -> Result<WasapiRenderService, BackendError> {
        let block_align = self
            .block_align
            .ok_or_else(|| BackendError::new(-1, "render service requested before Initialize"))?;
        let render: IAudioRenderClient = unsafe { self.client.GetService() }
            .map_err(|e| backend_error("IAudioClient::GetService(IAudioRenderClient)", e))?;
        Ok(WasapiRenderService { render, block_align })
    }

    fn create_period_signal(&mut self) -> Result<Arc<dyn PeriodSignal>, BackendError> {
        let event = EventSignal::new()?;
        unsafe { self.client.SetEventHandle(event.handle) }
            .map_err(|e| backend_error("IAudioClient::SetEventHandle", e))?;
        Ok(Arc::new(event))
    }

    fn current_padding(&self) -> Result<u32, BackendError> {
        unsafe { self.client.GetCurrentPadding() }.map_err(|e| backend_error("IAudioClient::GetCurrentPadding", e))
    }

    fn start(&self) -> Result<(), BackendError> {
        unsafe { self.client.Start() }.map_err(|e| backend_error("IAudioClient::Start", e))
    }

    fn stop(&self) -> Result<(), BackendError> {
        unsafe { self.client.Stop() }.map_err(|e| backend_error("IAudioClient::Stop", e))
    }
}

/// `IAudioRenderClient` wrapper handing out device buffers as byte slices.
pub struct WasapiRenderService {
    render: IAudioRenderClient,
    block_align: usize,
}

// SAFETY: same apartment rules as `WasapiClient`; only the render thread
// calls into it while the session runs.
unsafe impl Send for WasapiRenderService {}

impl RenderService for WasapiRenderService {
    fn get_buffer(&mut self, frames: u32) -> Result<&mut [u8], BackendError> {
        let data = unsafe { self.render.GetBuffer(frames) }
            .map_err(|e| backend_error("IAudioRenderClient::GetBuffer", e))?;
        if data.is_null() {
            return Err(BackendError::new(-1, "IAudioRenderClient::GetBuffer returned null"));
        }
        // SAFETY: WASAPI guarantees `frames * block_align` writable bytes until
        // ReleaseBuffer, and the &mut self borrow keeps the slice from
        // outliving that call.
        Ok(unsafe { std::slice::from_raw_parts_mut(data, frames as usize * self.block_align) })
    }

    fn release_buffer(&mut self, frames: u32) -> Result<(), BackendError> {
        unsafe { self.render.ReleaseBuffer(frames, 0) }
            .map_err(|e| backend_error("IAudioRenderClient::ReleaseBuffer", e))
    }
}

/// Auto-reset Win32 event the engine signals once per device period.
pub struct EventSignal {
    handle: HANDLE,
}

// SAFETY: kernel event handles may be waited on and set from any thread.
unsafe impl Send for EventSignal {}
unsafe impl Sync for EventSignal {}

impl EventSignal {
    fn new() -> Result<Self, BackendError> {
        let handle = unsafe { CreateEventW(None, false, false, PCWSTR::null()) }
            .map_err(|e| backend_error("CreateEventW", e))?;
        Ok(Self { handle })
    }
}

impl PeriodSignal for EventSignal {
    fn wait(&self, timeout: Duration) -> WaitOutcome {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        if unsafe { WaitForSingleObject(self.handle, millis) } == WAIT_OBJECT_0 {
            WaitOutcome::Signaled
        } else {
            WaitOutcome::TimedOut
        }
    }

    fn notify(&self) {
        if let Err(e) = unsafe { SetEvent(self.handle) } {
            warn!("SetEvent failed: {}", e);
        }
    }
}

impl Drop for EventSignal {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}
