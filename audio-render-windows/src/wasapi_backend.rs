//! WASAPI entry point: COM apartment, default render endpoint and MMCSS.
//!
//! ## Threading
//! Every thread that touches WASAPI joins the multithreaded apartment on
//! first use and leaves it when the thread exits. The render thread joins
//! from `elevate_render_thread`, which runs before any device call there.

use log::{debug, warn};
use windows::core::w;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::System::Threading::{AvRevertMmThreadCharacteristics, AvSetMmThreadCharacteristicsW};

use audio_render_core::models::error::{BackendError, EndpointError};
use audio_render_core::traits::backend::{AudioBackend, RenderDevice, SchedulingElevation};

use crate::wasapi_client::WasapiClient;

/// Map a failed Win32/COM call to a `BackendError` carrying its HRESULT.
pub(crate) fn backend_error(call: &str, e: windows::core::Error) -> BackendError {
    BackendError::new(e.code().0, format!("{} failed: {}", call, e.message()))
}

/// Per-thread MTA membership. Uninitializes on thread exit.
struct ComApartment {
    joined: bool,
}

impl ComApartment {
    fn enter() -> Self {
        // S_FALSE (already a member) still needs a matching CoUninitialize.
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr.is_err() {
            warn!("CoInitializeEx(MTA) failed: {}", hr.message());
        }
        Self { joined: hr.is_ok() }
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.joined {
            unsafe { CoUninitialize() };
        }
    }
}

thread_local! {
    static APARTMENT: ComApartment = ComApartment::enter();
}

fn ensure_com() {
    APARTMENT.with(|_| {});
}

/// WASAPI backend rendering to the default console endpoint.
#[derive(Debug, Default)]
pub struct WasapiBackend;

impl WasapiBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for WasapiBackend {
    type Device = WasapiDevice;
    type Client = WasapiClient;

    fn default_render_device(&self) -> Result<WasapiDevice, EndpointError> {
        ensure_com();
        unsafe {
            let enumerator: IMMDeviceEnumerator = CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                .map_err(|e| EndpointError::Enumerator(backend_error("CoCreateInstance(MMDeviceEnumerator)", e)))?;

            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eConsole)
                .map_err(|e| EndpointError::NoDefault(backend_error("GetDefaultAudioEndpoint", e)))?;

            Ok(WasapiDevice { device })
        }
    }

    /// Join the MTA and register the calling thread with MMCSS as "Pro Audio".
    fn elevate_render_thread(&self) -> Option<SchedulingElevation> {
        ensure_com();
        let mut task_index: u32 = 0;
        let handle = match unsafe { AvSetMmThreadCharacteristicsW(w!("Pro Audio"), &mut task_index) } {
            Ok(handle) => handle,
            Err(e) => {
                warn!("MMCSS registration failed, rendering at normal priority: {}", e);
                return None;
            }
        };
        debug!("Render thread registered with MMCSS (task index {})", task_index);
        Some(SchedulingElevation::new(move || {
            if let Err(e) = unsafe { AvRevertMmThreadCharacteristics(handle) } {
                warn!("AvRevertMmThreadCharacteristics failed: {}", e);
            }
        }))
    }
}

/// The default render endpoint.
pub struct WasapiDevice {
    device: IMMDevice,
}

impl RenderDevice for WasapiDevice {
    type Client = WasapiClient;

    fn activate(&self) -> Result<WasapiClient, BackendError> {
        let client: IAudioClient = unsafe { self.device.Activate(CLSCTX_ALL, None) }
            .map_err(|e| backend_error("IMMDevice::Activate", e))?;
        Ok(WasapiClient::new(client))
    }
}
