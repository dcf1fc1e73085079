//! # audio-render-windows
//!
//! Windows WASAPI backend and C ABI for audio-render-kit.
//!
//! Provides:
//! - `WasapiBackend`: default render endpoint, MTA membership, MMCSS elevation
//! - `WasapiClient` / `WasapiRenderService`: `IAudioClient` and `IAudioRenderClient` wrappers
//! - `ffi`: `rc_open` / `rc_close` / `rc_get_status` / `rc_write` over one process-wide session
//! - `tone`: sine generator used by the `render-tone` demo
//!
//! ## Platform Requirements
//! - Windows 10+ for raw stream properties (`IAudioClient2`)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_render_core::{SessionController, StreamConfig};
//! use audio_render_windows::WasapiBackend;
//!
//! let controller = SessionController::new(Arc::new(WasapiBackend::new()));
//! controller.open(&StreamConfig::default())?;
//! let accepted = controller.write(&pcm);
//! ```

#[cfg(target_os = "windows")]
pub mod ffi;
pub mod tone;
#[cfg(target_os = "windows")]
pub mod wasapi_backend;
#[cfg(target_os = "windows")]
pub mod wasapi_client;

#[cfg(target_os = "windows")]
pub use wasapi_backend::{WasapiBackend, WasapiDevice};
#[cfg(target_os = "windows")]
pub use wasapi_client::{EventSignal, WasapiClient, WasapiRenderService};
