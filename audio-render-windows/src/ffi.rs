//! C ABI over one process-wide render session.
//!
//! ```c
//! int32_t rc_open(const OpenRequest *request);   // 0 or negative stage code
//! void    rc_close(void);
//! void    rc_get_status(StatusResponse *out);
//! int32_t rc_write(const uint8_t *data, int32_t length);  // bytes accepted
//! ```
//!
//! All entry points may be called from any thread. Return-code rules live in
//! `audio_render_core::session::wire_api`.

use std::sync::{Arc, OnceLock};

use audio_render_core::models::wire::{OpenRequest, StatusResponse};
use audio_render_core::session::controller::SessionController;
use audio_render_core::session::wire_api;

use crate::wasapi_backend::WasapiBackend;

static CONTROLLER: OnceLock<SessionController<WasapiBackend>> = OnceLock::new();

fn controller() -> &'static SessionController<WasapiBackend> {
    CONTROLLER.get_or_init(|| SessionController::new(Arc::new(WasapiBackend::new())))
}

/// Open the default render endpoint, replacing any open session.
///
/// # Safety
/// `request` must be null or point to a valid `OpenRequest`.
#[no_mangle]
pub unsafe extern "C" fn rc_open(request: *const OpenRequest) -> i32 {
    wire_api::open_request(controller(), unsafe { request.as_ref() })
}

/// Close the session. Safe to call when nothing is open.
#[no_mangle]
pub extern "C" fn rc_close() {
    controller().close();
}

/// Copy the current status into `out`. Null is ignored.
///
/// # Safety
/// `out` must be null or point to writable memory for a `StatusResponse`.
#[no_mangle]
pub unsafe extern "C" fn rc_get_status(out: *mut StatusResponse) {
    unsafe { wire_api::write_status(controller(), out) }
}

/// Queue PCM bytes. Returns how many were accepted.
///
/// # Safety
/// `data` must be null or point to `length` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn rc_write(data: *const u8, length: i32) -> i32 {
    wire_api::write_raw(controller(), unsafe { wire_api::raw_bytes(data, length) })
}
