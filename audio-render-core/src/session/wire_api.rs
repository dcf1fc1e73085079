//! Status-code surface used by the C entry points.
//!
//! Open returns 0 or a negative stage code, write returns the accepted byte
//! count, and null pointers or non-positive lengths are treated as empty.

use log::{error, warn};

use crate::models::error::OpenError;
use crate::models::wire::{OpenRequest, StatusResponse};
use crate::traits::backend::AudioBackend;

use super::controller::SessionController;

/// Open from a wire request. A missing or invalid request closes any open
/// session and returns the invalid-config code.
pub fn open_request<B: AudioBackend>(
    controller: &SessionController<B>,
    request: Option<&OpenRequest>,
) -> i32 {
    let Some(request) = request else {
        controller.close();
        warn!("Open called without a request");
        return OpenError::InvalidConfig("null request".into()).code();
    };

    let config = match request.to_config() {
        Ok(config) => config,
        Err(msg) => {
            controller.close();
            warn!("Rejected open request {:?}: {}", request, msg);
            return OpenError::InvalidConfig(msg).code();
        }
    };

    match controller.open(&config) {
        Ok(()) => 0,
        Err(e) => {
            error!("Open failed: {}", e);
            e.code()
        }
    }
}

pub fn status_response<B: AudioBackend>(controller: &SessionController<B>) -> StatusResponse {
    StatusResponse::from(&controller.status())
}

/// Copy the status to `out`; null is ignored.
///
/// # Safety
/// `out` must be null or valid for writing one `StatusResponse`.
pub unsafe fn write_status<B: AudioBackend>(controller: &SessionController<B>, out: *mut StatusResponse) {
    if out.is_null() {
        return;
    }
    unsafe { out.write(status_response(controller)) };
}

/// View a caller buffer. Null or `length <= 0` yields an empty slice.
///
/// # Safety
/// `data` must be null or point to `length` readable bytes that stay valid
/// and unmodified for `'a`.
pub unsafe fn raw_bytes<'a>(data: *const u8, length: i32) -> &'a [u8] {
    if data.is_null() || length <= 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(data, length as usize) }
}

/// Write from a wire buffer. Empty input and a closed session return 0.
pub fn write_raw<B: AudioBackend>(controller: &SessionController<B>, data: &[u8]) -> i32 {
    if data.is_empty() {
        return 0;
    }
    i32::try_from(controller.write(data)).unwrap_or(i32::MAX)
}
