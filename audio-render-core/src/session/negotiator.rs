use log::{debug, info, warn};
use uuid::Uuid;

use crate::models::config::StreamConfig;
use crate::models::error::{BackendError, OpenError};
use crate::models::session::{frames_to_ms, RenderPath, RenderSession, ShareMode};
use crate::processing::quantizer::{self, hns_to_ms};
use crate::processing::wave_format::WaveFormat;
use crate::traits::backend::RenderDevice;
use crate::traits::stream_client::StreamClient;

/// An initialized stream client plus the session it resolved to.
pub struct Negotiated<C> {
    pub client: C,
    pub session: RenderSession,
}

/// Initialize a stream on `device`, preferring the caller's mode and falling
/// back from exclusive to shared exactly once.
///
/// Sequence:
/// 1. Build the PCM descriptor
/// 2. Activate a client, request raw properties if wanted and supported
/// 3. Query the device period and quantize the requested duration
/// 4. Initialize in the preferred mode
/// 5. On exclusive failure, re-activate and initialize shared
/// 6. Query the realized buffer size
///
/// Clients from failed attempts are dropped before returning.
pub fn negotiate<D: RenderDevice>(
    device: &D,
    config: &StreamConfig,
) -> Result<Negotiated<D::Client>, OpenError> {
    let format = WaveFormat::pcm(config.sample_rate, config.bits_per_sample, config.channels);
    let preferred = if config.prefer_exclusive {
        ShareMode::Exclusive
    } else {
        ShareMode::Shared
    };

    let client = device.activate().map_err(OpenError::Activation)?;
    let (client, mode, quantized_ms) = match initialize(client, preferred, config, &format) {
        Ok((client, quantized_ms)) => (client, preferred, quantized_ms),
        Err(e) if preferred == ShareMode::Exclusive => {
            warn!("Exclusive initialization failed ({}), falling back to shared mode", e);
            let client = device.activate().map_err(OpenError::Activation)?;
            let (client, quantized_ms) = initialize(client, ShareMode::Shared, config, &format)
                .map_err(OpenError::Initialize)?;
            (client, ShareMode::Shared, quantized_ms)
        }
        Err(e) => return Err(OpenError::Initialize(e)),
    };

    let path = match mode {
        ShareMode::Shared => RenderPath::Shared,
        ShareMode::Exclusive if config.prefer_raw => RenderPath::ExclusiveRaw,
        ShareMode::Exclusive => RenderPath::Exclusive,
    };

    let buffer_frames = client.buffer_size().map_err(OpenError::BufferSize)?;
    let session = RenderSession {
        id: Uuid::new_v4(),
        format,
        buffer_frames,
        path,
        event_mode: config.event_mode,
        requested_ms: config.target_buffer_ms,
        quantized_ms,
        effective_ms: frames_to_ms(buffer_frames, format.sample_rate),
    };

    info!(
        "Negotiated render stream {}: {:?}, {} Hz / {}-bit / {} ch, {} frames ({} ms, requested {} ms, quantized {} ms)",
        session.id,
        session.path,
        format.sample_rate,
        format.bits_per_sample,
        format.channels,
        buffer_frames,
        session.effective_ms,
        session.requested_ms,
        session.quantized_ms,
    );

    Ok(Negotiated { client, session })
}

/// One initialization attempt. Returns the client and the quantized duration
/// it was initialized with. The client is consumed on failure.
fn initialize<C: StreamClient>(
    mut client: C,
    mode: ShareMode,
    config: &StreamConfig,
    format: &WaveFormat,
) -> Result<(C, u32), BackendError> {
    if config.prefer_raw && client.supports_stream_properties() {
        if let Err(e) = client.set_raw_stream_properties() {
            warn!("Raw stream properties rejected, continuing without: {}", e);
        }
    }

    let period = client.device_period().unwrap_or_else(|e| {
        warn!("Device period unavailable, skipping quantization floor: {}", e);
        Default::default()
    });
    let quantized_ms = quantizer::quantize(
        config.target_buffer_ms,
        mode,
        hns_to_ms(period.default_period),
        hns_to_ms(period.minimum_period),
    );
    debug!(
        "{:?} attempt: requested {} ms, quantized {} ms (default period {} hns, minimum {} hns)",
        mode, config.target_buffer_ms, quantized_ms, period.default_period, period.minimum_period
    );

    client.initialize(
        mode,
        config.event_mode,
        format,
        quantizer::ms_to_hns(quantized_ms),
    )?;
    Ok((client, quantized_ms))
}
