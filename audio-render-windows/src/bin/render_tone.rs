//! Plays a sine tone on the default render endpoint.
//!
//! ```text
//! render-tone [config.json] [seconds]
//! ```
//!
//! The optional config is a camelCase `StreamConfig`, e.g.
//! `{"sampleRate": 48000, "targetBufferMs": 10, "preferExclusive": true}`.
//! Set `RUST_LOG=debug` to see negotiation details.

#[cfg(target_os = "windows")]
mod tone_player {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use log::info;
    use thiserror::Error;

    use audio_render_core::models::config::StreamConfig;
    use audio_render_core::models::error::OpenError;
    use audio_render_core::session::controller::SessionController;
    use audio_render_windows::tone::SineTone;
    use audio_render_windows::WasapiBackend;

    const FREQUENCY_HZ: f64 = 440.0;
    const AMPLITUDE: f64 = 0.2;
    const DEFAULT_SECONDS: u64 = 5;

    #[derive(Debug, Error)]
    pub enum ToneError {
        #[error("failed to read {path}: {source}")]
        ReadConfig {
            path: String,
            source: std::io::Error,
        },

        #[error("invalid config JSON: {0}")]
        ParseConfig(#[from] serde_json::Error),

        #[error("invalid duration: {0}")]
        InvalidSeconds(String),

        #[error("open failed (code {code}): {0}", code = .0.code())]
        Open(#[from] OpenError),
    }

    fn load_config(path: Option<&str>) -> Result<StreamConfig, ToneError> {
        let Some(path) = path else {
            return Ok(StreamConfig::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ToneError::ReadConfig {
            path: path.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn run() -> Result<(), ToneError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let config = load_config(args.first().map(String::as_str))?;
        let seconds = match args.get(1) {
            Some(s) => s.parse::<u64>().map_err(|_| ToneError::InvalidSeconds(s.clone()))?,
            None => DEFAULT_SECONDS,
        };

        let controller = SessionController::new(Arc::new(WasapiBackend::new()));
        controller.open(&config)?;
        println!("{}", controller.status().to_json());

        let mut tone = SineTone::new(&config, FREQUENCY_HZ, AMPLITUDE);
        let chunk_frames = (config.sample_rate / 200).max(1) as usize; // 5 ms
        let mut pending: Vec<u8> = Vec::new();
        let mut offset = 0;

        let deadline = Instant::now() + Duration::from_secs(seconds);
        let mut next_report = Instant::now() + Duration::from_secs(1);
        while Instant::now() < deadline {
            if offset == pending.len() {
                pending.clear();
                offset = 0;
                tone.fill(chunk_frames, &mut pending);
            }
            offset += controller.write(&pending[offset..]);
            if offset < pending.len() {
                // Ring is full; wait for the device to drain a little.
                thread::sleep(Duration::from_millis(2));
            }
            if Instant::now() >= next_report {
                println!("{}", controller.status().to_json());
                next_report += Duration::from_secs(1);
            }
        }

        let status = controller.status();
        controller.close();
        info!(
            "Played {} s: {} periods, {} underruns",
            seconds, status.diagnostics.periods_rendered, status.diagnostics.underrun_periods
        );
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn main() {
    env_logger::init();
    if let Err(e) = tone_player::run() {
        eprintln!("render-tone: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "windows"))]
fn main() {
    eprintln!("render-tone requires Windows (WASAPI)");
    std::process::exit(1);
}
