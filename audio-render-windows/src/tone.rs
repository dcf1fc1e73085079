//! Sine tone generator producing interleaved integer PCM in the layout the
//! render engine expects.

use std::f64::consts::TAU;

use audio_render_core::models::config::StreamConfig;

pub struct SineTone {
    frequency: f64,
    amplitude: f64,
    sample_rate: f64,
    channels: usize,
    bytes_per_sample: usize,
    phase: f64,
}

impl SineTone {
    /// `amplitude` is relative to full scale and clamped to 0..=1.
    pub fn new(config: &StreamConfig, frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude: amplitude.clamp(0.0, 1.0),
            sample_rate: config.sample_rate as f64,
            channels: config.channels as usize,
            bytes_per_sample: config.bits_per_sample as usize / 8,
            phase: 0.0,
        }
    }

    /// Append `frames` frames to `out`, continuing the waveform from the
    /// previous call.
    pub fn fill(&mut self, frames: usize, out: &mut Vec<u8>) {
        let step = TAU * self.frequency / self.sample_rate;
        out.reserve(frames * self.channels * self.bytes_per_sample);
        for _ in 0..frames {
            let value = self.amplitude * self.phase.sin();
            for _ in 0..self.channels {
                self.push_sample(value, out);
            }
            self.phase = (self.phase + step) % TAU;
        }
    }

    fn push_sample(&self, value: f64, out: &mut Vec<u8>) {
        match self.bytes_per_sample {
            2 => out.extend_from_slice(&((value * i16::MAX as f64) as i16).to_le_bytes()),
            // 24-bit: low three bytes of the little-endian i32
            3 => out.extend_from_slice(&((value * 8_388_607.0) as i32).to_le_bytes()[..3]),
            _ => out.extend_from_slice(&((value * i32::MAX as f64) as i32).to_le_bytes()),
        }
    }
}
