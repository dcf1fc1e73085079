/// PCM stream format descriptor in extensible form.
///
/// `to_bytes()` produces the 40-byte little-endian WAVEFORMATEXTENSIBLE
/// structure the audio engine expects.
///
/// Layout:
/// ```text
/// [0-1]    0xFFFE (WAVE_FORMAT_EXTENSIBLE)
/// [2-3]    channels
/// [4-7]    sample_rate
/// [8-11]   avg_bytes_per_sec = sample_rate * block_align
/// [12-13]  block_align = channels * bits_per_sample / 8
/// [14-15]  bits_per_sample
/// [16-17]  22 (extension size)
/// [18-19]  valid_bits_per_sample
/// [20-23]  channel_mask
/// [24-39]  KSDATAFORMAT_SUBTYPE_PCM
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    pub block_align: u16,
    pub avg_bytes_per_sec: u32,
    pub valid_bits_per_sample: u16,
    pub channel_mask: u32,
}

pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the serialized extensible descriptor in bytes.
pub const WAVE_FORMAT_EXTENSIBLE_SIZE: usize = 40;

/// Bytes following the base WAVEFORMATEX header.
const EXTENSION_SIZE: u16 = 22;

pub const SPEAKER_FRONT_LEFT: u32 = 0x1;
pub const SPEAKER_FRONT_RIGHT: u32 = 0x2;

/// {00000001-0000-0010-8000-00AA00389B71} in GUID memory order.
pub const KSDATAFORMAT_SUBTYPE_PCM: [u8; 16] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

impl WaveFormat {
    /// Integer PCM with a front-left/front-right mask for stereo and an
    /// unspecified mask otherwise.
    pub fn pcm(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        let block_align = u16::try_from(channels as u32 * bits_per_sample as u32 / 8).unwrap_or(u16::MAX);
        let channel_mask = if channels == 2 {
            SPEAKER_FRONT_LEFT | SPEAKER_FRONT_RIGHT
        } else {
            0
        };
        Self {
            sample_rate,
            bits_per_sample,
            channels,
            block_align,
            avg_bytes_per_sec: sample_rate.saturating_mul(block_align as u32),
            valid_bits_per_sample: bits_per_sample,
            channel_mask,
        }
    }

    pub fn frames_to_bytes(&self, frames: u32) -> usize {
        frames as usize * self.block_align as usize
    }

    pub fn to_bytes(&self) -> [u8; WAVE_FORMAT_EXTENSIBLE_SIZE] {
        let mut out = [0u8; WAVE_FORMAT_EXTENSIBLE_SIZE];

        out[0..2].copy_from_slice(&WAVE_FORMAT_EXTENSIBLE.to_le_bytes());
        out[2..4].copy_from_slice(&self.channels.to_le_bytes());
        out[4..8].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[8..12].copy_from_slice(&self.avg_bytes_per_sec.to_le_bytes());
        out[12..14].copy_from_slice(&self.block_align.to_le_bytes());
        out[14..16].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[16..18].copy_from_slice(&EXTENSION_SIZE.to_le_bytes());

        out[18..20].copy_from_slice(&self.valid_bits_per_sample.to_le_bytes());
        out[20..24].copy_from_slice(&self.channel_mask.to_le_bytes());
        out[24..40].copy_from_slice(&KSDATAFORMAT_SUBTYPE_PCM);

        out
    }
}
