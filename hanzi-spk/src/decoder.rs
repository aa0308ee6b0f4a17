//! 16-bit PCM to floating-point sample buffers

use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;

/// Scale for signed 16-bit samples, so -32768 maps to exactly -1.0
const I16_SCALE: f32 = 32768.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("channel count must be at least 1")]
    ZeroChannels,

    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("{0} bytes is not a whole number of 16-bit samples")]
    OddByteLength(usize),

    #[error("{samples} samples do not divide evenly into {channels} channels")]
    PartialFrame { samples: usize, channels: u16 },

    #[error("unsupported WAV format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid WAV container: {0}")]
    Wav(String),
}

/// Decoded audio, one sample vector per channel
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Frame-major interleaving, as audio devices and WAV writers expect
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * self.channels.len());
        for frame in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Decode interleaved little-endian i16 PCM.
///
/// Every sample is divided by 32768. A byte length that is not a whole
/// number of frames is rejected rather than truncated.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: u16,
) -> Result<AudioBuffer, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddByteLength(bytes.len()));
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    from_samples(&samples, sample_rate, channel_count)
}

/// Decode a synthesis payload.
///
/// A RIFF/WAVE container supplies its own rate and channel count; anything
/// else is treated as raw PCM with the fallback format.
pub fn decode_payload(
    bytes: &[u8],
    fallback_rate: u32,
    fallback_channels: u16,
) -> Result<AudioBuffer, DecodeError> {
    if !is_wav(bytes) {
        return decode_pcm16(bytes, fallback_rate, fallback_channels);
    }

    let reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| DecodeError::Wav(e.to_string()))?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(DecodeError::UnsupportedFormat(format!(
            "{:?} {}-bit",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DecodeError::Wav(e.to_string()))?;

    from_samples(&samples, spec.sample_rate, spec.channels)
}

pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn from_samples(
    samples: &[i16],
    sample_rate: u32,
    channel_count: u16,
) -> Result<AudioBuffer, DecodeError> {
    if channel_count == 0 {
        return Err(DecodeError::ZeroChannels);
    }
    if sample_rate == 0 {
        return Err(DecodeError::ZeroSampleRate);
    }

    let width = channel_count as usize;
    if samples.len() % width != 0 {
        return Err(DecodeError::PartialFrame {
            samples: samples.len(),
            channels: channel_count,
        });
    }

    let frames = samples.len() / width;
    let mut channels = vec![Vec::with_capacity(frames); width];
    for frame in samples.chunks_exact(width) {
        for (channel, sample) in channels.iter_mut().zip(frame) {
            channel.push(*sample as f32 / I16_SCALE);
        }
    }

    Ok(AudioBuffer {
        sample_rate,
        channels,
    })
}
