//! Audio sinks that play a decoded buffer to completion

use crate::decoder::{decode_payload, AudioBuffer};
use crate::error::SpeechError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Resolve once the whole buffer has been played
    async fn play(&self, buffer: &AudioBuffer) -> Result<(), SpeechError>;

    fn name(&self) -> &str;
}

/// Writes each buffer to a 16-bit WAV file, replacing the previous one
pub struct WavFileSink {
    path: PathBuf,
}

impl WavFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `buffer` as 16-bit integer WAV
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<(), SpeechError> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| SpeechError::Playback(format!("Failed to create {}: {}", path.display(), e)))?;

    for sample in buffer.interleaved() {
        let value = (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| SpeechError::Playback(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| SpeechError::Playback(format!("Failed to finalize WAV: {}", e)))
}

/// Read a WAV file, or raw 16-bit PCM at the fallback format
pub fn read_audio_file(
    path: &Path,
    fallback_rate: u32,
    fallback_channels: u16,
) -> Result<AudioBuffer, SpeechError> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(decode_payload(&bytes, fallback_rate, fallback_channels)?)
}

#[async_trait]
impl AudioSink for WavFileSink {
    async fn play(&self, buffer: &AudioBuffer) -> Result<(), SpeechError> {
        let path = self.path.clone();
        let duration = buffer.duration();
        let buffer = buffer.clone();

        tokio::task::spawn_blocking(move || write_wav(&path, &buffer))
            .await
            .map_err(|e| SpeechError::Playback(format!("WAV writer task failed: {}", e)))??;

        info!("Wrote {:?} of audio to {}", duration, self.path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

/// Discards audio after logging it; for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl AudioSink for NullSink {
    async fn play(&self, buffer: &AudioBuffer) -> Result<(), SpeechError> {
        debug!(
            "Discarding {} frames ({:?}) at {} Hz",
            buffer.frames(),
            buffer.duration(),
            buffer.sample_rate()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(feature = "audio-output")]
pub use device::DeviceSink;

#[cfg(feature = "audio-output")]
mod device {
    use super::*;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleRate, StreamConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tracing::error;

    /// Plays through the default output device
    #[derive(Debug, Default, Clone, Copy)]
    pub struct DeviceSink;

    impl DeviceSink {
        pub fn new() -> Self {
            Self
        }
    }

    // cpal streams are not Send, so the whole stream lives on one blocking thread
    fn play_blocking(buffer: AudioBuffer) -> Result<(), SpeechError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SpeechError::Playback("No output device available".to_string()))?;

        let config = StreamConfig {
            channels: buffer.channel_count(),
            sample_rate: SampleRate(buffer.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };

        let samples = Arc::new(buffer.interleaved());
        let position = Arc::new(AtomicUsize::new(0));

        let stream_samples = samples.clone();
        let stream_position = position.clone();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let start = stream_position.fetch_add(data.len(), Ordering::SeqCst);
                    for (i, out) in data.iter_mut().enumerate() {
                        *out = stream_samples.get(start + i).copied().unwrap_or(0.0);
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| SpeechError::Playback(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SpeechError::Playback(format!("Failed to start stream: {}", e)))?;

        let deadline = Instant::now() + buffer.duration() + Duration::from_millis(500);
        while position.load(Ordering::SeqCst) < samples.len() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }

        Ok(())
    }

    #[async_trait]
    impl AudioSink for DeviceSink {
        async fn play(&self, buffer: &AudioBuffer) -> Result<(), SpeechError> {
            let buffer = buffer.clone();
            tokio::task::spawn_blocking(move || play_blocking(buffer))
                .await
                .map_err(|e| SpeechError::Playback(format!("Playback task failed: {}", e)))?
        }

        fn name(&self) -> &str {
            "device"
        }
    }
}
