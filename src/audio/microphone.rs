//! Microphone capture using cpal
//!
//! Records the default input device into memory; the result is encoded as a
//! 16-bit PCM WAV buffer ready for transcription.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use hound::{WavSpec, WavWriter};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Settings;

/// Captured PCM samples, interleaved when `channels > 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RecordedAudio {
    /// Length of the recording
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / self.channels.max(1) as u64;
        Duration::from_millis(frames * 1000 / self.sample_rate.max(1) as u64)
    }

    /// Encode as a 16-bit PCM WAV file in memory
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer =
                WavWriter::new(&mut cursor, spec).context("Failed to start WAV encoding")?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize().context("Failed to finalize WAV buffer")?;
        }

        Ok(cursor.into_inner())
    }
}

/// Records from the default input device
pub struct MicrophoneRecorder {
    sample_rate: u32,
    channels: u16,
}

impl MicrophoneRecorder {
    pub fn new(settings: &Settings) -> Self {
        Self {
            sample_rate: settings.audio.sample_rate,
            channels: settings.audio.channels,
        }
    }

    /// Record for `duration`, blocking the calling thread.
    ///
    /// The input stream is dropped before this returns.
    pub fn record(&self, duration: Duration) -> Result<RecordedAudio> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .context("No input device available")?;

        tracing::info!(
            "cpal: Using audio device: {}",
            device.name().unwrap_or_default()
        );

        let supported_configs = device
            .supported_input_configs()
            .context("Failed to get supported configs")?;

        let config = find_suitable_config(supported_configs, self.sample_rate, self.channels)?;

        tracing::info!(
            "cpal: Audio config: {} Hz, {} channels, {:?}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        let stream_config = StreamConfig {
            channels: config.channels(),
            sample_rate: config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let samples = Arc::new(Mutex::new(Vec::new()));
        let recording = Arc::new(AtomicBool::new(true));

        let buffer = samples.clone();
        let active = recording.clone();
        let stream = match config.sample_format() {
            SampleFormat::I8 => build_stream::<i8>(&device, &stream_config, buffer, active)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, buffer, active)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, buffer, active)?,
            SampleFormat::I64 => build_stream::<i64>(&device, &stream_config, buffer, active)?,
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, buffer, active)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, buffer, active)?,
            SampleFormat::U32 => build_stream::<u32>(&device, &stream_config, buffer, active)?,
            SampleFormat::U64 => build_stream::<u64>(&device, &stream_config, buffer, active)?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, buffer, active)?,
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, buffer, active)?,
            format => anyhow::bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start audio stream")?;
        tracing::info!("cpal: Recording for {}s", duration.as_secs());
        std::thread::sleep(duration);

        recording.store(false, Ordering::SeqCst);
        drop(stream);

        let samples = samples
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .map_err(|_| anyhow::anyhow!("Audio buffer lock was poisoned"))?;

        let audio = RecordedAudio {
            samples,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };
        tracing::info!("cpal: Captured {:.1}s of audio", audio.duration().as_secs_f32());
        Ok(audio)
    }
}

/// Find a suitable audio configuration
fn find_suitable_config(
    configs: cpal::SupportedInputConfigs,
    target_sample_rate: u32,
    target_channels: u16,
) -> Result<cpal::SupportedStreamConfig> {
    let configs: Vec<_> = configs.collect();
    let supports_rate = |config: &cpal::SupportedStreamConfigRange| {
        config.min_sample_rate().0 <= target_sample_rate
            && config.max_sample_rate().0 >= target_sample_rate
    };

    let preferred = configs
        .iter()
        .find(|c| c.channels() == target_channels && supports_rate(c))
        .or_else(|| configs.iter().find(|c| supports_rate(c)));

    if let Some(config) = preferred {
        return Ok(config
            .clone()
            .with_sample_rate(cpal::SampleRate(target_sample_rate)));
    }

    configs
        .into_iter()
        .next()
        .map(|c| c.with_max_sample_rate())
        .context("No supported audio configuration found")
}

/// Build an input stream that appends converted samples to `buffer`
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    buffer: Arc<Mutex<Vec<i16>>>,
    recording: Arc<AtomicBool>,
) -> Result<Stream>
where
    T: cpal::Sample + cpal::SizedSample + 'static,
    i16: cpal::FromSample<T>,
{
    let err_fn = |err| tracing::error!("Audio stream error: {}", err);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if !recording.load(Ordering::SeqCst) {
                return;
            }

            if let Ok(mut guard) = buffer.lock() {
                guard.extend(data.iter().map(|&s| <i16 as cpal::Sample>::from_sample(s)));
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
