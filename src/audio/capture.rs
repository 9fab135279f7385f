use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};
use std::io::Cursor;
use std::time::{Duration, Instant};

use super::AudioSample;
use crate::error::{AnalysisError, Result};

/// Records mono audio from the default input device.
///
/// The cpal stream only exists inside [`MicrophoneCapture::record`] and is
/// dropped (stopping the device) before the recording is returned.
pub struct MicrophoneCapture {
    device: Device,
    config: StreamConfig,
}

impl MicrophoneCapture {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| AnalysisError::Device("no input device available".to_string()))?;

        let config = device
            .default_input_config()
            .map_err(|e| AnalysisError::Device(format!("failed to get default input config: {}", e)))?;

        info!("Using audio device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));
        info!("Audio config: {:?}", config);

        Ok(Self {
            device,
            config: config.into(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Record for `duration`, reporting input levels through `on_levels` as chunks arrive
    pub fn record<F>(&self, duration: Duration, mut on_levels: F) -> Result<AudioSample>
    where
        F: FnMut(&[f32]),
    {
        let (audio_sender, audio_receiver) = crossbeam_channel::unbounded();
        let stream = Self::create_input_stream(&self.device, &self.config, audio_sender)?;
        stream
            .play()
            .map_err(|e| AnalysisError::Device(format!("failed to start input stream: {}", e)))?;

        let samples = Self::collect(&audio_receiver, self.sample_rate(), duration, &mut on_levels);
        drop(stream);

        info!("Captured {} samples from microphone", samples.len());
        Ok(AudioSample::new(samples, self.sample_rate()))
    }

    fn collect<F>(
        receiver: &Receiver<Vec<f32>>,
        sample_rate: u32,
        duration: Duration,
        on_levels: &mut F,
    ) -> Vec<f32>
    where
        F: FnMut(&[f32]),
    {
        let target = (sample_rate as f64 * duration.as_secs_f64()) as usize;
        let deadline = Instant::now() + duration + Duration::from_secs(1);
        let mut samples = Vec::with_capacity(target);

        while samples.len() < target && Instant::now() < deadline {
            match receiver.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => {
                    on_levels(&audio_levels(&chunk, 1.0));
                    samples.extend(chunk);
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }

        samples.truncate(target);
        samples
    }

    fn create_input_stream(device: &Device, config: &StreamConfig, sender: Sender<Vec<f32>>) -> Result<Stream> {
        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;

        info!("Creating input stream with {} channels at {} Hz", channels, sample_rate);

        let stream = device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono_data = super::mix_to_mono(data, channels);

                    if sender.send(mono_data).is_err() {
                        warn!("Failed to send audio data");
                    }
                },
                |err| {
                    warn!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AnalysisError::Device(format!("failed to build input stream: {}", e)))?;

        Ok(stream)
    }
}

/// Ten meter bars of segment RMS scaled by `sensitivity`, each clamped to [0.1, 1.0]
pub fn audio_levels(chunk: &[f32], sensitivity: f32) -> Vec<f32> {
    const BARS: usize = 10;

    if chunk.is_empty() {
        return vec![0.1; BARS];
    }

    let segment = chunk.len().div_ceil(BARS);
    let mut levels: Vec<f32> = chunk
        .chunks(segment)
        .map(|part| (super::rms(part) * sensitivity * std::f32::consts::SQRT_2).clamp(0.1, 1.0))
        .collect();
    levels.resize(BARS, 0.1);
    levels
}

/// Encode a recording as 16-bit PCM WAV so it can go through the normal decode path
pub fn encode_wav(sample: &AudioSample) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec)?;
        for &s in sample.samples() {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(buffer)
}
