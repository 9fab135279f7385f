pub mod capture;
pub mod decoder;
pub mod features;
pub mod fft;
pub mod rhythm;
pub mod spectral_shape;

pub use capture::MicrophoneCapture;
pub use decoder::SignalDecoder;
pub use features::{FeatureExtractor, FeatureVector, IntensityStats};
pub use fft::SpectrumAnalyzer;
pub use rhythm::RhythmStats;

/// Decoded mono waveform handed from the decoder to the feature extractor.
///
/// `duration_secs` is normally `samples.len() / sample_rate`; when the container
/// carried no sample rate the decoder substitutes the configured default duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    samples: Vec<f32>,
    sample_rate: u32,
    duration_secs: f32,
}

impl AudioSample {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_secs = if sample_rate > 0 {
            samples.len() as f32 / sample_rate as f32
        } else {
            0.0
        };

        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }

    /// Build a sample whose duration comes from elsewhere than the sample count
    pub fn with_duration(samples: Vec<f32>, sample_rate: u32, duration_secs: f32) -> Self {
        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Average interleaved frames down to a single channel
pub fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Root-mean-square amplitude; 0 for an empty slice
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}
