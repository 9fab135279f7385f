use log::debug;
use serde::Serialize;

use super::fft::SpectrumAnalyzer;
use super::rhythm::{PulseDetector, RhythmStats};
use super::spectral_shape::spectral_shape;
use super::{rms, AudioSample};
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;

/// Loudness statistics of a clip.
///
/// # Example Ranges
/// - `rms`: 0.0 to ~0.7 for full-scale speech or crying
/// - `dynamic_range`: 0.0 to 2.0 (max sample minus min sample)
/// - `growth_trend`: negative when the clip fades, positive when it builds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IntensityStats {
    pub rms: f32,
    pub dynamic_range: f32,
    pub growth_trend: f32,
}

/// Everything the scorer knows about a clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub pitch_hz: f32,
    pub energy_bands: Vec<f32>,
    pub rhythm: RhythmStats,
    pub intensity: IntensityStats,
    pub spectral_shape: Vec<f32>,
}

impl FeatureVector {
    /// All-zero features of the configured dimensions
    pub fn zeroed(num_bands: usize, shape_coefficients: usize) -> Self {
        Self {
            pitch_hz: 0.0,
            energy_bands: vec![0.0; num_bands],
            rhythm: RhythmStats::default(),
            intensity: IntensityStats::default(),
            spectral_shape: vec![0.0; shape_coefficients],
        }
    }
}

/// Computes a [`FeatureVector`] from a decoded clip.
///
/// Extraction never fails: empty or silent clips degrade to zeroed
/// sub-features. Identical input always produces bit-identical output.
pub struct FeatureExtractor {
    spectrum: SpectrumAnalyzer,
    pulses: PulseDetector,
    num_bands: usize,
    intensity_frame_size: usize,
    shape_coefficients: usize,
    shape_max_hz: f32,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl FeatureExtractor {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            spectrum: SpectrumAnalyzer::new(config.window_size, config.hop_size),
            pulses: PulseDetector::new(config.rhythm_frame_size, config.peak_threshold),
            num_bands: config.num_bands,
            intensity_frame_size: config.intensity_frame_size.max(1),
            shape_coefficients: config.shape_coefficients,
            shape_max_hz: config.shape_max_hz,
        }
    }

    pub fn extract(&self, sample: &AudioSample) -> FeatureVector {
        let samples = sample.samples();
        let sample_rate = sample.sample_rate();

        let intensity = self.intensity(samples);
        if intensity.rms == 0.0 {
            let reason = AnalysisError::ExtractionDegenerate(format!("{} samples of silence", samples.len()));
            debug!("{}; returning zeroed features", reason);
            return FeatureVector::zeroed(self.num_bands, self.shape_coefficients);
        }

        let spectrum = self.spectrum.average_spectrum(samples);
        let energy_bands = SpectrumAnalyzer::energy_bands(&spectrum, self.num_bands);
        let pitch_hz = SpectrumAnalyzer::dominant_frequency(&spectrum, sample_rate);
        let rhythm = self.pulses.analyze(samples, sample_rate);
        let spectral_shape = spectral_shape(
            &spectrum,
            sample_rate,
            intensity.rms,
            self.shape_coefficients,
            self.shape_max_hz,
        );

        debug!(
            "Features: pitch={:.1}Hz pulses={} regularity={:.3} tempo={:.1}bpm rms={:.4} range={:.4} growth={:+.5}",
            pitch_hz,
            rhythm.pulse_count,
            rhythm.regularity,
            rhythm.tempo_bpm,
            intensity.rms,
            intensity.dynamic_range,
            intensity.growth_trend
        );

        FeatureVector {
            pitch_hz,
            energy_bands,
            rhythm,
            intensity,
            spectral_shape,
        }
    }

    fn intensity(&self, samples: &[f32]) -> IntensityStats {
        if samples.is_empty() {
            return IntensityStats::default();
        }

        let max = samples.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let min = samples.iter().fold(f32::INFINITY, |a, &b| a.min(b));

        IntensityStats {
            rms: rms(samples),
            dynamic_range: (max - min).max(0.0),
            growth_trend: self.growth_trend(samples),
        }
    }

    /// Mean successive difference of per-frame RMS
    fn growth_trend(&self, samples: &[f32]) -> f32 {
        let frame_rms: Vec<f32> = samples.chunks(self.intensity_frame_size).map(rms).collect();
        if frame_rms.len() < 2 {
            return 0.0;
        }

        let diffs: f32 = frame_rms.windows(2).map(|w| w[1] - w[0]).sum();
        diffs / (frame_rms.len() - 1) as f32
    }
}
