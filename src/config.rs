use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Relative weight of each sub-score when combining them into a raw category score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub pitch: f32,
    pub rhythm: f32,
    pub intensity: f32,
    pub spectral: f32,
}

impl ScoringWeights {
    pub fn total(&self) -> f32 {
        self.pitch + self.rhythm + self.intensity + self.spectral
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            pitch: 0.25,
            rhythm: 0.25,
            intensity: 0.20,
            spectral: 0.30,
        }
    }
}

/// Tunable parameters for decoding, feature extraction and scoring.
///
/// Defaults reproduce the reference pipeline: 1024-sample Hann windows with a
/// 512-sample hop, 40 energy bands, 512-sample rhythm frames, 4096-sample
/// intensity frames and a 13-element spectral shape.
///
/// Parameters can be persisted as pretty JSON with [`AnalyzerConfig::save`] and
/// read back with [`AnalyzerConfig::load`], which also validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    // Spectrum analysis
    pub window_size: usize,
    pub hop_size: usize,
    pub num_bands: usize,

    // Temporal analysis
    pub rhythm_frame_size: usize,
    pub intensity_frame_size: usize,
    pub peak_threshold: f32,

    // Spectral fingerprint
    pub shape_coefficients: usize,
    pub shape_max_hz: f32,

    pub weights: ScoringWeights,

    // Decoder behaviour
    pub decode_timeout_ms: u64,
    pub default_duration_secs: f32,
    pub assumed_sample_rate: u32,

    /// Fixed seed for the fallback estimator. `None` draws from entropy per analysis.
    pub fallback_seed: Option<u32>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            hop_size: 512,
            num_bands: 40,

            rhythm_frame_size: 512,
            intensity_frame_size: 4096,
            peak_threshold: 0.1,

            shape_coefficients: 13,
            shape_max_hz: 8000.0,

            weights: ScoringWeights::default(),

            decode_timeout_ms: 3000,
            default_duration_secs: 10.0,
            assumed_sample_rate: 44100,

            fallback_seed: None,
        }
    }
}

impl AnalyzerConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    /// Reject parameter sets that would make extraction or scoring meaningless
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("window_size", self.window_size),
            ("hop_size", self.hop_size),
            ("num_bands", self.num_bands),
            ("rhythm_frame_size", self.rhythm_frame_size),
            ("intensity_frame_size", self.intensity_frame_size),
            ("shape_coefficients", self.shape_coefficients),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(AnalysisError::Config(format!("{} must be non-zero", name)));
            }
        }

        if self.num_bands > self.window_size / 2 {
            return Err(AnalysisError::Config(format!(
                "num_bands ({}) exceeds spectrum bins ({})",
                self.num_bands,
                self.window_size / 2
            )));
        }

        let w = self.weights;
        if [w.pitch, w.rhythm, w.intensity, w.spectral].iter().any(|&x| x < 0.0 || !x.is_finite()) {
            return Err(AnalysisError::Config("scoring weights must be finite and non-negative".to_string()));
        }
        if w.total() <= 0.0 {
            return Err(AnalysisError::Config("scoring weights must sum to a positive value".to_string()));
        }

        if !(self.shape_max_hz > 0.0) || !(self.default_duration_secs > 0.0) || self.assumed_sample_rate == 0 {
            return Err(AnalysisError::Config(
                "shape_max_hz, default_duration_secs and assumed_sample_rate must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Save parameters to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate parameters from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
