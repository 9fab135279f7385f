use async_trait::async_trait;
use log::{debug, warn};
use rand::distributions::{Distribution as _, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::Cursor;

use super::explanation::ExplanationGenerator;
use super::rng::rng_for;
use super::{AnalysisResult, AnalysisSource, CategoryMap, CryCategory, Distribution};
use crate::analysis_interface::Analyzer;
use crate::audio::decoder::container_duration;
use crate::config::AnalyzerConfig;

const MIN_CONFIDENCE: f32 = 0.5;
const MAX_CONFIDENCE: f32 = 0.8;
const MIN_OTHERS: usize = 2;
const MAX_OTHERS: usize = 4;

/// Clip length classes used to bias the fallback pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    /// Under 5 seconds
    Short,
    /// 5 to 10 seconds inclusive
    Medium,
    /// Over 10 seconds
    Long,
}

impl DurationBucket {
    pub fn for_duration(duration_secs: f32) -> Self {
        if duration_secs < 5.0 {
            DurationBucket::Short
        } else if duration_secs <= 10.0 {
            DurationBucket::Medium
        } else {
            DurationBucket::Long
        }
    }

    /// Prior weight per category, in declaration order
    pub fn weights(self) -> [f32; CryCategory::COUNT] {
        match self {
            DurationBucket::Short => [0.15, 0.20, 0.12, 0.10, 0.05, 0.08, 0.05, 0.07, 0.10, 0.03, 0.05],
            DurationBucket::Medium => [0.22, 0.10, 0.08, 0.15, 0.08, 0.05, 0.10, 0.04, 0.05, 0.02, 0.11],
            DurationBucket::Long => [0.20, 0.08, 0.04, 0.12, 0.10, 0.03, 0.12, 0.05, 0.04, 0.02, 0.20],
        }
    }
}

/// Produces a plausible result from the raw bytes alone when the DSP path fails.
///
/// Randomness comes from the caller so results can be reproduced with a seed.
#[derive(Debug, Clone)]
pub struct FallbackEstimator {
    default_duration_secs: f32,
    seed: Option<u32>,
    explanations: ExplanationGenerator,
}

impl FallbackEstimator {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            default_duration_secs: config.default_duration_secs,
            seed: config.fallback_seed,
            explanations: ExplanationGenerator::new(),
        }
    }

    /// Best-effort duration: WAV header first, then any container symphonia
    /// understands, otherwise the configured default
    pub fn estimate_duration(&self, bytes: &[u8]) -> f32 {
        if let Ok(reader) = hound::WavReader::new(Cursor::new(bytes)) {
            let spec = reader.spec();
            if spec.sample_rate > 0 {
                return reader.duration() as f32 / spec.sample_rate as f32;
            }
        }

        match container_duration(bytes, "") {
            Some(duration) if duration.is_finite() && duration > 0.0 => duration,
            _ => {
                debug!("Clip duration unknown, assuming {} s", self.default_duration_secs);
                self.default_duration_secs
            }
        }
    }

    pub fn estimate<R: Rng + ?Sized>(&self, bytes: &[u8], rng: &mut R) -> AnalysisResult {
        let duration_secs = self.estimate_duration(bytes);
        let bucket = DurationBucket::for_duration(duration_secs);
        let primary = Self::pick_primary(bucket, rng);
        let confidence = rng.gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE);
        let distribution = Self::spread(primary, confidence, rng);

        warn!(
            "Fallback estimate for {:.1} s clip ({:?} bucket): {} at {:.2}",
            duration_secs, bucket, primary, confidence
        );

        AnalysisResult {
            primary,
            confidence,
            distribution,
            explanation: self.explanations.explain_fallback(primary, confidence, duration_secs, rng),
            source: AnalysisSource::Fallback,
            duration_secs,
        }
    }

    fn pick_primary<R: Rng + ?Sized>(bucket: DurationBucket, rng: &mut R) -> CryCategory {
        let weights = bucket.weights();
        match WeightedIndex::new(weights) {
            Ok(index) => CryCategory::ALL[index.sample(rng)],
            Err(e) => {
                warn!("Invalid fallback weights: {}", e);
                CategoryMap::from_fn(|c| weights[c.index()]).argmax()
            }
        }
    }

    /// Split `1 - confidence` over a few randomly chosen other categories
    fn spread<R: Rng + ?Sized>(primary: CryCategory, confidence: f32, rng: &mut R) -> Distribution {
        let others: Vec<CryCategory> = CryCategory::ALL.iter().copied().filter(|&c| c != primary).collect();
        let count = rng.gen_range(MIN_OTHERS..=MAX_OTHERS);
        let chosen: Vec<CryCategory> = others.choose_multiple(rng, count).copied().collect();

        // Offset keeps every share nonzero and strictly below the primary
        let raw: Vec<f32> = chosen.iter().map(|_| rng.gen::<f32>() + 0.05).collect();
        let raw_total: f32 = raw.iter().sum();
        let remaining = 1.0 - confidence;

        let mut distribution = Distribution::default();
        distribution[primary] = confidence;
        for (category, weight) in chosen.iter().zip(&raw) {
            distribution[*category] = remaining * weight / raw_total;
        }
        distribution
    }
}

impl Default for FallbackEstimator {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

#[async_trait]
impl Analyzer for FallbackEstimator {
    async fn analyze(&self, bytes: &[u8], _media_type: &str) -> AnalysisResult {
        let mut rng = rng_for(self.seed);
        self.estimate(bytes, &mut rng)
    }

    fn name(&self) -> &'static str {
        "Fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::rng::create_rng;
    use approx::assert_relative_eq;

    fn wav_of_seconds(seconds: f32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..(seconds * 8000.0) as usize {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn garbage() -> Vec<u8> {
        b"definitely not an audio container, only plain text\n".repeat(80)
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(DurationBucket::for_duration(0.0), DurationBucket::Short);
        assert_eq!(DurationBucket::for_duration(4.99), DurationBucket::Short);
        assert_eq!(DurationBucket::for_duration(5.0), DurationBucket::Medium);
        assert_eq!(DurationBucket::for_duration(10.0), DurationBucket::Medium);
        assert_eq!(DurationBucket::for_duration(10.01), DurationBucket::Long);

        for bucket in [DurationBucket::Short, DurationBucket::Medium, DurationBucket::Long] {
            assert_relative_eq!(bucket.weights().iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_estimate_duration() {
        let estimator = FallbackEstimator::default();
        assert_relative_eq!(estimator.estimate_duration(&wav_of_seconds(2.5)), 2.5, epsilon = 1e-3);
        assert_eq!(estimator.estimate_duration(&garbage()), 10.0);
        assert_eq!(estimator.estimate_duration(&[]), 10.0);
    }

    /// Mu-law WAV: hound rejects the format tag, symphonia still reads the header
    fn mulaw_wav_of_seconds(seconds: f32) -> Vec<u8> {
        let sample_rate: u32 = 8000;
        let data_len = (seconds * sample_rate as f32) as u32;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4 + 8 + 18 + 8 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&7u16.to_le_bytes()); // WAVE_FORMAT_MULAW
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&8u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(bytes.len() + data_len as usize, 0xFF);
        bytes
    }

    #[test]
    fn test_duration_read_past_hound() {
        let bytes = mulaw_wav_of_seconds(7.0);
        assert!(hound::WavReader::new(Cursor::new(&bytes[..])).is_err());

        let estimator = FallbackEstimator::default();
        assert_relative_eq!(estimator.estimate_duration(&bytes), 7.0, epsilon = 1e-3);

        let result = estimator.estimate(&bytes, &mut create_rng(3));
        assert_relative_eq!(result.duration_secs, 7.0, epsilon = 1e-3);
    }

    #[test]
    fn test_estimate_shape() {
        let estimator = FallbackEstimator::default();
        for seed in 0..50 {
            let result = estimator.estimate(&garbage(), &mut create_rng(seed));
            let d = &result.distribution;

            assert_eq!(result.source, AnalysisSource::Fallback);
            assert_relative_eq!(d.total(), 1.0, epsilon = 1e-6);
            assert!((0.5..=0.8).contains(&result.confidence));
            assert_eq!(d[result.primary], result.confidence);
            assert_eq!(d.argmax(), result.primary);

            let others = d.iter().filter(|&(c, v)| c != result.primary && v > 0.0).count();
            assert!((2..=4).contains(&others), "seed {} gave {} others", seed, others);
        }
    }

    #[test]
    fn test_seeded_estimates_repeat() {
        let estimator = FallbackEstimator::default();
        let bytes = wav_of_seconds(6.0);
        let a = estimator.estimate(&bytes, &mut create_rng(1234));
        let b = estimator.estimate(&bytes, &mut create_rng(1234));
        assert_eq!(a, b);
        assert_relative_eq!(a.duration_secs, 6.0, epsilon = 1e-3);
    }

    #[tokio::test]
    async fn test_trait_uses_configured_seed() {
        let config = AnalyzerConfig {
            fallback_seed: Some(99),
            ..AnalyzerConfig::default()
        };
        let estimator = FallbackEstimator::new(&config);
        let a = estimator.analyze(&garbage(), "audio/wav").await;
        let b = estimator.analyze(&garbage(), "audio/wav").await;
        assert_eq!(a, b);
        assert_eq!(estimator.name(), "Fallback");
    }
}
