use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::analysis_interface::Analyzer;
use crate::audio::{FeatureExtractor, FeatureVector, SignalDecoder};
use crate::classifier::rng::rng_for;
use crate::classifier::{AnalysisResult, AnalysisSource, ExplanationGenerator, FallbackEstimator, ProfileTable, Scorer};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};

/// Stages one analysis passes through.
///
/// `Decoding` and `Extracting` move to `FallbackScoring` on failure; every path
/// ends in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Decoding,
    Extracting,
    Scoring,
    Explaining,
    FallbackScoring,
    Done,
}

/// Decode, extract, score and explain one recording, with the fallback
/// estimator behind every failure.
///
/// Holds no mutable state; concurrent analyses share only the profile table.
pub struct CryAnalyzer {
    config: AnalyzerConfig,
    decoder: SignalDecoder,
    extractor: Arc<FeatureExtractor>,
    scorer: Scorer,
    explanations: ExplanationGenerator,
    fallback: FallbackEstimator,
}

impl CryAnalyzer {
    /// Build with the canonical profiles. An invalid config is replaced by the
    /// defaults (keeping its fallback seed) and a warning is logged.
    pub fn new(config: AnalyzerConfig) -> Self {
        let config = Self::validated_or_default(config);
        let profiles = Arc::new(ProfileTable::canonical(&config));
        Self::build(config, profiles)
    }

    /// Like [`CryAnalyzer::new`] but rejects an invalid config
    pub fn try_new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let profiles = Arc::new(ProfileTable::canonical(&config));
        Ok(Self::build(config, profiles))
    }

    pub fn with_profiles(config: AnalyzerConfig, profiles: Arc<ProfileTable>) -> Self {
        Self::build(Self::validated_or_default(config), profiles)
    }

    pub fn try_with_profiles(config: AnalyzerConfig, profiles: Arc<ProfileTable>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, profiles))
    }

    fn validated_or_default(config: AnalyzerConfig) -> AnalyzerConfig {
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("{}; using default analyzer settings", e);
                AnalyzerConfig {
                    fallback_seed: config.fallback_seed,
                    ..AnalyzerConfig::default()
                }
            }
        }
    }

    fn build(config: AnalyzerConfig, profiles: Arc<ProfileTable>) -> Self {
        info!(
            "Cry analyzer ready: {} profiles, window {} hop {}, decode timeout {:?}",
            profiles.len(),
            config.window_size,
            config.hop_size,
            config.decode_timeout()
        );
        Self {
            decoder: SignalDecoder::from_config(&config),
            extractor: Arc::new(FeatureExtractor::new(&config)),
            scorer: Scorer::new(profiles, config.weights),
            explanations: ExplanationGenerator::new(),
            fallback: FallbackEstimator::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classify a recording; never fails
    pub async fn analyze(&self, bytes: &[u8], media_type: &str) -> AnalysisResult {
        self.analyze_traced(bytes, media_type).await.0
    }

    /// Like [`CryAnalyzer::analyze`], also returning the stages visited in order
    pub async fn analyze_traced(&self, bytes: &[u8], media_type: &str) -> (AnalysisResult, Vec<PipelineStage>) {
        let started = Instant::now();
        let mut stages = vec![PipelineStage::Idle, PipelineStage::Decoding];

        let decoder = self.decoder.clone();
        let owned = bytes.to_vec();
        let owned_type = media_type.to_string();
        let sample = match self
            .run_blocking(PipelineStage::Decoding, move || decoder.decode(&owned, &owned_type))
            .await
        {
            Ok(sample) => sample,
            Err(e) => return (self.fall_back(bytes, e, &mut stages), stages),
        };

        stages.push(PipelineStage::Extracting);
        let duration_secs = sample.duration_secs();
        let extractor = Arc::clone(&self.extractor);
        let features = match self
            .run_blocking(PipelineStage::Extracting, move || Ok(extractor.extract(&sample)))
            .await
        {
            Ok(features) => features,
            Err(e) => return (self.fall_back(bytes, e, &mut stages), stages),
        };

        let result = self.classify(&features, duration_secs, &mut stages);
        info!("Analysis finished in {:.2?}", started.elapsed());
        (result, stages)
    }

    /// Synchronous variant for callers without a runtime; no timeout applies
    pub fn analyze_blocking(&self, bytes: &[u8], media_type: &str) -> AnalysisResult {
        let mut stages = vec![PipelineStage::Idle, PipelineStage::Decoding];
        match self.decoder.decode(bytes, media_type) {
            Ok(sample) => {
                stages.push(PipelineStage::Extracting);
                let features = self.extractor.extract(&sample);
                self.classify(&features, sample.duration_secs(), &mut stages)
            }
            Err(e) => self.fall_back(bytes, e, &mut stages),
        }
    }

    /// Run a stage on the blocking pool under the configured timeout
    async fn run_blocking<T, F>(&self, stage: PipelineStage, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let limit = self.config.decode_timeout();
        match tokio::time::timeout(limit, tokio::task::spawn_blocking(task)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AnalysisError::Worker(format!("{:?} stage failed: {}", stage, join_error))),
            Err(_) => Err(AnalysisError::Timeout(limit)),
        }
    }

    fn classify(
        &self,
        features: &FeatureVector,
        duration_secs: f32,
        stages: &mut Vec<PipelineStage>,
    ) -> AnalysisResult {
        stages.push(PipelineStage::Scoring);
        let (_, distribution, primary, confidence) = self.scorer.classify(features);

        stages.push(PipelineStage::Explaining);
        let explanation = self.explanations.explain(primary, confidence, features, duration_secs);
        stages.push(PipelineStage::Done);

        info!("Classified {:.1} s clip as {} ({:.1}%)", duration_secs, primary, confidence * 100.0);
        AnalysisResult {
            primary,
            confidence,
            distribution,
            explanation,
            source: AnalysisSource::Features,
            duration_secs,
        }
    }

    fn fall_back(&self, bytes: &[u8], error: AnalysisError, stages: &mut Vec<PipelineStage>) -> AnalysisResult {
        warn!("Routing to fallback estimator: {}", error);
        stages.push(PipelineStage::FallbackScoring);
        let mut rng = rng_for(self.config.fallback_seed);
        let result = self.fallback.estimate(bytes, &mut rng);
        stages.push(PipelineStage::Done);
        result
    }
}

impl Default for CryAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[async_trait]
impl Analyzer for CryAnalyzer {
    async fn analyze(&self, bytes: &[u8], media_type: &str) -> AnalysisResult {
        CryAnalyzer::analyze(self, bytes, media_type).await
    }

    fn name(&self) -> &'static str {
        "DSP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CryCategory;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;
    use std::io::Cursor;

    fn tone_wav(seconds: f32, freq: f32, amplitude: impl Fn(f32) -> f32) -> Vec<u8> {
        let sample_rate = 44100;
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let total = (seconds * sample_rate as f32) as usize;
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..total {
                let t = i as f32 / sample_rate as f32;
                let value = amplitude(t / seconds) * (2.0 * PI * freq * t).sin();
                writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn garbage() -> Vec<u8> {
        b"definitely not an audio container, only plain text\n".repeat(80)
    }

    fn seeded_config() -> AnalyzerConfig {
        AnalyzerConfig {
            fallback_seed: Some(2024),
            ..AnalyzerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_feature_path_stages() {
        let analyzer = CryAnalyzer::default();
        let bytes = tone_wav(2.0, 450.0, |p| 0.1 + 0.8 * p);

        let (result, stages) = analyzer.analyze_traced(&bytes, "audio/wav").await;
        assert_eq!(
            stages,
            vec![
                PipelineStage::Idle,
                PipelineStage::Decoding,
                PipelineStage::Extracting,
                PipelineStage::Scoring,
                PipelineStage::Explaining,
                PipelineStage::Done,
            ]
        );
        assert_eq!(result.source, AnalysisSource::Features);
        assert_relative_eq!(result.duration_secs, 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.distribution.total(), 1.0, epsilon = 1e-6);
        assert_eq!(result.primary, result.distribution.argmax());
    }

    #[tokio::test]
    async fn test_garbage_routes_to_fallback() {
        let analyzer = CryAnalyzer::new(seeded_config());
        let (result, stages) = analyzer.analyze_traced(&garbage(), "audio/mpeg").await;

        assert_eq!(
            stages,
            vec![
                PipelineStage::Idle,
                PipelineStage::Decoding,
                PipelineStage::FallbackScoring,
                PipelineStage::Done,
            ]
        );
        assert_eq!(result.source, AnalysisSource::Fallback);
        assert!((0.5..=0.8).contains(&result.confidence));
        assert_relative_eq!(result.distribution.total(), 1.0, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_non_audio_media_type_falls_back() {
        let analyzer = CryAnalyzer::new(seeded_config());
        let bytes = tone_wav(1.0, 450.0, |_| 0.5);
        let result = analyzer.analyze(&bytes, "text/plain").await;
        assert_eq!(result.source, AnalysisSource::Fallback);
        // WAV header still gives the fallback a duration
        assert_relative_eq!(result.duration_secs, 1.0, epsilon = 1e-3);
    }

    #[tokio::test]
    async fn test_timeout_routes_to_fallback() {
        let config = AnalyzerConfig {
            decode_timeout_ms: 0,
            ..seeded_config()
        };
        let analyzer = CryAnalyzer::new(config);
        let bytes = tone_wav(20.0, 450.0, |_| 0.5);

        let (result, stages) = analyzer.analyze_traced(&bytes, "audio/wav").await;
        assert_eq!(result.source, AnalysisSource::Fallback);
        assert!(stages.contains(&PipelineStage::FallbackScoring));
        assert_relative_eq!(result.distribution.total(), 1.0, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_blocking_matches_async() {
        let analyzer = CryAnalyzer::default();
        let bytes = tone_wav(1.5, 600.0, |p| 1.0 - 0.8 * p);

        let from_async = analyzer.analyze(&bytes, "audio/wav").await;
        let from_blocking = analyzer.analyze_blocking(&bytes, "audio/wav");
        assert_eq!(from_async, from_blocking);
    }

    #[tokio::test]
    async fn test_concurrent_analyses_are_independent() {
        let analyzer = Arc::new(CryAnalyzer::new(seeded_config()));
        let bytes = tone_wav(1.0, 450.0, |p| 0.1 + 0.8 * p);
        let junk = garbage();

        let (a, b, c) = tokio::join!(
            analyzer.analyze(&bytes, "audio/wav"),
            analyzer.analyze(&bytes, "audio/wav"),
            analyzer.analyze(&junk, "")
        );
        assert_eq!(a, b);
        assert_eq!(c.source, AnalysisSource::Fallback);
    }

    #[tokio::test]
    async fn test_silent_clip_is_classified_not_failed() {
        let analyzer = CryAnalyzer::default();
        let bytes = tone_wav(1.0, 450.0, |_| 0.0);
        let result = analyzer.analyze(&bytes, "audio/wav").await;
        assert_eq!(result.source, AnalysisSource::Features);
        assert_eq!(result.primary, CryCategory::Silence);
    }

    fn broken_config() -> AnalyzerConfig {
        AnalyzerConfig {
            window_size: 0,
            fallback_seed: Some(7),
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        assert!(matches!(CryAnalyzer::try_new(broken_config()), Err(AnalysisError::Config(_))));

        let profiles = Arc::new(ProfileTable::canonical(&AnalyzerConfig::default()));
        assert!(matches!(
            CryAnalyzer::try_with_profiles(broken_config(), profiles),
            Err(AnalysisError::Config(_))
        ));
        assert!(CryAnalyzer::try_new(seeded_config()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_config_falls_back_to_defaults() {
        let analyzer = CryAnalyzer::new(broken_config());
        let expected = AnalyzerConfig {
            fallback_seed: Some(7),
            ..AnalyzerConfig::default()
        };
        assert_eq!(analyzer.config(), &expected);

        // Still analyzes with the default window instead of a zero-sized one
        let bytes = tone_wav(1.0, 450.0, |p| 0.1 + 0.8 * p);
        let result = analyzer.analyze(&bytes, "audio/wav").await;
        assert_eq!(result.source, AnalysisSource::Features);
    }

    #[tokio::test]
    async fn test_trait_object() {
        let analyzer: Box<dyn Analyzer> = Box::new(CryAnalyzer::default());
        assert_eq!(analyzer.name(), "DSP");
        let result = analyzer.analyze(&[], "audio/wav").await;
        assert_eq!(result.source, AnalysisSource::Fallback);
    }
}
