//! Infant cry analysis: decode a short recording, extract pitch, rhythm,
//! intensity and spectral-shape features, score them against reference
//! profiles and explain the most likely need. Any failure along the way is
//! answered by a duration-weighted fallback estimate.

pub mod analysis_interface;
pub mod audio;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use analysis_interface::Analyzer;
pub use audio::{AudioSample, FeatureExtractor, FeatureVector, SignalDecoder};
pub use classifier::{
    AnalysisResult, AnalysisSource, CategoryMap, CryCategory, Distribution, FallbackEstimator, ProfileTable,
    ScoreMap, Scorer,
};
pub use config::{AnalyzerConfig, ScoringWeights};
pub use error::{AnalysisError, Result};
pub use pipeline::{CryAnalyzer, PipelineStage};
