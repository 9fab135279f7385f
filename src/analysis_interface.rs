use async_trait::async_trait;

use crate::classifier::AnalysisResult;

/// Common interface for every cry analysis implementation.
///
/// Implementations never fail: whatever goes wrong inside is resolved into a
/// result, so callers always get a category, a confidence and a distribution.
///
/// # Available Implementations
/// - `CryAnalyzer`: decode, feature extraction and profile scoring, with fallback
/// - `FallbackEstimator`: duration-weighted estimate from the raw bytes only
///
/// # Example Usage
/// ```rust,no_run
/// use cry_analyzer::{Analyzer, AnalyzerConfig, CryAnalyzer};
///
/// async fn classify(bytes: &[u8]) {
///     let analyzer: Box<dyn Analyzer> = Box::new(CryAnalyzer::new(AnalyzerConfig::default()));
///     let result = analyzer.analyze(bytes, "audio/wav").await;
///     println!("{} ({:.0}%)", result.primary, result.confidence * 100.0);
/// }
/// ```
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Classify one recording given its raw bytes and declared media type
    async fn analyze(&self, bytes: &[u8], media_type: &str) -> AnalysisResult;

    /// Analyzer name for logging
    fn name(&self) -> &'static str;
}
