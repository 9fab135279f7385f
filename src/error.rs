use std::time::Duration;

/// Errors raised inside the analysis pipeline.
///
/// None of these reach the caller of [`crate::CryAnalyzer::analyze`]: decode and
/// extraction failures are routed to the fallback estimator, and the non-fatal
/// variants are only logged.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// Bytes are empty, not audio, or no codec could decode them
    #[error("Decode error: {0}")]
    Decode(String),

    /// Container decoded but carried no usable timing metadata
    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// Numerically degenerate input such as an all-silent clip
    #[error("Degenerate extraction input: {0}")]
    ExtractionDegenerate(String),

    /// Decoding did not finish within the configured bound
    #[error("Decode timed out after {0:?}")]
    Timeout(Duration),

    /// Blocking worker panicked or was cancelled
    #[error("Worker failure: {0}")]
    Worker(String),

    /// Input device missing, misconfigured or failing mid-stream
    #[error("Audio device error: {0}")]
    Device(String),

    /// WAV encoding or header parsing failed
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AnalysisError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
