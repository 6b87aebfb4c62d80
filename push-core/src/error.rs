use thiserror::Error;

/// Main error type for push decoding operations
///
/// Recoverable conditions inside the stream parser (pattern mismatch,
/// truncated reads, skip failures) are expressed as `bool`/`Option`
/// returns and never surface as errors; this type covers the API
/// surfaces where a caller handed us something malformed.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Pattern syntax error: {0}")]
    PatternSyntax(String),
}

/// Result type alias for push decoding operations
pub type PushResult<T> = Result<T, PushError>;
