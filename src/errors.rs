use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser not launched")]
    BrowserNotLaunched,

    #[error("Tab creation failed: {0}")]
    TabCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("JavaScript execution timeout")]
    JavaScriptTimeout,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Nothing to generate: no steps recorded")]
    NoSteps,

    #[error("Generation service returned {status}: {body}")]
    GenerationStatus { status: u16, body: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(String),
}

pub type Result<T> = std::result::Result<T, RecorderError>;

// Convert anyhow::Error to RecorderError
impl From<anyhow::Error> for RecorderError {
    fn from(err: anyhow::Error) -> Self {
        RecorderError::AnyhowError(err.to_string())
    }
}

impl RecorderError {
    /// True for failures of the generation collaborator, which are recoverable by retrying.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            RecorderError::GenerationStatus { .. }
                | RecorderError::HttpError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failures_are_recoverable() {
        let status = RecorderError::GenerationStatus {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(status.is_generation_failure());
        assert_eq!(
            status.to_string(),
            "Generation service returned 502: bad gateway"
        );
        assert!(!RecorderError::NoSteps.is_generation_failure());
    }

    #[test]
    fn test_anyhow_bridge() {
        let err: RecorderError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, RecorderError::AnyhowError(ref msg) if msg == "boom"));
    }
}
