use thiserror::Error;

/// Errors surfaced by the analytics engine.
///
/// Too few reports for segmentation or anomaly detection is not an error; see
/// [`crate::analytics::Analysis`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prediction service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AnalyticsError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AnalyticsError::InvalidInput(message.into())
    }
}

impl From<validator::ValidationErrors> for AnalyticsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AnalyticsError::InvalidInput(errors.to_string())
    }
}

pub type Result<T, E = AnalyticsError> = std::result::Result<T, E>;
