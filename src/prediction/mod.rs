pub mod client;
pub mod wire;

pub use client::*;
pub use wire::*;

use std::time::Duration;
use thiserror::Error;

use crate::error::AnalyticsError;

/// Failures of the remote prediction path. All of them are recovered by the
/// local estimator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("service not ready (status={status}, model_loaded={model_loaded})")]
    Unhealthy { status: ServiceState, model_loaded: bool },

    #[error("inconsistent response: {0}")]
    InconsistentResponse(String),
}

impl From<PredictionError> for AnalyticsError {
    fn from(error: PredictionError) -> Self {
        AnalyticsError::ServiceUnavailable(error.to_string())
    }
}
