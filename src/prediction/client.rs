use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{PredictionError, PredictionRequest, PredictionResponse, ServiceHealth};

/// Remote, model-backed estimator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteEstimator: Send + Sync {
    async fn health(&self) -> Result<ServiceHealth, PredictionError>;
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError>;
}

/// HTTP client for the prediction service.
#[derive(Clone)]
pub struct PredictionClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl PredictionClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("household-energy-analytics/0.1"),
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn transport_error(&self, e: reqwest::Error) -> PredictionError {
        if e.is_timeout() {
            PredictionError::Timeout(self.timeout)
        } else {
            PredictionError::Transport(e.to_string())
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, PredictionError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(PredictionError::Http {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| PredictionError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteEstimator for PredictionClient {
    async fn health(&self) -> Result<ServiceHealth, PredictionError> {
        let resp = self
            .client
            .get(self.url("health"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let health: ServiceHealth = self.read_json(resp).await?;
        debug!(status = %health.status, model_loaded = health.model_loaded, "prediction service health");
        Ok(health)
    }

    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        let resp = self
            .client
            .post(self.url("predict"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(resp).await
    }
}
