use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{LocalEstimator, TariffSchedule};
use crate::config::Config;
use crate::domain::{ApplianceInventory, EnergyEstimate, HouseholdProfile};
use crate::error::Result;
use crate::prediction::{PredictionClient, PredictionError, PredictionRequest, RemoteEstimator};

/// How the prediction service took part in an estimate. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceStatus {
    Disabled,
    Used,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateOutcome {
    pub estimate: EnergyEstimate,
    pub service: ServiceStatus,
}

/// Tries the prediction service first, when one is configured, and falls back
/// to the local estimator on any remote failure.
pub struct EstimationEngine {
    local: LocalEstimator,
    remote: Option<Arc<dyn RemoteEstimator>>,
    check_health: bool,
    timeout: Duration,
}

impl EstimationEngine {
    pub fn local_only(local: LocalEstimator) -> Self {
        Self {
            local,
            remote: None,
            check_health: false,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_remote(
        local: LocalEstimator,
        remote: Arc<dyn RemoteEstimator>,
        timeout: Duration,
        check_health: bool,
    ) -> Self {
        Self {
            local,
            remote: Some(remote),
            check_health,
            timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let local = LocalEstimator::new(TariffSchedule::from_config(&cfg.tariff)?);
        if !cfg.prediction.enabled {
            return Ok(Self::local_only(local));
        }
        let timeout = Duration::from_secs(cfg.prediction.http_timeout_seconds);
        let client = PredictionClient::new(cfg.prediction.base_url.clone(), timeout)?;
        Ok(Self::with_remote(
            local,
            Arc::new(client),
            timeout,
            cfg.prediction.check_health,
        ))
    }

    pub fn local(&self) -> &LocalEstimator {
        &self.local
    }

    pub async fn estimate(
        &self,
        inventory: &ApplianceInventory,
        household: &HouseholdProfile,
    ) -> Result<EstimateOutcome> {
        self.estimate_with_cancel(inventory, household, &CancellationToken::new())
            .await
    }

    /// Like [`estimate`](Self::estimate); cancelling the token abandons the
    /// remote call and answers from the local estimator.
    pub async fn estimate_with_cancel(
        &self,
        inventory: &ApplianceInventory,
        household: &HouseholdProfile,
        cancel: &CancellationToken,
    ) -> Result<EstimateOutcome> {
        self.local.check_request(inventory, household)?;

        let Some(remote) = &self.remote else {
            return Ok(EstimateOutcome {
                estimate: self.local.estimate(inventory, household)?,
                service: ServiceStatus::Disabled,
            });
        };

        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PredictionError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.try_remote(remote.as_ref(), inventory, household)) => {
                res.unwrap_or(Err(PredictionError::Timeout(self.timeout)))
            }
        };

        match attempt {
            Ok(estimate) => {
                info!(
                    total_kwh = estimate.total_consumption_kwh,
                    bill = estimate.estimated_bill,
                    bracket = %estimate.tariff_bracket,
                    "remote estimate produced"
                );
                Ok(EstimateOutcome {
                    estimate,
                    service: ServiceStatus::Used,
                })
            }
            Err(e) => {
                warn!(error = %e, "prediction service unavailable, using local estimator");
                Ok(EstimateOutcome {
                    estimate: self.local.estimate(inventory, household)?,
                    service: ServiceStatus::Unavailable {
                        reason: e.to_string(),
                    },
                })
            }
        }
    }

    async fn try_remote(
        &self,
        remote: &dyn RemoteEstimator,
        inventory: &ApplianceInventory,
        household: &HouseholdProfile,
    ) -> std::result::Result<EnergyEstimate, PredictionError> {
        if self.check_health {
            let health = remote.health().await?;
            if !health.is_ready() {
                return Err(PredictionError::Unhealthy {
                    status: health.status,
                    model_loaded: health.model_loaded,
                });
            }
        }
        let request = PredictionRequest::new(inventory, household);
        let response = remote.predict(&request).await?;
        response.into_estimate(household, self.local.tariff())
    }
}
