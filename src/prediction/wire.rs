//! Request and response bodies of the prediction service, and the mapping of
//! its answer onto [`EnergyEstimate`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;
use uuid::Uuid;

use super::PredictionError;
use crate::billing::{assess_budget, TariffSchedule};
use crate::domain::{
    ApplianceBreakdownItem, ApplianceInventory, BudgetStatus, EnergyEstimate, EstimateSource,
    HouseholdProfile,
};

const POWER_UNIT_WATTS: &str = "W";
const TOTAL_ABS_TOLERANCE_KWH: f64 = 0.01;
const TOTAL_REL_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceState {
    Healthy,
    Degraded,
    Offline,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: ServiceState,
    pub model_loaded: bool,
}

impl ServiceHealth {
    pub fn is_ready(&self) -> bool {
        self.status == ServiceState::Healthy && self.model_loaded
    }
}

/// `POST /predict` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub appliances: Vec<WireAppliance>,
    pub household_info: WireHouseholdInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAppliance {
    pub appliance: String,
    pub power: f64,
    pub power_unit: String,
    pub hours: f64,
    pub quantity: u32,
    pub usage_days_monthly: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireHouseholdInfo {
    pub region: String,
    pub income_level: String,
    pub appliances_count: u32,
    pub household_size: u32,
    pub budget: f64,
}

impl PredictionRequest {
    pub fn new(inventory: &ApplianceInventory, household: &HouseholdProfile) -> Self {
        let appliances = inventory
            .iter()
            .map(|entry| WireAppliance {
                appliance: entry.name.clone(),
                power: entry.power_watts,
                power_unit: POWER_UNIT_WATTS.to_string(),
                hours: entry.hours_per_day,
                quantity: entry.quantity,
                usage_days_monthly: entry.usage_days_per_month,
            })
            .collect();
        let appliances_count = household
            .declared_appliance_count
            .unwrap_or_else(|| u32::try_from(inventory.len()).unwrap_or(u32::MAX));

        Self {
            appliances,
            household_info: WireHouseholdInfo {
                region: household.region.to_string(),
                income_level: household.income_level.to_string(),
                appliances_count,
                household_size: household.household_size,
                budget: household.monthly_budget,
            },
        }
    }
}

/// `POST /predict` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub total_kwh: f64,
    pub total_bill: f64,
    pub tariff_bracket: String,
    pub budget_status: BudgetStatus,
    pub budget_difference: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub breakdown: Vec<WireBreakdownItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBreakdownItem {
    pub appliance: String,
    pub estimated_kwh: f64,
    pub estimated_bill: f64,
    pub percentage: f64,
    #[serde(default)]
    pub power_watts: f64,
}

impl PredictionResponse {
    /// Converts the service answer into the same shape the local estimator
    /// produces. The total is re-derived from the breakdown and the budget
    /// fields are recomputed locally.
    pub fn into_estimate(
        self,
        household: &HouseholdProfile,
        tariff: &TariffSchedule,
    ) -> Result<EnergyEstimate, PredictionError> {
        let non_negative = |field: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(v)
            } else {
                Err(PredictionError::InconsistentResponse(format!("{field} = {v}")))
            }
        };
        non_negative("total_kwh", self.total_kwh)?;
        let total_bill = non_negative("total_bill", self.total_bill)?;

        let breakdown = self
            .breakdown
            .into_iter()
            .map(|item| {
                Ok(ApplianceBreakdownItem {
                    consumption_kwh: non_negative("breakdown.estimated_kwh", item.estimated_kwh)?,
                    bill_share: non_negative("breakdown.estimated_bill", item.estimated_bill)?,
                    percentage_of_total: non_negative("breakdown.percentage", item.percentage)?
                        .min(100.0),
                    name: item.appliance,
                })
            })
            .collect::<Result<Vec<_>, PredictionError>>()?;

        let total_kwh: f64 = breakdown.iter().map(|b| b.consumption_kwh).sum();
        let tolerance = TOTAL_ABS_TOLERANCE_KWH + TOTAL_REL_TOLERANCE * self.total_kwh;
        if (total_kwh - self.total_kwh).abs() > tolerance {
            return Err(PredictionError::InconsistentResponse(format!(
                "total_kwh {} does not match breakdown sum {total_kwh}",
                self.total_kwh
            )));
        }

        let rate_per_kwh = tariff.rate_for_label(&self.tariff_bracket).unwrap_or(
            if total_kwh > 0.0 { total_bill / total_kwh } else { 0.0 },
        );

        let budget = assess_budget(total_bill, household.monthly_budget)
            .map_err(|e| PredictionError::InconsistentResponse(e.to_string()))?;
        if budget.status != self.budget_status {
            debug!(
                remote = %self.budget_status,
                local = %budget.status,
                remote_difference = self.budget_difference,
                "prediction service budget status disagrees, using local assessment"
            );
        }

        Ok(EnergyEstimate {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            total_consumption_kwh: total_kwh,
            estimated_bill: total_bill,
            tariff_bracket: self.tariff_bracket,
            rate_per_kwh,
            budget_status: budget.status,
            budget_delta: budget.delta,
            breakdown,
            household: household.clone(),
            source: EstimateSource::Remote,
            message: (!self.message.is_empty()).then_some(self.message),
        })
    }
}
