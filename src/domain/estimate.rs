use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use super::HouseholdProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BudgetStatus {
    WithinBudget,
    OverBudget,
}

/// Which path produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EstimateSource {
    Local,
    Remote,
}

/// Per-appliance share of an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceBreakdownItem {
    pub name: String,
    pub consumption_kwh: f64,
    pub bill_share: f64,
    /// Share of the household total, 0..=100.
    pub percentage_of_total: f64,
}

/// Result of one consumption and billing calculation for one household.
///
/// `total_consumption_kwh` is always the sum of the breakdown and
/// `budget_delta` is always `household.monthly_budget - estimated_bill`,
/// whichever path produced the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub total_consumption_kwh: f64,
    pub estimated_bill: f64,
    pub tariff_bracket: String,
    pub rate_per_kwh: f64,
    pub budget_status: BudgetStatus,
    pub budget_delta: f64,
    pub breakdown: Vec<ApplianceBreakdownItem>,
    pub household: HouseholdProfile,
    pub source: EstimateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EnergyEstimate {
    pub fn is_over_budget(&self) -> bool {
        self.budget_status == BudgetStatus::OverBudget
    }

    pub fn appliance_names(&self) -> impl Iterator<Item = &str> {
        self.breakdown.iter().map(|item| item.name.as_str())
    }
}
