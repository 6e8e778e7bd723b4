use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{assess_budget, monthly_kwh, TariffSchedule};
use crate::domain::{
    ApplianceBreakdownItem, ApplianceInventory, EnergyEstimate, EstimateSource, HouseholdProfile,
};
use crate::error::{AnalyticsError, Result};

/// Deterministic, synchronous estimator used whenever the prediction service
/// is disabled or unavailable.
#[derive(Debug, Clone, Default)]
pub struct LocalEstimator {
    tariff: TariffSchedule,
}

impl LocalEstimator {
    pub fn new(tariff: TariffSchedule) -> Self {
        Self { tariff }
    }

    pub fn tariff(&self) -> &TariffSchedule {
        &self.tariff
    }

    /// Rejects a request before any path tries to estimate it.
    pub fn check_request(
        &self,
        inventory: &ApplianceInventory,
        household: &HouseholdProfile,
    ) -> Result<()> {
        if inventory.is_empty() {
            return Err(AnalyticsError::invalid("inventory must contain at least one appliance"));
        }
        for entry in inventory.iter() {
            entry.check()?;
        }
        household.check()
    }

    pub fn estimate(
        &self,
        inventory: &ApplianceInventory,
        household: &HouseholdProfile,
    ) -> Result<EnergyEstimate> {
        self.check_request(inventory, household)?;

        let per_appliance = inventory
            .iter()
            .map(|entry| Ok((entry.name.clone(), monthly_kwh(entry)?)))
            .collect::<Result<Vec<_>>>()?;
        let total_kwh: f64 = per_appliance.iter().map(|(_, kwh)| kwh).sum();

        let bracket = self.tariff.classify(total_kwh);
        let rate = bracket.rate_per_kwh;
        let bill = total_kwh * rate;

        let breakdown = per_appliance
            .into_iter()
            .map(|(name, kwh)| ApplianceBreakdownItem {
                name,
                consumption_kwh: kwh,
                bill_share: kwh * rate,
                percentage_of_total: if total_kwh > 0.0 { kwh / total_kwh * 100.0 } else { 0.0 },
            })
            .collect();

        let budget = assess_budget(bill, household.monthly_budget)?;

        info!(
            total_kwh,
            bill,
            bracket = %bracket.label,
            budget_status = %budget.status,
            appliances = inventory.len(),
            "local estimate produced"
        );

        Ok(EnergyEstimate {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            total_consumption_kwh: total_kwh,
            estimated_bill: bill,
            tariff_bracket: bracket.label.clone(),
            rate_per_kwh: rate,
            budget_status: budget.status,
            budget_delta: budget.delta,
            breakdown,
            household: household.clone(),
            source: EstimateSource::Local,
            message: None,
        })
    }
}
