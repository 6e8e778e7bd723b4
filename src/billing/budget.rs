use serde::{Deserialize, Serialize};

use crate::domain::BudgetStatus;
use crate::error::{AnalyticsError, Result};

/// Comparison of an estimated bill against the declared monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetAssessment {
    pub status: BudgetStatus,
    /// `budget - bill`; negative when over budget.
    pub delta: f64,
    /// Share of the budget consumed by the bill, capped at 100.
    pub utilization_percent: f64,
}

impl BudgetAssessment {
    /// Amount left over, or zero when the budget is exceeded.
    pub fn savings(&self) -> f64 {
        self.delta.max(0.0)
    }

    /// Amount by which the budget is exceeded, or zero.
    pub fn overrun(&self) -> f64 {
        (-self.delta).max(0.0)
    }
}

pub fn assess_budget(estimated_bill: f64, monthly_budget: f64) -> Result<BudgetAssessment> {
    if !monthly_budget.is_finite() || monthly_budget < 0.0 {
        return Err(AnalyticsError::invalid(format!(
            "monthly budget must be a finite non-negative amount, got {monthly_budget}"
        )));
    }
    if !estimated_bill.is_finite() || estimated_bill < 0.0 {
        return Err(AnalyticsError::invalid(format!(
            "estimated bill must be a finite non-negative amount, got {estimated_bill}"
        )));
    }

    let delta = monthly_budget - estimated_bill;
    let status = if delta < 0.0 {
        BudgetStatus::OverBudget
    } else {
        BudgetStatus::WithinBudget
    };
    let utilization_percent = if monthly_budget > 0.0 {
        (estimated_bill / monthly_budget * 100.0).min(100.0)
    } else if estimated_bill > 0.0 {
        100.0
    } else {
        0.0
    };

    Ok(BudgetAssessment { status, delta, utilization_percent })
}
