use serde::{Deserialize, Serialize};

use crate::config::RecommendationConfig;
use crate::domain::EnergyEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Warning,
    Tip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub text: String,
}

impl Recommendation {
    fn warning(text: impl Into<String>) -> Self {
        Self { kind: RecommendationKind::Warning, text: text.into() }
    }

    fn tip(text: impl Into<String>) -> Self {
        Self { kind: RecommendationKind::Tip, text: text.into() }
    }
}

/// Savings advice attached to an estimate.
#[derive(Debug, Clone)]
pub struct Recommender {
    high_consumption_kwh: f64,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::from_config(&RecommendationConfig::default())
    }
}

impl Recommender {
    pub fn from_config(cfg: &RecommendationConfig) -> Self {
        Self { high_consumption_kwh: cfg.high_consumption_kwh }
    }

    pub fn for_estimate(&self, estimate: &EnergyEstimate) -> Vec<Recommendation> {
        let mut out = Vec::with_capacity(3);

        if estimate.total_consumption_kwh > self.high_consumption_kwh {
            let top = estimate
                .breakdown
                .iter()
                .max_by(|a, b| a.consumption_kwh.total_cmp(&b.consumption_kwh))
                .map(|item| item.name.as_str())
                .unwrap_or("high-power appliances");
            out.push(Recommendation::warning(format!(
                "High consumption of {:.2} kWh/month. Cutting daily use of {top} by two hours is the quickest saving.",
                estimate.total_consumption_kwh
            )));
        }

        out.push(Recommendation::tip(
            "LED bulbs use up to 75% less energy than incandescent lighting.",
        ));

        if estimate.is_over_budget() {
            out.push(Recommendation::warning(format!(
                "Estimated bill exceeds the monthly budget by {:.2}. Shift high-power appliances away from peak hours.",
                -estimate.budget_delta
            )));
        }

        out
    }
}
