use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{TariffBracketConfig, TariffConfig};
use crate::error::{AnalyticsError, Result};

/// A named consumption range billed at a flat per-kWh rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffBracket {
    pub label: String,
    /// Inclusive upper bound in kWh; `None` for the open-ended last bracket.
    pub upper_kwh: Option<f64>,
    pub rate_per_kwh: f64,
}

impl TariffBracket {
    pub fn contains(&self, total_kwh: f64) -> bool {
        self.upper_kwh.map_or(true, |upper| total_kwh <= upper)
    }
}

/// Ordered, contiguous tariff brackets covering `[0, +inf)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffSchedule {
    brackets: Vec<TariffBracket>,
}

impl TariffSchedule {
    pub fn from_config(cfg: &TariffConfig) -> Result<Self> {
        Self::new(cfg.brackets.iter().map(TariffBracket::from).collect())
    }

    pub fn new(brackets: Vec<TariffBracket>) -> Result<Self> {
        let Some((last, bounded)) = brackets.split_last() else {
            return Err(AnalyticsError::invalid("tariff schedule needs at least one bracket"));
        };
        if last.upper_kwh.is_some() {
            return Err(AnalyticsError::invalid(format!(
                "last tariff bracket '{}' must be open-ended",
                last.label
            )));
        }

        let mut previous = f64::NEG_INFINITY;
        for bracket in bounded {
            let Some(upper) = bracket.upper_kwh else {
                return Err(AnalyticsError::invalid(format!(
                    "only the last tariff bracket may be open-ended, '{}' is not last",
                    bracket.label
                )));
            };
            if !upper.is_finite() || upper < 0.0 || upper <= previous {
                return Err(AnalyticsError::invalid(format!(
                    "tariff bracket '{}' upper bound {upper} must be finite, non-negative and ascending",
                    bracket.label
                )));
            }
            previous = upper;
        }

        if let Some(bad) = brackets
            .iter()
            .find(|b| !b.rate_per_kwh.is_finite() || b.rate_per_kwh < 0.0)
        {
            return Err(AnalyticsError::invalid(format!(
                "tariff bracket '{}' has invalid rate {}",
                bad.label, bad.rate_per_kwh
            )));
        }

        Ok(Self { brackets })
    }

    /// Picks the bracket for a monthly total. Total over every input: the last
    /// bracket is open-ended.
    pub fn classify(&self, total_kwh: f64) -> &TariffBracket {
        let bracket = self
            .brackets
            .iter()
            .find(|b| b.contains(total_kwh))
            .unwrap_or_else(|| &self.brackets[self.brackets.len() - 1]);
        debug!(total_kwh, bracket = %bracket.label, rate = bracket.rate_per_kwh, "tariff classified");
        bracket
    }

    pub fn rate_for_label(&self, label: &str) -> Option<f64> {
        self.brackets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.rate_per_kwh)
    }

    pub fn brackets(&self) -> &[TariffBracket] {
        &self.brackets
    }
}

impl Default for TariffSchedule {
    fn default() -> Self {
        Self {
            brackets: TariffConfig::default().brackets.iter().map(TariffBracket::from).collect(),
        }
    }
}

impl From<&TariffBracketConfig> for TariffBracket {
    fn from(cfg: &TariffBracketConfig) -> Self {
        Self {
            label: cfg.label.clone(),
            upper_kwh: cfg.upper_kwh,
            rate_per_kwh: cfg.rate_per_kwh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bracket(label: &str, upper: Option<f64>, rate: f64) -> TariffBracket {
        TariffBracket { label: label.into(), upper_kwh: upper, rate_per_kwh: rate }
    }

    #[rstest]
    #[case(0.0, "0-20 kWh", 103.0)]
    #[case(20.0, "0-20 kWh", 103.0)]
    #[case(20.0001, "21-50 kWh", 141.0)]
    #[case(36.0, "21-50 kWh", 141.0)]
    #[case(50.0, "21-50 kWh", 141.0)]
    #[case(50.0001, "50+ kWh", 171.0)]
    #[case(10_000.0, "50+ kWh", 171.0)]
    fn test_default_brackets(#[case] total: f64, #[case] label: &str, #[case] rate: f64) {
        let schedule = TariffSchedule::default();
        let b = schedule.classify(total);
        assert_eq!(b.label, label);
        assert_eq!(b.rate_per_kwh, rate);
    }

    #[test]
    fn test_boundary_splits_brackets() {
        let schedule = TariffSchedule::default();
        assert_ne!(schedule.classify(20.0).label, schedule.classify(20.0001).label);
        assert_ne!(schedule.classify(50.0).label, schedule.classify(50.0001).label);
    }

    #[test]
    fn test_default_matches_config_default() {
        let from_cfg = TariffSchedule::from_config(&TariffConfig::default()).unwrap();
        assert_eq!(from_cfg, TariffSchedule::default());
    }

    #[test]
    fn test_recalibrated_rates() {
        let schedule = TariffSchedule::new(vec![
            bracket("lifeline", Some(15.0), 89.0),
            bracket("standard", None, 212.0),
        ])
        .unwrap();
        assert_eq!(schedule.classify(15.0).rate_per_kwh, 89.0);
        assert_eq!(schedule.classify(15.5).rate_per_kwh, 212.0);
        assert_eq!(schedule.rate_for_label("standard"), Some(212.0));
        assert_eq!(schedule.rate_for_label("missing"), None);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![bracket("a", Some(20.0), 1.0)])]
    #[case(vec![bracket("a", None, 1.0), bracket("b", None, 2.0)])]
    #[case(vec![bracket("a", Some(50.0), 1.0), bracket("b", Some(20.0), 2.0), bracket("c", None, 3.0)])]
    #[case(vec![bracket("a", Some(20.0), 1.0), bracket("b", Some(20.0), 2.0), bracket("c", None, 3.0)])]
    #[case(vec![bracket("a", Some(20.0), -1.0), bracket("b", None, 2.0)])]
    #[case(vec![bracket("a", Some(f64::NAN), 1.0), bracket("b", None, 2.0)])]
    fn test_invalid_schedules(#[case] brackets: Vec<TariffBracket>) {
        assert!(matches!(
            TariffSchedule::new(brackets),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }
}
