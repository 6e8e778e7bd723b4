use serde::Serialize;
use tracing::debug;

use super::{mean_std_dev, Analysis};
use crate::config::AnomalyConfig;
use crate::domain::EnergyEstimate;
use crate::error::{AnalyticsError, Result};

/// Relative spread below which a collection counts as having no variance.
const ZERO_VARIANCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFlag<'a> {
    pub report: &'a EnergyEstimate,
    /// `consumption - mean`, always positive for a flagged report.
    pub deviation_from_mean: f64,
    pub threshold_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport<'a> {
    pub mean_kwh: f64,
    pub std_dev_kwh: f64,
    pub std_dev_multiplier: f64,
    pub threshold_kwh: f64,
    /// Flagged reports in collection order.
    pub flags: Vec<AnomalyFlag<'a>>,
}

/// Flags reports whose consumption exceeds `mean + k * std_dev`.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    std_dev_multiplier: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self { std_dev_multiplier: AnomalyConfig::default().std_dev_multiplier }
    }
}

impl AnomalyDetector {
    pub fn new(std_dev_multiplier: f64) -> Result<Self> {
        if !std_dev_multiplier.is_finite() || std_dev_multiplier < 0.0 {
            return Err(AnalyticsError::invalid(format!(
                "standard deviation multiplier must be finite and >= 0, got {std_dev_multiplier}"
            )));
        }
        Ok(Self { std_dev_multiplier })
    }

    pub fn from_config(cfg: &AnomalyConfig) -> Result<Self> {
        Self::new(cfg.std_dev_multiplier)
    }

    pub fn std_dev_multiplier(&self) -> f64 {
        self.std_dev_multiplier
    }

    pub fn detect<'a>(&self, reports: &'a [EnergyEstimate]) -> Analysis<AnomalyReport<'a>> {
        Analysis::gate(reports.len(), || {
            let values: Vec<f64> = reports.iter().map(|r| r.total_consumption_kwh).collect();
            let (mean, std_dev) = mean_std_dev(&values).unwrap_or((0.0, 0.0));
            let threshold = mean + self.std_dev_multiplier * std_dev;

            // Identical consumptions would otherwise all sit on the threshold.
            let flags = if std_dev <= ZERO_VARIANCE_EPSILON * mean.abs().max(1.0) {
                Vec::new()
            } else {
                reports
                    .iter()
                    .filter(|r| r.total_consumption_kwh > threshold)
                    .map(|r| AnomalyFlag {
                        report: r,
                        deviation_from_mean: r.total_consumption_kwh - mean,
                        threshold_kwh: threshold,
                    })
                    .collect()
            };

            debug!(
                reports = reports.len(),
                mean_kwh = mean,
                std_dev_kwh = std_dev,
                threshold_kwh = threshold,
                flagged = flags.len(),
                "anomaly detection complete"
            );

            AnomalyReport {
                mean_kwh: mean,
                std_dev_kwh: std_dev,
                std_dev_multiplier: self.std_dev_multiplier,
                threshold_kwh: threshold,
                flags,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::reports;

    #[test]
    fn test_visual_outlier_below_two_sigma() {
        let reps = reports(&[10.0, 40.0, 200.0]);
        let result = AnomalyDetector::default().detect(&reps).into_computed().unwrap();
        assert!((result.mean_kwh - 83.333_333).abs() < 1e-3);
        assert!((result.std_dev_kwh - 83.4).abs() < 0.1);
        assert!(result.threshold_kwh > 200.0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_flags_clear_outlier() {
        let mut values = vec![20.0; 9];
        values.push(500.0);
        let reps = reports(&values);
        let result = AnomalyDetector::default().detect(&reps).into_computed().unwrap();
        assert_eq!(result.flags.len(), 1);
        let flag = &result.flags[0];
        assert_eq!(flag.report.total_consumption_kwh, 500.0);
        assert!((flag.deviation_from_mean - 432.0).abs() < 1e-9);
        assert_eq!(flag.threshold_kwh, result.threshold_kwh);
    }

    #[test]
    fn test_flags_keep_collection_order() {
        let reps = reports(&[300.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 280.0]);
        let result = AnomalyDetector::new(1.0).unwrap().detect(&reps).into_computed().unwrap();
        let flagged: Vec<f64> = result.flags.iter().map(|f| f.report.total_consumption_kwh).collect();
        assert_eq!(flagged, vec![300.0, 280.0]);
    }

    #[test]
    fn test_zero_variance_flags_nothing() {
        let reps = reports(&[55.0, 55.0, 55.0, 55.0]);
        for k in [0.0, 1.0, 2.0] {
            let result = AnomalyDetector::new(k).unwrap().detect(&reps).into_computed().unwrap();
            assert!(result.flags.is_empty());
        }
    }

    #[test]
    fn test_insufficient_data() {
        let reps = reports(&[1.0, 1000.0]);
        assert_eq!(
            AnomalyDetector::default().detect(&reps),
            Analysis::InsufficientData { required: 3, available: 2 }
        );
    }

    #[test]
    fn test_invalid_multiplier() {
        assert!(AnomalyDetector::new(-0.5).is_err());
        assert!(AnomalyDetector::new(f64::NAN).is_err());
        assert!(AnomalyDetector::from_config(&AnomalyConfig { std_dev_multiplier: 3.0 }).is_ok());
    }
}
