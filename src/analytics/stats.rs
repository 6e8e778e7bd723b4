use serde::Serialize;

use crate::domain::EnergyEstimate;

/// Population mean and standard deviation. `None` for an empty slice.
pub fn mean_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// `sum / count`, or 0 when `count` is 0.
pub fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Headline figures for the analysis dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_reports: usize,
    pub total_consumption_kwh: f64,
    pub average_consumption_kwh: f64,
    pub total_bill: f64,
    pub average_bill: f64,
    pub over_budget_reports: usize,
}

impl ReportSummary {
    pub fn from_reports(reports: &[EnergyEstimate]) -> Self {
        let total_consumption_kwh: f64 = reports.iter().map(|r| r.total_consumption_kwh).sum();
        let total_bill: f64 = reports.iter().map(|r| r.estimated_bill).sum();
        Self {
            total_reports: reports.len(),
            total_consumption_kwh,
            average_consumption_kwh: average(total_consumption_kwh, reports.len()),
            total_bill,
            average_bill: average(total_bill, reports.len()),
            over_budget_reports: reports.iter().filter(|r| r.is_over_budget()).count(),
        }
    }
}
