//! Distribution tables and trend series for the analysis dashboards.
//!
//! Every table lists categories in the order they first appear in the report
//! collection, and every function returns an empty table for no reports.

use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

use super::{average, ReportSummary};
use crate::domain::EnergyEstimate;

const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub category: String,
    pub report_count: usize,
    pub average_consumption_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplianceUsage {
    pub appliance: String,
    /// Reports listing the appliance at least once.
    pub report_count: usize,
    /// `report_count / total reports * 100`.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// 1-based position in the report collection.
    pub index: usize,
    pub consumption_kwh: f64,
    pub bill: f64,
}

/// Accumulates per-category values while keeping first-seen order.
struct OrderedTally<T> {
    index: HashMap<String, usize>,
    entries: Vec<(String, T)>,
}

impl<T: Default> OrderedTally<T> {
    fn new() -> Self {
        Self { index: HashMap::new(), entries: Vec::new() }
    }

    fn entry(&mut self, category: &str) -> &mut T {
        let idx = match self.index.get(category) {
            Some(&idx) => idx,
            None => {
                self.entries.push((category.to_string(), T::default()));
                self.index.insert(category.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(String, T)> {
        self.entries
    }
}

fn category_or_unknown(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNKNOWN_CATEGORY
    } else {
        trimmed
    }
}

fn count_by<'r>(
    reports: &'r [EnergyEstimate],
    key: impl Fn(&'r EnergyEstimate) -> String,
) -> Vec<CategoryCount> {
    let mut tally = OrderedTally::<usize>::new();
    for report in reports {
        let category = key(report);
        *tally.entry(category_or_unknown(&category)) += 1;
    }
    tally
        .into_entries()
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

/// Reports per household region. Unrecognised regions count as "Unknown".
pub fn region_distribution(reports: &[EnergyEstimate]) -> Vec<CategoryCount> {
    count_by(reports, |r| r.household.region.to_string())
}

pub fn tariff_distribution(reports: &[EnergyEstimate]) -> Vec<CategoryCount> {
    count_by(reports, |r| r.tariff_bracket.clone())
}

pub fn income_average_consumption(reports: &[EnergyEstimate]) -> Vec<CategoryAverage> {
    let mut tally = OrderedTally::<(f64, usize)>::new();
    for report in reports {
        let slot = tally.entry(&report.household.income_level.to_string());
        slot.0 += report.total_consumption_kwh;
        slot.1 += 1;
    }
    tally
        .into_entries()
        .into_iter()
        .map(|(category, (sum, count))| CategoryAverage {
            category,
            report_count: count,
            average_consumption_kwh: average(sum, count),
        })
        .collect()
}

/// How many reports include each appliance, most common first. Ties keep
/// first-seen order.
pub fn appliance_usage_frequency(reports: &[EnergyEstimate]) -> Vec<ApplianceUsage> {
    let mut tally = OrderedTally::<usize>::new();
    for report in reports {
        for name in report.appliance_names().map(category_or_unknown).unique() {
            *tally.entry(name) += 1;
        }
    }
    let total = reports.len();
    tally
        .into_entries()
        .into_iter()
        .map(|(appliance, report_count)| ApplianceUsage {
            appliance,
            report_count,
            percentage: average(report_count as f64 * 100.0, total),
        })
        .sorted_by(|a, b| b.report_count.cmp(&a.report_count))
        .collect()
}

/// Consumption and bill per report in insertion order.
pub fn consumption_trend(reports: &[EnergyEstimate]) -> Vec<TrendPoint> {
    reports
        .iter()
        .enumerate()
        .map(|(i, r)| TrendPoint {
            index: i + 1,
            consumption_kwh: r.total_consumption_kwh,
            bill: r.estimated_bill,
        })
        .collect()
}

/// Everything the analysis dashboard charts, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: ReportSummary,
    pub by_region: Vec<CategoryCount>,
    pub by_tariff: Vec<CategoryCount>,
    pub income_average_consumption: Vec<CategoryAverage>,
    pub appliance_usage: Vec<ApplianceUsage>,
    pub trend: Vec<TrendPoint>,
}

impl Dashboard {
    pub fn build(reports: &[EnergyEstimate]) -> Self {
        Self {
            summary: ReportSummary::from_reports(reports),
            by_region: region_distribution(reports),
            by_tariff: tariff_distribution(reports),
            income_average_consumption: income_average_consumption(reports),
            appliance_usage: appliance_usage_frequency(reports),
            trend: consumption_trend(reports),
        }
    }
}
