//! Household segmentation by monthly consumption.
//!
//! Every strategy reduces to a pair of tier boundaries, so the output is
//! always three segments (Low, Medium, High) that partition `[0, +inf)`:
//!
//! - Low: `kwh < low_upper`
//! - Medium: `low_upper <= kwh <= high_lower`
//! - High: `kwh > high_lower`
//!
//! `FixedThresholds` uses configured boundaries. `KMeans` runs Lloyd's
//! algorithm with k = 3 on the consumption values and places the boundaries
//! halfway between adjacent centroids.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use super::{average, Analysis};
use crate::config::SegmentationConfig;
use crate::domain::EnergyEstimate;
use crate::error::{AnalyticsError, Result};

const CONVERGENCE_KWH: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStrategy {
    #[default]
    FixedThresholds,
    KMeans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentTier {
    Low,
    Medium,
    High,
}

impl SegmentTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Consumption",
            Self::Medium => "Medium Consumption",
            Self::High => "High Consumption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierBoundaries {
    pub low_upper_kwh: f64,
    pub high_lower_kwh: f64,
}

impl TierBoundaries {
    pub fn new(low_upper_kwh: f64, high_lower_kwh: f64) -> Result<Self> {
        if !low_upper_kwh.is_finite()
            || !high_lower_kwh.is_finite()
            || low_upper_kwh < 0.0
            || low_upper_kwh > high_lower_kwh
        {
            return Err(AnalyticsError::invalid(format!(
                "segment boundaries must satisfy 0 <= {low_upper_kwh} <= {high_lower_kwh}"
            )));
        }
        Ok(Self { low_upper_kwh, high_lower_kwh })
    }

    pub fn tier_of(&self, kwh: f64) -> SegmentTier {
        if kwh < self.low_upper_kwh {
            SegmentTier::Low
        } else if kwh <= self.high_lower_kwh {
            SegmentTier::Medium
        } else {
            SegmentTier::High
        }
    }
}

impl Default for TierBoundaries {
    fn default() -> Self {
        Self { low_upper_kwh: 30.0, high_lower_kwh: 80.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment<'a> {
    pub tier: SegmentTier,
    pub label: &'static str,
    pub lower_bound_kwh: f64,
    pub lower_inclusive: bool,
    /// `None` for the open-ended High tier.
    pub upper_bound_kwh: Option<f64>,
    pub upper_inclusive: bool,
    pub members: Vec<&'a EnergyEstimate>,
    /// 0 for an empty segment.
    pub average_consumption_kwh: f64,
}

impl Segment<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation<'a> {
    pub strategy: SegmentationStrategy,
    pub boundaries: TierBoundaries,
    /// Always Low, Medium, High in that order.
    pub segments: Vec<Segment<'a>>,
}

impl<'a> Segmentation<'a> {
    pub fn segment(&self, tier: SegmentTier) -> &Segment<'a> {
        let idx = match tier {
            SegmentTier::Low => 0,
            SegmentTier::Medium => 1,
            SegmentTier::High => 2,
        };
        &self.segments[idx]
    }
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    strategy: SegmentationStrategy,
    fixed: TierBoundaries,
    max_iterations: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            strategy: SegmentationStrategy::FixedThresholds,
            fixed: TierBoundaries::default(),
            max_iterations: 100,
        }
    }
}

impl Segmenter {
    pub fn from_config(cfg: &SegmentationConfig) -> Result<Self> {
        Ok(Self {
            strategy: cfg.strategy,
            fixed: TierBoundaries::new(cfg.low_upper_kwh, cfg.high_lower_kwh)?,
            max_iterations: cfg.max_iterations.max(1),
        })
    }

    pub fn with_strategy(mut self, strategy: SegmentationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn segment<'a>(&self, reports: &'a [EnergyEstimate]) -> Analysis<Segmentation<'a>> {
        Analysis::gate(reports.len(), || {
            let boundaries = match self.strategy {
                SegmentationStrategy::FixedThresholds => self.fixed,
                SegmentationStrategy::KMeans => {
                    let values: Vec<f64> =
                        reports.iter().map(|r| r.total_consumption_kwh).collect();
                    kmeans_boundaries(&values, self.max_iterations)
                }
            };
            let segmentation = partition(reports, self.strategy, boundaries);
            debug!(
                strategy = ?self.strategy,
                low_upper_kwh = boundaries.low_upper_kwh,
                high_lower_kwh = boundaries.high_lower_kwh,
                low = segmentation.segments[0].len(),
                medium = segmentation.segments[1].len(),
                high = segmentation.segments[2].len(),
                "segmentation complete"
            );
            segmentation
        })
    }
}

fn partition<'a>(
    reports: &'a [EnergyEstimate],
    strategy: SegmentationStrategy,
    boundaries: TierBoundaries,
) -> Segmentation<'a> {
    let mut members: [Vec<&'a EnergyEstimate>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for report in reports {
        let idx = match boundaries.tier_of(report.total_consumption_kwh) {
            SegmentTier::Low => 0,
            SegmentTier::Medium => 1,
            SegmentTier::High => 2,
        };
        members[idx].push(report);
    }

    let [low, medium, high] = members;
    let build = |tier: SegmentTier,
                 lower: f64,
                 lower_inclusive: bool,
                 upper: Option<f64>,
                 upper_inclusive: bool,
                 members: Vec<&'a EnergyEstimate>| {
        let sum: f64 = members.iter().map(|r| r.total_consumption_kwh).sum();
        Segment {
            tier,
            label: tier.label(),
            lower_bound_kwh: lower,
            lower_inclusive,
            upper_bound_kwh: upper,
            upper_inclusive,
            average_consumption_kwh: average(sum, members.len()),
            members,
        }
    };

    Segmentation {
        strategy,
        boundaries,
        segments: vec![
            build(SegmentTier::Low, 0.0, true, Some(boundaries.low_upper_kwh), false, low),
            build(
                SegmentTier::Medium,
                boundaries.low_upper_kwh,
                true,
                Some(boundaries.high_lower_kwh),
                true,
                medium,
            ),
            build(SegmentTier::High, boundaries.high_lower_kwh, false, None, false, high),
        ],
    }
}

/// One-dimensional k-means with k = 3, seeded at the minimum, median and
/// maximum. Deterministic for a given input.
fn kmeans_boundaries(values: &[f64], max_iterations: usize) -> TierBoundaries {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let Some((&first, &last)) = sorted.first().zip(sorted.last()) else {
        return TierBoundaries::default();
    };
    let mut centroids = [first, sorted[sorted.len() / 2], last];

    for _ in 0..max_iterations {
        let mut sums = [0.0f64; 3];
        let mut counts = [0usize; 3];
        for &v in &sorted {
            let idx = nearest_centroid(&centroids, v);
            sums[idx] += v;
            counts[idx] += 1;
        }

        let mut shift = 0.0f64;
        for i in 0..3 {
            // An empty cluster keeps its previous centroid.
            if counts[i] > 0 {
                let next = sums[i] / counts[i] as f64;
                shift = shift.max((next - centroids[i]).abs());
                centroids[i] = next;
            }
        }
        if shift < CONVERGENCE_KWH {
            break;
        }
    }

    centroids.sort_by(f64::total_cmp);
    TierBoundaries {
        low_upper_kwh: ((centroids[0] + centroids[1]) / 2.0).max(0.0),
        high_lower_kwh: ((centroids[1] + centroids[2]) / 2.0).max(0.0),
    }
}

fn nearest_centroid(centroids: &[f64; 3], value: f64) -> usize {
    let mut best = 0;
    for i in 1..3 {
        if (value - centroids[i]).abs() < (value - centroids[best]).abs() {
            best = i;
        }
    }
    best
}
