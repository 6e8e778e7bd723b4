pub mod aggregate;
pub mod anomaly;
pub mod segmentation;
pub mod stats;

pub use aggregate::*;
pub use anomaly::*;
pub use segmentation::*;
pub use stats::*;

use serde::Serialize;

/// Segmentation and anomaly detection need at least this many reports.
pub const MIN_REPORTS_FOR_ANALYSIS: usize = 3;

/// Outcome of an analysis that needs a minimum number of reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Analysis<T> {
    Computed(T),
    InsufficientData { required: usize, available: usize },
}

impl<T> Analysis<T> {
    /// Runs `compute` only when `available` meets the minimum.
    pub fn gate(available: usize, compute: impl FnOnce() -> T) -> Self {
        if available < MIN_REPORTS_FOR_ANALYSIS {
            Analysis::InsufficientData {
                required: MIN_REPORTS_FOR_ANALYSIS,
                available,
            }
        } else {
            Analysis::Computed(compute())
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Analysis::Computed(_))
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            Analysis::Computed(value) => Some(value),
            Analysis::InsufficientData { .. } => None,
        }
    }

    pub fn into_computed(self) -> Option<T> {
        match self {
            Analysis::Computed(value) => Some(value),
            Analysis::InsufficientData { .. } => None,
        }
    }
}
