//! Household energy analytics: monthly consumption and bill estimates from an
//! appliance inventory, budget assessment, and population analytics over the
//! collected reports.

pub mod analytics;
pub mod billing;
pub mod config;
pub mod domain;
pub mod error;
pub mod prediction;
pub mod session;
pub mod telemetry;

pub use error::{AnalyticsError, Result};
pub use session::{ReportLog, ReportSnapshot, Session};
