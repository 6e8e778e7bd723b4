//! The analysis session: estimation front door plus the append-only log of
//! every report produced so far.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::analytics::{
    Analysis, AnomalyDetector, AnomalyReport, Dashboard, Segmentation, Segmenter,
};
use crate::billing::{EstimateOutcome, EstimationEngine, Recommendation, Recommender};
use crate::config::Config;
use crate::domain::{ApplianceInventory, EnergyEstimate, HouseholdProfile};
use crate::error::Result;

/// Append-only report collection shared by every view of a session.
#[derive(Debug, Default, Clone)]
pub struct ReportLog {
    reports: Arc<RwLock<Vec<EnergyEstimate>>>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a report and returns the new collection size.
    pub fn append(&self, report: EnergyEstimate) -> usize {
        let mut reports = self.reports.write();
        reports.push(report);
        reports.len()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    /// Copy of the collection as of now, in insertion order.
    pub fn to_vec(&self) -> Vec<EnergyEstimate> {
        self.reports.read().clone()
    }
}

/// Frozen copy of the report log. All analyses computed from one snapshot
/// see the same collection.
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    reports: Vec<EnergyEstimate>,
    segmenter: Segmenter,
    detector: AnomalyDetector,
}

impl ReportSnapshot {
    pub fn reports(&self) -> &[EnergyEstimate] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn segment(&self) -> Analysis<Segmentation<'_>> {
        self.segmenter.segment(&self.reports)
    }

    pub fn detect_anomalies(&self) -> Analysis<AnomalyReport<'_>> {
        self.detector.detect(&self.reports)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::build(&self.reports)
    }
}

pub struct Session {
    engine: EstimationEngine,
    segmenter: Segmenter,
    detector: AnomalyDetector,
    recommender: Recommender,
    log: ReportLog,
}

impl Session {
    pub fn new(
        engine: EstimationEngine,
        segmenter: Segmenter,
        detector: AnomalyDetector,
        recommender: Recommender,
    ) -> Self {
        Self {
            engine,
            segmenter,
            detector,
            recommender,
            log: ReportLog::new(),
        }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            EstimationEngine::from_config(cfg)?,
            Segmenter::from_config(&cfg.segmentation)?,
            AnomalyDetector::from_config(&cfg.anomaly)?,
            Recommender::from_config(&cfg.recommendations),
        ))
    }

    pub fn engine(&self) -> &EstimationEngine {
        &self.engine
    }

    pub fn log(&self) -> &ReportLog {
        &self.log
    }

    /// Estimates the household's month and records the result. Rejected
    /// input leaves the log untouched.
    #[instrument(skip_all, fields(appliances = inventory.len(), region = %household.region))]
    pub async fn submit(
        &self,
        inventory: &ApplianceInventory,
        household: &HouseholdProfile,
    ) -> Result<EstimateOutcome> {
        let outcome = self.engine.estimate(inventory, household).await?;
        let total_reports = self.log.append(outcome.estimate.clone());
        info!(
            report_id = %outcome.estimate.id,
            total_kwh = outcome.estimate.total_consumption_kwh,
            budget_status = %outcome.estimate.budget_status,
            total_reports,
            "report recorded"
        );
        Ok(outcome)
    }

    pub fn recommendations(&self, estimate: &EnergyEstimate) -> Vec<Recommendation> {
        self.recommender.for_estimate(estimate)
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            reports: self.log.to_vec(),
            segmenter: self.segmenter.clone(),
            detector: self.detector.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(
            EstimationEngine::local_only(Default::default()),
            Segmenter::default(),
            AnomalyDetector::default(),
            Recommender::default(),
        )
    }
}
