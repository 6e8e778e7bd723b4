use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::analytics::SegmentationStrategy;
use crate::billing::TariffSchedule;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub tariff: TariffConfig,
    pub segmentation: SegmentationConfig,
    pub anomaly: AnomalyConfig,
    pub recommendations: RecommendationConfig,
    pub prediction: PredictionConfig,
}

/// Ordered tariff brackets. Rates are local currency per kWh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    pub brackets: Vec<TariffBracketConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffBracketConfig {
    pub label: String,
    /// Inclusive upper bound; `None` marks the open-ended last bracket.
    #[serde(default)]
    pub upper_kwh: Option<f64>,
    pub rate_per_kwh: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            brackets: vec![
                TariffBracketConfig { label: "0-20 kWh".into(), upper_kwh: Some(20.0), rate_per_kwh: 103.0 },
                TariffBracketConfig { label: "21-50 kWh".into(), upper_kwh: Some(50.0), rate_per_kwh: 141.0 },
                TariffBracketConfig { label: "50+ kWh".into(), upper_kwh: None, rate_per_kwh: 171.0 },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub strategy: SegmentationStrategy,
    pub low_upper_kwh: f64,
    pub high_lower_kwh: f64,
    pub max_iterations: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            strategy: SegmentationStrategy::FixedThresholds,
            low_upper_kwh: 30.0,
            high_lower_kwh: 80.0,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Number of standard deviations above the mean before a report is flagged.
    pub std_dev_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { std_dev_multiplier: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub high_consumption_kwh: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { high_consumption_kwh: 100.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    pub enabled: bool,
    pub base_url: String,
    pub http_timeout_seconds: u64,
    pub check_health: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://127.0.0.1:8000".into(),
            http_timeout_seconds: 10,
            check_health: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("HEA__").split("__"));
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        TariffSchedule::from_config(&self.tariff)?;

        let seg = &self.segmentation;
        if !seg.low_upper_kwh.is_finite()
            || !seg.high_lower_kwh.is_finite()
            || seg.low_upper_kwh < 0.0
            || seg.low_upper_kwh > seg.high_lower_kwh
        {
            anyhow::bail!(
                "segmentation thresholds must satisfy 0 <= low_upper_kwh ({}) <= high_lower_kwh ({})",
                seg.low_upper_kwh,
                seg.high_lower_kwh
            );
        }

        let k = self.anomaly.std_dev_multiplier;
        if !k.is_finite() || k < 0.0 {
            anyhow::bail!("anomaly.std_dev_multiplier must be a finite non-negative number, got {k}");
        }

        if self.prediction.enabled && self.prediction.http_timeout_seconds == 0 {
            anyhow::bail!("prediction.http_timeout_seconds must be > 0 when the service is enabled");
        }
        Ok(())
    }
}
