use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

use super::{parse_field, require_finite};
use crate::error::{AnalyticsError, Result};

/// Service regions a household can be registered in.
///
/// Stored reports may carry a region string this build does not know; those
/// deserialize to [`Region::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(from = "String", into = "String")]
pub enum Region {
    Kigali,
    Eastern,
    Western,
    Northern,
    Southern,
    Unknown,
}

impl From<String> for Region {
    fn from(s: String) -> Self {
        s.trim().parse().unwrap_or(Region::Unknown)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum IncomeLevel {
    Low,
    Medium,
    High,
}

/// Household details supplied with every estimate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct HouseholdProfile {
    pub region: Region,
    pub income_level: IncomeLevel,
    #[validate(range(min = 1, message = "household size must be at least 1"))]
    pub household_size: u32,
    #[validate(range(min = 0.0, message = "monthly budget must not be negative"))]
    pub monthly_budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_appliance_count: Option<u32>,
}

impl HouseholdProfile {
    pub fn new(
        region: Region,
        income_level: IncomeLevel,
        household_size: u32,
        monthly_budget: f64,
    ) -> Result<Self> {
        let profile = Self {
            region,
            income_level,
            household_size,
            monthly_budget,
            declared_appliance_count: None,
        };
        profile.check()?;
        Ok(profile)
    }

    pub fn with_declared_appliance_count(mut self, count: u32) -> Self {
        self.declared_appliance_count = Some(count);
        self
    }

    pub fn check(&self) -> Result<()> {
        require_finite("monthly_budget", self.monthly_budget)?;
        self.validate()?;
        Ok(())
    }
}

/// Raw household fields as typed into a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseholdForm {
    pub region: String,
    pub income_level: String,
    pub household_size: String,
    pub monthly_budget: String,
    pub appliance_count: String,
}

impl TryFrom<HouseholdForm> for HouseholdProfile {
    type Error = AnalyticsError;

    fn try_from(form: HouseholdForm) -> Result<Self> {
        let region = match form.region.trim().parse::<Region>() {
            Ok(Region::Unknown) | Err(_) => {
                return Err(AnalyticsError::invalid(format!(
                    "region: '{}' is not a known region",
                    form.region.trim()
                )))
            }
            Ok(region) => region,
        };
        let income_level = form.income_level.trim().parse::<IncomeLevel>().map_err(|_| {
            AnalyticsError::invalid(format!(
                "income_level: '{}' must be Low, Medium or High",
                form.income_level.trim()
            ))
        })?;
        let household_size = parse_field::<u32>("household_size", &form.household_size)?
            .ok_or_else(|| AnalyticsError::invalid("household_size is required"))?;
        let monthly_budget = parse_field::<f64>("monthly_budget", &form.monthly_budget)?
            .ok_or_else(|| AnalyticsError::invalid("monthly_budget is required"))?;

        let mut profile = HouseholdProfile::new(region, income_level, household_size, monthly_budget)?;
        profile.declared_appliance_count = parse_field::<u32>("appliance_count", &form.appliance_count)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> HouseholdForm {
        HouseholdForm {
            region: "Kigali".into(),
            income_level: "medium".into(),
            household_size: "4".into(),
            monthly_budget: "50000".into(),
            appliance_count: String::new(),
        }
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!("kigali".parse::<Region>().unwrap(), Region::Kigali);
        assert_eq!(Region::from("Atlantis".to_string()), Region::Unknown);
        assert_eq!(Region::Southern.to_string(), "Southern");
    }

    #[test]
    fn test_region_serde_falls_back_to_unknown() {
        let region: Region = serde_json::from_str("\"Mars\"").unwrap();
        assert_eq!(region, Region::Unknown);
        assert_eq!(serde_json::to_string(&Region::Eastern).unwrap(), "\"Eastern\"");
    }

    #[test]
    fn test_profile_from_form() {
        let profile = HouseholdProfile::try_from(form()).unwrap();
        assert_eq!(profile.region, Region::Kigali);
        assert_eq!(profile.income_level, IncomeLevel::Medium);
        assert_eq!(profile.household_size, 4);
        assert_eq!(profile.monthly_budget, 50000.0);
        assert_eq!(profile.declared_appliance_count, None);
    }

    #[test]
    fn test_form_rejects_missing_or_unknown_fields() {
        let mut f = form();
        f.region = "Unknown".into();
        assert!(HouseholdProfile::try_from(f).is_err());

        let mut f = form();
        f.income_level = "".into();
        assert!(HouseholdProfile::try_from(f).is_err());

        let mut f = form();
        f.household_size = "0".into();
        assert!(HouseholdProfile::try_from(f).is_err());

        let mut f = form();
        f.monthly_budget = "-10".into();
        assert!(HouseholdProfile::try_from(f).is_err());
    }

    #[test]
    fn test_negative_budget_rejected() {
        assert!(HouseholdProfile::new(Region::Eastern, IncomeLevel::Low, 2, -1.0).is_err());
        assert!(HouseholdProfile::new(Region::Eastern, IncomeLevel::Low, 2, 0.0).is_ok());
    }
}
