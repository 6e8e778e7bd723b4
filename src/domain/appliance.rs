use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_field, require_finite};
use crate::error::{AnalyticsError, Result};

const DEFAULT_QUANTITY: u32 = 1;
const DEFAULT_USAGE_DAYS: u32 = 30;

/// One appliance line of a household inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplianceEntry {
    #[validate(length(min = 1, message = "appliance name must not be empty"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "power must be greater than 0 W"))]
    pub power_watts: f64,
    #[validate(range(min = 0.0, max = 24.0, message = "hours per day must be within 0..=24"))]
    pub hours_per_day: f64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 1, max = 31, message = "usage days per month must be within 1..=31"))]
    pub usage_days_per_month: u32,
}

impl ApplianceEntry {
    pub fn new(
        name: impl Into<String>,
        power_watts: f64,
        hours_per_day: f64,
        quantity: u32,
        usage_days_per_month: u32,
    ) -> Result<Self> {
        let entry = Self {
            name: name.into().trim().to_string(),
            power_watts,
            hours_per_day,
            quantity,
            usage_days_per_month,
        };
        entry.check()?;
        Ok(entry)
    }

    /// Checks every field against its documented range.
    pub fn check(&self) -> Result<()> {
        require_finite("power_watts", self.power_watts)?;
        require_finite("hours_per_day", self.hours_per_day)?;
        if self.name.trim().is_empty() {
            return Err(AnalyticsError::invalid("appliance name must not be empty"));
        }
        self.validate()?;
        Ok(())
    }
}

/// Raw appliance fields as typed into a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplianceForm {
    pub name: String,
    pub power: String,
    pub hours: String,
    pub quantity: String,
    pub usage_days: String,
}

impl TryFrom<ApplianceForm> for ApplianceEntry {
    type Error = AnalyticsError;

    fn try_from(form: ApplianceForm) -> Result<Self> {
        let power = parse_field::<f64>("power", &form.power)?
            .ok_or_else(|| AnalyticsError::invalid("power is required"))?;
        let hours = parse_field::<f64>("hours", &form.hours)?
            .ok_or_else(|| AnalyticsError::invalid("hours is required"))?;
        let quantity = parse_field::<u32>("quantity", &form.quantity)?.unwrap_or(DEFAULT_QUANTITY);
        let usage_days =
            parse_field::<u32>("usage_days", &form.usage_days)?.unwrap_or(DEFAULT_USAGE_DAYS);
        ApplianceEntry::new(form.name, power, hours, quantity, usage_days)
    }
}

/// Ordered appliance list for a single estimate request.
///
/// Entries are checked on insertion, so an inventory never holds an entry
/// the consumption calculator would reject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplianceInventory {
    entries: Vec<ApplianceEntry>,
}

impl ApplianceInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ApplianceEntry>) -> Result<Self> {
        let mut inventory = Self::new();
        for entry in entries {
            inventory.add(entry)?;
        }
        Ok(inventory)
    }

    /// Adds an entry and returns its position.
    pub fn add(&mut self, entry: ApplianceEntry) -> Result<usize> {
        entry.check()?;
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<ApplianceEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn entries(&self) -> &[ApplianceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplianceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, power: &str, hours: &str) -> ApplianceForm {
        ApplianceForm {
            name: name.to_string(),
            power: power.to_string(),
            hours: hours.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_entry() {
        let entry = ApplianceEntry::new("Refrigerator", 150.0, 8.0, 1, 30).unwrap();
        assert_eq!(entry.name, "Refrigerator");
        assert_eq!(entry.usage_days_per_month, 30);
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        assert!(ApplianceEntry::new("", 150.0, 8.0, 1, 30).is_err());
        assert!(ApplianceEntry::new("   ", 150.0, 8.0, 1, 30).is_err());
        assert!(ApplianceEntry::new("Fan", 0.0, 8.0, 1, 30).is_err());
        assert!(ApplianceEntry::new("Fan", -5.0, 8.0, 1, 30).is_err());
        assert!(ApplianceEntry::new("Fan", 60.0, 24.5, 1, 30).is_err());
        assert!(ApplianceEntry::new("Fan", 60.0, -1.0, 1, 30).is_err());
        assert!(ApplianceEntry::new("Fan", 60.0, 8.0, 0, 30).is_err());
        assert!(ApplianceEntry::new("Fan", 60.0, 8.0, 1, 0).is_err());
        assert!(ApplianceEntry::new("Fan", 60.0, 8.0, 1, 32).is_err());
        assert!(ApplianceEntry::new("Fan", f64::NAN, 8.0, 1, 30).is_err());
        assert!(ApplianceEntry::new("Fan", f64::INFINITY, 8.0, 1, 30).is_err());
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(ApplianceEntry::new("Router", 10.0, 0.0, 1, 1).is_ok());
        assert!(ApplianceEntry::new("Router", 10.0, 24.0, 1, 31).is_ok());
    }

    #[test]
    fn test_form_defaults_quantity_and_days() {
        let entry = ApplianceEntry::try_from(form("TV", "120", "4.5")).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.usage_days_per_month, 30);
        assert_eq!(entry.hours_per_day, 4.5);
    }

    #[test]
    fn test_form_requires_power_and_hours() {
        assert!(ApplianceEntry::try_from(form("TV", "", "4")).is_err());
        assert!(ApplianceEntry::try_from(form("TV", "120", "")).is_err());
        assert!(ApplianceEntry::try_from(form("TV", "lots", "4")).is_err());
    }

    #[test]
    fn test_inventory_add_and_remove() {
        let mut inventory = ApplianceInventory::new();
        let idx = inventory
            .add(ApplianceEntry::new("Kettle", 2000.0, 0.5, 1, 30).unwrap())
            .unwrap();
        assert_eq!(idx, 0);
        inventory
            .add(ApplianceEntry::new("Bulb", 10.0, 6.0, 4, 30).unwrap())
            .unwrap();
        assert_eq!(inventory.len(), 2);

        let removed = inventory.remove(0).unwrap();
        assert_eq!(removed.name, "Kettle");
        assert_eq!(inventory.entries()[0].name, "Bulb");
        assert!(inventory.remove(5).is_none());
    }

    #[test]
    fn test_inventory_rejects_unchecked_entry() {
        let mut inventory = ApplianceInventory::new();
        let bad = ApplianceEntry {
            name: "Heater".into(),
            power_watts: 1500.0,
            hours_per_day: 30.0,
            quantity: 1,
            usage_days_per_month: 30,
        };
        assert!(inventory.add(bad).is_err());
        assert!(inventory.is_empty());
    }
}
