use crate::domain::ApplianceEntry;
use crate::error::Result;

/// Daily energy use of one inventory line in kWh.
pub fn daily_kwh(entry: &ApplianceEntry) -> Result<f64> {
    entry.check()?;
    Ok(entry.power_watts * entry.hours_per_day * f64::from(entry.quantity) / 1000.0)
}

/// Monthly energy use of one inventory line in kWh.
pub fn monthly_kwh(entry: &ApplianceEntry) -> Result<f64> {
    Ok(daily_kwh(entry)? * f64::from(entry.usage_days_per_month))
}
