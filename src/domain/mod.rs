pub mod appliance;
pub mod estimate;
pub mod household;

pub use appliance::*;
pub use estimate::*;
pub use household::*;

use std::str::FromStr;

use crate::error::{AnalyticsError, Result};

/// Parses a raw form value. Blank input yields `None` so callers can apply
/// their own default or reject the field.
pub(crate) fn parse_field<T: FromStr>(field: &str, raw: &str) -> Result<Option<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| AnalyticsError::invalid(format!("{field}: '{trimmed}' is not a valid number")))
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalyticsError::invalid(format!("{field} must be a finite number")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field::<f64>("power", " 150 ").unwrap(), Some(150.0));
        assert_eq!(parse_field::<u32>("quantity", "").unwrap(), None);
        assert!(parse_field::<u32>("quantity", "two").is_err());
        assert!(parse_field::<u32>("quantity", "-1").is_err());
    }
}
