//! Expiration date rules.
//!
//! Dates travel as `YYYY-MM-DD` text. A date is acceptable for a write when it
//! parses and is not strictly before today; expiring today is still valid.

use chrono::NaiveDate;

use crate::error::{InventoryError, InventoryResult};

pub const EXPIRATION_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_expiration_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, EXPIRATION_DATE_FORMAT).ok()
}

/// Check a date supplied for create/update.
pub fn validate_expiration_date(raw: &str, today: NaiveDate) -> InventoryResult<NaiveDate> {
    let date =
        parse_expiration_date(raw).ok_or_else(|| InventoryError::InvalidDate(raw.to_string()))?;
    if date < today {
        return Err(InventoryError::ExpiredDate(date));
    }
    Ok(date)
}

/// Signed whole days from `today` until the stored date, or `None` when the
/// stored text does not parse.
pub fn days_until_expiration(raw: &str, today: NaiveDate) -> Option<i64> {
    parse_expiration_date(raw).map(|date| (date - today).num_days())
}
