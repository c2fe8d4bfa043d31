use time::{macros::format_description, Date, Duration};

use crate::error::PlanError;

/// Days in a planned week.
pub const WEEK_LEN: usize = 7;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Parse `2024-05-13` or an RFC 3339 timestamp; only the calendar date is kept.
pub fn parse_date(raw: &str, field: &str) -> Result<Date, PlanError> {
    let raw = raw.trim();
    let day_part = raw.get(..10).unwrap_or(raw);
    Date::parse(day_part, format_description!("[year]-[month]-[day]"))
        .map_err(|_| PlanError::invalid(format!("{field} must be a date (YYYY-MM-DD)")))
}

/// Parse a required week start and make sure the whole week is representable.
pub fn parse_week_start(raw: Option<&str>) -> Result<Date, PlanError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PlanError::invalid("weekStartDate is required"))?;
    let start = parse_date(raw, "weekStartDate")?;
    start
        .checked_add(Duration::days(WEEK_LEN as i64 - 1))
        .ok_or_else(|| PlanError::invalid("weekStartDate is out of range"))?;
    Ok(start)
}

/// The seven consecutive dates starting at `start`.
pub fn week_dates(start: Date) -> Vec<Date> {
    (0..WEEK_LEN as i64)
        .map(|i| start.saturating_add(Duration::days(i)))
        .collect()
}

pub fn week_end(start: Date) -> Date {
    start.saturating_add(Duration::days(WEEK_LEN as i64 - 1))
}
