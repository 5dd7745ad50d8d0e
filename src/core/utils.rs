use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use uuid::Uuid;

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}

pub fn date_to_string_opt(date: Option<NaiveDate>) -> Option<String> {
    date.map(|x| x.format("%Y-%m-%d").to_string())
}

/// Parse an optional `YYYY-MM-DD` string; blank counts as absent.
pub fn parse_date_opt(date: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match date.map(str::trim).filter(|x| !x.is_empty()) {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").map(Some),
        None => Ok(None),
    }
}

/// Whole years between `dob` and `today`.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    today.years_since(dob).map(|x| x as i32).unwrap_or(0)
}

/// `Some(trimmed)` when the value carries text.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn parse_uuid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}
