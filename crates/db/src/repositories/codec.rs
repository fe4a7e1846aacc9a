//! Text encodings shared by the SQLite repositories.
//!
//! Dates are stored as `YYYY-MM-DD`, timestamps as fixed-width RFC 3339 UTC so
//! that string comparison orders them chronologically.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use super::RepositoryError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|error| RepositoryError::Decode(format!("invalid date `{value}`: {error}")))
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp `{value}`: {error}")))
}

pub fn encode_names(names: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(names).map_err(|error| RepositoryError::Decode(error.to_string()))
}

pub fn decode_names(value: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(value)
        .map_err(|error| RepositoryError::Decode(format!("invalid name list `{value}`: {error}")))
}

pub fn to_u32(column: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("column `{column}` out of range: {value}")))
}
