//! Serde adapter for optional ISO calendar dates
//!
//! Writes `YYYY-MM-DD`. Reads the leading date of whatever the store hands
//! back, so both `2024-12-01` and `2024-12-01 00:00:00.000Z` decode.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%d";

pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_leading_date(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

/// Parse the `YYYY-MM-DD` prefix of a date or datetime string
pub fn parse_leading_date(s: &str) -> Option<NaiveDate> {
    let prefix = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(prefix, FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_date() {
        assert_eq!(
            parse_leading_date("2024-12-01 00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(parse_leading_date("2024-12-01"), NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(parse_leading_date("12/01/2024"), None);
        assert_eq!(parse_leading_date("2024"), None);
    }
}
