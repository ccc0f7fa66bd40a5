//! Timestamp field.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fieldwork_types::{FieldError, Value};

use crate::Field;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A point in time given as an ISO 8601 string.
///
/// Accepts RFC 3339 timestamps with an offset, naive date-times (taken as
/// UTC), and bare dates (midnight UTC). The result is always UTC.
#[derive(Debug, Clone, Default)]
pub struct TimeField {
    allow_none: bool,
}

impl TimeField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl Field for TimeField {
    type Output = DateTime<Utc>;

    fn validate(&self, raw: &Value) -> Result<DateTime<Utc>, FieldError> {
        raw.to_text()
            .and_then(|text| parse_timestamp(&text))
            .ok_or_else(|| FieldError::invalid(self.info(), raw))
    }

    fn info(&self) -> String {
        let mut info = "an ISO8601 datestring".to_string();
        if self.allow_none {
            info += " or None";
        }
        info
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    fn from_literal(&self, text: &str) -> Value {
        Value::Str(text.trim().to_string())
    }
}
