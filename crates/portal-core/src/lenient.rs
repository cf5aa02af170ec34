//! Forgiving deserialisers for API payload fields.
//!
//! The portal API is not strict about field encodings: dates arrive as full
//! timestamps or bare calendar dates, numbers sometimes arrive as strings, and
//! any of them may be `null` or missing. A bad field must never fail the whole
//! record, so every helper here maps unusable input to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{Error, Result};

/// Parse a date as sent by the API.
///
/// Accepted forms, in order:
/// - RFC 3339 (`2025-01-01T00:00:00Z`, `2025-01-01T09:30:00+02:00`)
/// - naive date-time, taken as UTC (`2025-01-01 09:30:00`, `2025-01-01T09:30:00.000`)
/// - calendar date, taken as midnight UTC (`2025-01-01`)
pub fn parse_api_date(raw: &str) -> Result<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(dt.with_timezone(&Utc));
  }
  for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
      return Ok(naive.and_utc());
    }
  }
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
  }
  Err(Error::InvalidDate(raw.to_string()))
}

/// `deserialize_with` target for optional date fields.
///
/// Pair with `#[serde(default)]` so a missing field also yields `None`.
pub fn date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) if !s.trim().is_empty() => match parse_api_date(&s) {
      Ok(dt) => Some(dt),
      Err(e) => {
        tracing::debug!("ignoring unparseable date field: {e}");
        None
      }
    },
    _ => None,
  })
}

/// `deserialize_with` target for optional decimal fields (`"150.00"` or `150`).
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_f64(),
    Some(Value::String(s)) => s.trim().parse().ok(),
    _ => None,
  })
}

/// `deserialize_with` target for optional whole-number fields (`"6"` or `6`).
pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
    Some(Value::String(s)) => s.trim().parse().ok(),
    _ => None,
  })
}
