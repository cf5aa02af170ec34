//! Service records, the deliverables assigned to a client.
//!
//! A service carries an original validity window. What is actually in force
//! right now is derived on read by [`crate::period::resolve_active_period`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! opaque_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      pub fn as_str(&self) -> &str { &self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self { Self(s.to_string()) }
    }

    impl From<String> for $name {
      fn from(s: String) -> Self { Self(s) }
    }

    impl From<i32> for $name {
      fn from(n: i32) -> Self { Self(n.to_string()) }
    }

    impl From<i64> for $name {
      fn from(n: i64) -> Self { Self(n.to_string()) }
    }

    impl<'de> Deserialize<'de> for $name {
      fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        RawId::deserialize(d).map(|raw| Self(raw.into_key()))
      }
    }
  };
}

/// Identifiers arrive as JSON numbers from some endpoints and as strings from
/// others; both collapse to the same textual key.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Signed(i64),
  Unsigned(u64),
  Text(String),
}

impl RawId {
  fn into_key(self) -> String {
    match self {
      Self::Signed(n) => n.to_string(),
      Self::Unsigned(n) => n.to_string(),
      Self::Text(s) => s,
    }
  }
}

opaque_id!(
  /// Opaque unique key of a [`ServiceRecord`].
  ServiceId
);

opaque_id!(
  /// Opaque key of a timeline or maintenance record.
  EventId
);

opaque_id!(
  /// Opaque key of any other API record (profiles, tickets).
  RecordId
);

// ─── ServiceRecord ───────────────────────────────────────────────────────────

/// A deliverable (website, app, hosting plan…) assigned to the client.
///
/// Presentational fields beyond the ones below are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
  pub id:           ServiceId,
  #[serde(default)]
  pub service_type: String,
  /// Start of the original validity window. `None` when missing or invalid.
  #[serde(default, deserialize_with = "lenient::date")]
  pub start_date:   Option<DateTime<Utc>>,
  /// End of the original validity window. `None` when missing or invalid.
  #[serde(default, deserialize_with = "lenient::date")]
  pub end_date:     Option<DateTime<Utc>>,
}

impl ServiceRecord {
  pub fn new(
    id: impl Into<ServiceId>,
    service_type: impl Into<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
  ) -> Self {
    Self {
      id: id.into(),
      service_type: service_type.into(),
      start_date,
      end_date,
    }
  }
}
