//! Human-facing status of resolved periods and individual history records.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{
  period::ResolvedPeriod,
  timeline::{MaintenanceEvent, PhaseEvent},
};

/// A period with this many whole days left (or fewer) is expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 7;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
  Active,
  ExpiringSoon,
  Expired,
  /// A phase that has not started yet.
  Upcoming,
  /// A phase that has already ended.
  Completed,
}

/// Display severity, for renderers that colour-code statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
  Success,
  Warning,
  Danger,
  Info,
  Neutral,
}

impl StatusKind {
  pub fn severity(self) -> Severity {
    match self {
      Self::Active => Severity::Success,
      Self::ExpiringSoon => Severity::Warning,
      Self::Expired => Severity::Danger,
      Self::Upcoming => Severity::Info,
      Self::Completed => Severity::Neutral,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
  pub kind:           StatusKind,
  /// Whole days until the end of the window, floored. `None` when the record
  /// has no usable end date.
  pub days_remaining: Option<i64>,
  pub label:          String,
}

impl Status {
  fn new(kind: StatusKind, days_remaining: Option<i64>) -> Self {
    let label = match (kind, days_remaining) {
      (StatusKind::ExpiringSoon, Some(0)) => "Expires today".to_string(),
      (StatusKind::ExpiringSoon, Some(1)) => "Expiring in 1 day".to_string(),
      (StatusKind::ExpiringSoon, Some(n)) => format!("Expiring in {n} days"),
      (StatusKind::ExpiringSoon, None) => "Expiring soon".to_string(),
      (StatusKind::Active, _) => "Active".to_string(),
      (StatusKind::Expired, _) => "Expired".to_string(),
      (StatusKind::Upcoming, _) => "Upcoming".to_string(),
      (StatusKind::Completed, _) => "Completed".to_string(),
    };
    Self { kind, days_remaining, label }
  }

  pub fn severity(&self) -> Severity { self.kind.severity() }
}

/// Whole calendar days from `now` until `end`, rounded toward negative
/// infinity. 23h59m left is 0 days; any time past `end`, however small, is
/// at most -1.
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
  let left = end - now;
  // `num_days` truncates toward zero.
  let days = left.num_days();
  if left < TimeDelta::days(days) { days - 1 } else { days }
}

/// Classify a resolved service period.
pub fn classify_status(period: &ResolvedPeriod, now: DateTime<Utc>) -> Status {
  let days = days_remaining(period.end, now);
  let kind = if now > period.end {
    StatusKind::Expired
  } else if days <= EXPIRING_SOON_DAYS {
    StatusKind::ExpiringSoon
  } else {
    StatusKind::Active
  };
  Status::new(kind, Some(days))
}

/// Classify a maintenance extension on its own: it is either still covering
/// `now` or it has expired. There is no expiring-soon tier.
pub fn classify_extension(event: &MaintenanceEvent, now: DateTime<Utc>) -> Status {
  match event.end_date {
    Some(end) if now <= end => Status::new(StatusKind::Active, Some(days_remaining(end, now))),
    Some(end) => Status::new(StatusKind::Expired, Some(days_remaining(end, now))),
    None => Status::new(StatusKind::Expired, None),
  }
}

/// Classify a phase event on its own, independent of period resolution.
///
/// A missing start never makes a phase upcoming; a missing end never makes it
/// completed.
pub fn classify_phase(event: &PhaseEvent, now: DateTime<Utc>) -> Status {
  let days = event.end_date.map(|end| days_remaining(end, now));
  if event.start_date.is_some_and(|start| now < start) {
    return Status::new(StatusKind::Upcoming, days);
  }
  if event.end_date.is_some_and(|end| now > end) {
    return Status::new(StatusKind::Completed, days);
  }
  Status::new(StatusKind::Active, days)
}
