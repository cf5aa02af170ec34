//! Active period resolution.
//!
//! A service's original window is reconciled against its timeline history to
//! find the window actually in force at `now`. Resolution is pure and
//! infallible: whatever the inputs, a [`ResolvedPeriod`] comes out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  service::ServiceRecord,
  timeline::{Candidate, EventRef, EventSet, Partition},
};

/// Where a resolved window came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSource {
  Original,
  Phase,
  Maintenance,
}

/// The window in force for a service at a given instant. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeriod {
  pub start:        DateTime<Utc>,
  pub end:          DateTime<Utc>,
  /// The window differs from the service's original window.
  pub is_extended:  bool,
  /// No event is running; this is the most recently ended one.
  pub is_completed: bool,
  /// Phase type, when a phase event was picked.
  pub label:        Option<String>,
  pub source:       PeriodSource,
  /// `start <= now <= end` at resolution time.
  pub is_active:    bool,
}

/// The service's own window, with missing bounds replaced by `now`.
pub fn original_period(record: &ServiceRecord, now: DateTime<Utc>) -> ResolvedPeriod {
  let start = record.start_date.unwrap_or(now);
  let end = record.end_date.unwrap_or(now);
  ResolvedPeriod {
    start,
    end,
    is_extended: false,
    is_completed: false,
    label: None,
    source: PeriodSource::Original,
    is_active: start <= now && now <= end,
  }
}

/// Resolve the window in force for `record` at `now`.
///
/// Candidates from `partition` are ordered by end date, latest first. The
/// first one containing `now` wins. Failing that, the most recently ended
/// event is used and flagged as completed. Failing that (no events, or all in
/// the future), the original window is returned.
pub fn resolve_active_period(
  record: &ServiceRecord,
  events: &EventSet,
  partition: Partition,
  now: DateTime<Utc>,
) -> ResolvedPeriod {
  let mut candidates = events.candidates(partition);
  // Stable: equal end dates keep phases ahead of maintenance.
  candidates.sort_by(|a, b| b.end.cmp(&a.end));

  if let Some(running) = candidates.iter().find(|c| c.contains(now)) {
    let is_extended =
      record.start_date != Some(running.start) || record.end_date != Some(running.end);
    return from_candidate(running, is_extended, false, true);
  }

  if let Some(ended) = candidates.iter().find(|c| c.end < now) {
    return from_candidate(ended, true, true, false);
  }

  original_period(record, now)
}

fn from_candidate(
  c: &Candidate<'_>,
  is_extended: bool,
  is_completed: bool,
  is_active: bool,
) -> ResolvedPeriod {
  let (source, label) = match c.event {
    EventRef::Phase(p) => (PeriodSource::Phase, Some(p.timeline_type.clone())),
    EventRef::Maintenance(_) => (PeriodSource::Maintenance, None),
  };
  ResolvedPeriod {
    start: c.start,
    end: c.end,
    is_extended,
    is_completed,
    label,
    source,
    is_active,
  }
}
