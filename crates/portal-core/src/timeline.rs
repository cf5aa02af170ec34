//! Timeline history: phase events and maintenance extensions of a service.
//!
//! Both kinds carry their own effective window. They are fetched per service
//! as one [`EventSet`] and compete for "currently in force" status during
//! period resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{lenient, service::EventId};

// ─── Records ─────────────────────────────────────────────────────────────────

/// A named lifecycle phase, e.g. "Development" or "Support".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
  pub id:            EventId,
  #[serde(default)]
  pub timeline_type: String,
  #[serde(default, deserialize_with = "lenient::date")]
  pub start_date:    Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "lenient::date")]
  pub end_date:      Option<DateTime<Utc>>,
}

/// An extension of the service window by a number of months, optionally paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
  pub id:           EventId,
  #[serde(default, deserialize_with = "lenient::count")]
  pub months_added: Option<u32>,
  #[serde(default, deserialize_with = "lenient::decimal")]
  pub amount_paid:  Option<f64>,
  #[serde(default, deserialize_with = "lenient::date")]
  pub start_date:   Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "lenient::date")]
  pub end_date:     Option<DateTime<Utc>>,
}

/// Everything the timeline-history endpoint returns for one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSet {
  #[serde(default)]
  pub timeline:    Vec<PhaseEvent>,
  #[serde(default)]
  pub maintenance: Vec<MaintenanceEvent>,
}

// ─── Partition ───────────────────────────────────────────────────────────────

/// Which events take part in period resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
  /// Phase events and maintenance extensions compete equally.
  #[default]
  All,
  Phases,
  Maintenance,
}

impl Partition {
  fn phases(self) -> bool { matches!(self, Self::All | Self::Phases) }

  fn maintenance(self) -> bool { matches!(self, Self::All | Self::Maintenance) }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

/// A borrowed view over either event kind with both bounds known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRef<'a> {
  Phase(&'a PhaseEvent),
  Maintenance(&'a MaintenanceEvent),
}

/// An event eligible for resolution: both dates were present and parseable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
  pub event: EventRef<'a>,
}

impl Candidate<'_> {
  /// `start <= now <= end`.
  pub fn contains(&self, now: DateTime<Utc>) -> bool {
    self.start <= now && now <= self.end
  }
}

impl EventSet {
  pub fn is_empty(&self) -> bool {
    self.timeline.is_empty() && self.maintenance.is_empty()
  }

  /// Events in `partition` with usable bounds, phases first, in API order.
  /// Events missing either date are skipped.
  pub fn candidates(&self, partition: Partition) -> Vec<Candidate<'_>> {
    let phases = self
      .timeline
      .iter()
      .filter(|_| partition.phases())
      .filter_map(|e| {
        Some(Candidate {
          start: e.start_date?,
          end:   e.end_date?,
          event: EventRef::Phase(e),
        })
      });
    let maintenance = self
      .maintenance
      .iter()
      .filter(|_| partition.maintenance())
      .filter_map(|e| {
        Some(Candidate {
          start: e.start_date?,
          end:   e.end_date?,
          event: EventRef::Maintenance(e),
        })
      });
    phases.chain(maintenance).collect()
  }
}
