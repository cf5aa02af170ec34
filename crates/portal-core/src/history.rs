//! Timeline-history view of one service.
//!
//! Unlike period resolution, every record is classified on its own here:
//! phases may be upcoming, active or completed; extensions are active or
//! expired.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  status::{Status, classify_extension, classify_phase},
  timeline::{EventSet, MaintenanceEvent, PhaseEvent},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRow {
  pub event:  PhaseEvent,
  pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceRow {
  pub event:  MaintenanceEvent,
  pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineHistory {
  /// Most recently ending first; undated phases last.
  pub phases:       Vec<PhaseRow>,
  /// Most recently ending first; undated extensions last.
  pub maintenance:  Vec<MaintenanceRow>,
  /// Sum of `amount_paid` over all extensions.
  pub total_paid:   f64,
  /// Sum of `months_added` over all extensions.
  pub months_added: u32,
}

impl TimelineHistory {
  pub fn build(events: &EventSet, now: DateTime<Utc>) -> Self {
    let mut phases: Vec<_> = events
      .timeline
      .iter()
      .map(|e| PhaseRow { event: e.clone(), status: classify_phase(e, now) })
      .collect();
    // `None` sorts below `Some`, so reversing puts undated records last.
    phases.sort_by_key(|row| Reverse(row.event.end_date));

    let mut maintenance: Vec<_> = events
      .maintenance
      .iter()
      .map(|e| MaintenanceRow {
        event:  e.clone(),
        status: classify_extension(e, now),
      })
      .collect();
    maintenance.sort_by_key(|row| Reverse(row.event.end_date));

    let total_paid: f64 = events
      .maintenance
      .iter()
      .filter_map(|e| e.amount_paid)
      .sum();
    let months_added = events
      .maintenance
      .iter()
      .filter_map(|e| e.months_added)
      .fold(0u32, u32::saturating_add);

    Self { phases, maintenance, total_paid, months_added }
  }

  pub fn is_empty(&self) -> bool {
    self.phases.is_empty() && self.maintenance.is_empty()
  }
}
