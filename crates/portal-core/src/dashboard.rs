//! Dashboard and services-list summaries.
//!
//! Every view that shows a service's state goes through [`ServiceSummary`],
//! so all of them agree on the resolved window, the partition policy, and the
//! status thresholds.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::{
  cache::TimelineCache,
  period::{ResolvedPeriod, resolve_active_period},
  service::ServiceRecord,
  source::TimelineSource,
  status::{Status, StatusKind, classify_status},
  timeline::{EventSet, Partition},
};

/// One service with its resolved period and status at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSummary {
  pub record: ServiceRecord,
  pub period: ResolvedPeriod,
  pub status: Status,
}

impl ServiceSummary {
  pub fn build(
    record: ServiceRecord,
    events: &EventSet,
    partition: Partition,
    now: DateTime<Utc>,
  ) -> Self {
    let period = resolve_active_period(&record, events, partition, now);
    Self::from_period(record, period, now)
  }

  pub fn from_period(record: ServiceRecord, period: ResolvedPeriod, now: DateTime<Utc>) -> Self {
    let status = classify_status(&period, now);
    Self { record, period, status }
  }

  /// Resolve `record` through `cache`. Never fails.
  pub async fn load<S: TimelineSource>(
    cache: &TimelineCache<S>,
    record: ServiceRecord,
    partition: Partition,
    now: DateTime<Utc>,
  ) -> Self {
    let period = cache.resolve(&record, partition, now).await;
    Self::from_period(record, period, now)
  }
}

/// Aggregate counts over every service of the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
  pub services:      Vec<ServiceSummary>,
  /// Services whose resolved window contains `now`.
  pub active:        usize,
  /// Started services with at most [`EXPIRING_SOON_DAYS`] left.
  ///
  /// [`EXPIRING_SOON_DAYS`]: crate::status::EXPIRING_SOON_DAYS
  pub expiring_soon: usize,
  pub expired:       usize,
  /// Services whose window has not started yet. Takes precedence over
  /// `expiring_soon`, even when the window is short.
  pub upcoming:      usize,
}

impl DashboardSummary {
  pub fn from_services(services: Vec<ServiceSummary>) -> Self {
    let mut summary = Self::default();
    for s in &services {
      if s.period.is_active {
        summary.active += 1;
      }
      match s.status.kind {
        StatusKind::Expired => summary.expired += 1,
        // Neither running nor over: the window starts later.
        _ if !s.period.is_active => summary.upcoming += 1,
        StatusKind::ExpiringSoon => summary.expiring_soon += 1,
        _ => {}
      }
    }
    summary.services = services;
    summary
  }

  /// Resolve every service through `cache` concurrently and count once all
  /// resolutions are done. Output order follows `records`.
  pub async fn load<S: TimelineSource>(
    cache: &TimelineCache<S>,
    records: Vec<ServiceRecord>,
    partition: Partition,
    now: DateTime<Utc>,
  ) -> Self {
    let services = join_all(
      records
        .into_iter()
        .map(|record| ServiceSummary::load(cache, record, partition, now)),
    )
    .await;
    Self::from_services(services)
  }

  pub fn total(&self) -> usize { self.services.len() }
}
