//! Per-service timeline cache.
//!
//! Entries are filled lazily on first request and live until [`TimelineCache::clear`].
//! Successful fetches are cached, including empty ones. Failed fetches are
//! not: the caller gets an empty [`EventSet`] and the next request for the
//! same service tries the network again.

use std::{
  collections::HashMap,
  fmt,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::{
  period::{ResolvedPeriod, resolve_active_period},
  service::{ServiceId, ServiceRecord},
  source::TimelineSource,
  timeline::{EventSet, Partition},
};

/// Callback invoked with every swallowed fetch failure.
pub type FetchObserver<E> = Arc<dyn Fn(&ServiceId, &E) + Send + Sync>;

/// Outcome of one fetch, shared by every caller that waited on it.
type Slot<E> = Arc<OnceCell<Result<EventSet, E>>>;

/// In-memory map from service id to its fetched timeline history.
///
/// Each key holds a once-cell with the outcome of a single fetch. Concurrent
/// requests for the same service wait on that one fetch and all see its
/// result, success or failure. A failed slot is removed once the fetch
/// settles, so only later requests retry.
pub struct TimelineCache<S: TimelineSource> {
  source:   S,
  entries:  Mutex<HashMap<ServiceId, Slot<S::Error>>>,
  observer: Option<FetchObserver<S::Error>>,
}

impl<S: TimelineSource> TimelineCache<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      entries: Mutex::new(HashMap::new()),
      observer: None,
    }
  }

  /// Attach a callback that sees each fetch failure the cache swallows.
  pub fn with_observer(
    mut self,
    observer: impl Fn(&ServiceId, &S::Error) + Send + Sync + 'static,
  ) -> Self {
    self.observer = Some(Arc::new(observer));
    self
  }

  pub fn source(&self) -> &S { &self.source }

  fn entries(&self) -> MutexGuard<'_, HashMap<ServiceId, Slot<S::Error>>> {
    // The map is only touched in short non-panicking sections.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Timeline history for `service_id`. Never fails; a fetch error yields an
  /// empty set and leaves the entry unfilled.
  pub async fn get(&self, service_id: &ServiceId) -> EventSet {
    let slot = self.entries().entry(service_id.clone()).or_default().clone();

    let mut fetched_here = false;
    let outcome = slot
      .get_or_init(|| {
        fetched_here = true;
        tracing::debug!(%service_id, "fetching timeline");
        self.source.fetch_timeline(service_id.clone())
      })
      .await;

    let e = match outcome {
      Ok(events) => return events.clone(),
      Err(e) => e,
    };

    if !fetched_here {
      tracing::debug!(%service_id, "shared timeline fetch failed");
      return EventSet::default();
    }

    {
      let mut entries = self.entries();
      if entries.get(service_id).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
        entries.remove(service_id);
      }
    }
    tracing::warn!(%service_id, "timeline fetch failed, using original dates: {e}");
    if let Some(observer) = &self.observer {
      observer(service_id, e);
    }
    EventSet::default()
  }

  /// Resolve the period in force for `record`, fetching its history through
  /// the cache. Falls back to the original window when the fetch fails.
  pub async fn resolve(
    &self,
    record: &ServiceRecord,
    partition: Partition,
    now: DateTime<Utc>,
  ) -> ResolvedPeriod {
    let events = self.get(&record.id).await;
    resolve_active_period(record, &events, partition, now)
  }

  /// Drop every entry. The next `get` for any service fetches again.
  pub fn clear(&self) {
    let mut entries = self.entries();
    let dropped = entries.len();
    entries.clear();
    tracing::debug!(dropped, "timeline cache cleared");
  }

  /// Whether a fetched history is cached for `service_id`.
  pub fn contains(&self, service_id: &ServiceId) -> bool {
    self.entries().get(service_id).is_some_and(|slot| is_cached(slot))
  }

  /// Number of services with a cached history.
  pub fn len(&self) -> usize {
    self.entries().values().filter(|slot| is_cached(slot)).count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

fn is_cached<E>(slot: &OnceCell<Result<EventSet, E>>) -> bool {
  matches!(slot.get(), Some(Ok(_)))
}

impl<S: TimelineSource> fmt::Debug for TimelineCache<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TimelineCache")
      .field("cached", &self.len())
      .field("observed", &self.observer.is_some())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
  };

  use chrono::TimeZone;

  use super::*;
  use crate::{
    Error,
    period::PeriodSource,
    service::EventId,
    timeline::MaintenanceEvent,
  };

  /// Counts fetches; the first `failures` calls fail.
  #[derive(Default)]
  struct FakeSource {
    calls:    AtomicUsize,
    failures: AtomicUsize,
    events:   EventSet,
    delay:    Option<Duration>,
  }

  impl FakeSource {
    fn failing(times: usize) -> Self {
      Self {
        failures: AtomicUsize::new(times),
        ..Default::default()
      }
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
  }

  impl TimelineSource for FakeSource {
    type Error = Error;

    async fn fetch_timeline(&self, _service_id: ServiceId) -> Result<EventSet, Error> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      let failing = self
        .failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
      if failing {
        return Err(Error::Fetch("connection reset".into()));
      }
      Ok(self.events.clone())
    }
  }

  fn extension_set() -> EventSet {
    EventSet {
      timeline:    Vec::new(),
      maintenance: vec![MaintenanceEvent {
        id:           EventId::from(1),
        months_added: Some(6),
        amount_paid:  Some(300.0),
        start_date:   Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        end_date:     Some(Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap()),
      }],
    }
  }

  #[tokio::test]
  async fn second_get_is_served_from_cache() {
    let cache = TimelineCache::new(FakeSource::default());
    let id = ServiceId::from(1);

    cache.get(&id).await;
    cache.get(&id).await;

    assert_eq!(cache.source().calls(), 1);
    assert!(cache.contains(&id));
  }

  #[tokio::test]
  async fn empty_results_are_cached() {
    let cache = TimelineCache::new(FakeSource::default());
    let id = ServiceId::from(1);

    assert!(cache.get(&id).await.is_empty());
    assert!(cache.contains(&id));
    assert_eq!(cache.len(), 1);
  }

  #[tokio::test]
  async fn clear_forces_refetch() {
    let cache = TimelineCache::new(FakeSource::default());
    let id = ServiceId::from(1);

    cache.get(&id).await;
    cache.clear();
    assert!(cache.is_empty());
    cache.get(&id).await;

    assert_eq!(cache.source().calls(), 2);
  }

  #[tokio::test]
  async fn distinct_ids_fetch_separately() {
    let cache = TimelineCache::new(FakeSource::default());
    cache.get(&ServiceId::from(1)).await;
    cache.get(&ServiceId::from(2)).await;
    cache.get(&ServiceId::from(1)).await;
    assert_eq!(cache.source().calls(), 2);
    assert_eq!(cache.len(), 2);
  }

  #[tokio::test]
  async fn failures_are_not_cached() {
    let source = FakeSource {
      events: extension_set(),
      ..FakeSource::failing(1)
    };
    let cache = TimelineCache::new(source);
    let id = ServiceId::from(1);

    assert!(cache.get(&id).await.is_empty());
    assert!(!cache.contains(&id));

    let retried = cache.get(&id).await;
    assert_eq!(retried.maintenance.len(), 1);
    assert_eq!(cache.source().calls(), 2);
    assert!(cache.contains(&id));
  }

  #[tokio::test]
  async fn observer_sees_each_failure() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let cache = TimelineCache::new(FakeSource::failing(2)).with_observer(
      move |id: &ServiceId, e: &Error| {
        assert_eq!(id.as_str(), "5");
        assert!(matches!(e, Error::Fetch(_)));
        counter.fetch_add(1, Ordering::SeqCst);
      },
    );
    let id = ServiceId::from(5);

    cache.get(&id).await;
    cache.get(&id).await;
    cache.get(&id).await;

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(cache.source().calls(), 3);
  }

  #[tokio::test]
  async fn concurrent_gets_share_one_fetch() {
    let source = FakeSource {
      delay: Some(Duration::from_millis(20)),
      ..Default::default()
    };
    let cache = TimelineCache::new(source);
    let id = ServiceId::from(1);

    futures::future::join_all((0..8).map(|_| cache.get(&id))).await;

    assert_eq!(cache.source().calls(), 1);
  }

  #[tokio::test]
  async fn concurrent_gets_share_one_failed_fetch() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let source = FakeSource {
      delay: Some(Duration::from_millis(20)),
      events: extension_set(),
      ..FakeSource::failing(1)
    };
    let cache = TimelineCache::new(source).with_observer(move |_: &ServiceId, _: &Error| {
      counter.fetch_add(1, Ordering::SeqCst);
    });
    let id = ServiceId::from(1);

    let results = futures::future::join_all((0..8).map(|_| cache.get(&id))).await;

    assert!(results.iter().all(EventSet::is_empty));
    assert_eq!(cache.source().calls(), 1);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(!cache.contains(&id));

    let retried = cache.get(&id).await;
    assert_eq!(retried.maintenance.len(), 1);
    assert_eq!(cache.source().calls(), 2);
    assert!(cache.contains(&id));
  }

  #[tokio::test]
  async fn resolve_falls_back_to_original_dates_on_failure() {
    let cache = TimelineCache::new(FakeSource::failing(1));
    let record = ServiceRecord::new(
      1,
      "Website",
      Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
      Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()),
    );
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let p = cache.resolve(&record, Partition::All, now).await;
    assert_eq!(p.source, PeriodSource::Original);
    assert!(!p.is_extended);
  }

  #[tokio::test]
  async fn resolve_uses_cached_extension() {
    let source = FakeSource {
      events: extension_set(),
      ..Default::default()
    };
    let cache = TimelineCache::new(source);
    let record = ServiceRecord::new(
      1,
      "Website",
      Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
      Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()),
    );
    let now = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();

    let p = cache.resolve(&record, Partition::All, now).await;
    assert_eq!(p.source, PeriodSource::Maintenance);
    assert!(p.is_extended);
    assert!(p.is_active);
  }
}
