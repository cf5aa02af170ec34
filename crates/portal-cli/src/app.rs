//! Application state: the API client, the session's timeline cache, and the
//! screens built on top of them.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use anyhow::{Context as _, Result, anyhow};
use chrono::{DateTime, Utc};
use portal_core::{
  account::{ClientProfile, NewSupportRequest, SupportTicket},
  cache::TimelineCache,
  dashboard::{DashboardSummary, ServiceSummary},
  history::TimelineHistory,
  service::{ServiceId, ServiceRecord},
  timeline::Partition,
};

use crate::{client::ApiClient, scope::ScreenScope};

// ─── Screen data ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DashboardView {
  /// `None` when the profile could not be loaded; the counts still render.
  pub profile: Option<ClientProfile>,
  pub summary: DashboardSummary,
}

#[derive(Debug, Clone)]
pub struct ServiceDetail {
  pub summary: ServiceSummary,
  pub history: TimelineHistory,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level service layer. Owns the one timeline cache of the session and
/// hands it to every screen.
pub struct App {
  client:    ApiClient,
  cache:     TimelineCache<ApiClient>,
  /// Every screen resolves periods with the same partition.
  partition: Partition,
  scope:     ScreenScope,
  /// Timeline fetches that failed and were silently replaced by original
  /// dates.
  degraded:  Arc<AtomicUsize>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    let degraded = Arc::new(AtomicUsize::new(0));
    let counter = degraded.clone();
    let cache = TimelineCache::new(client.clone()).with_observer(move |_, _| {
      counter.fetch_add(1, Ordering::Relaxed);
    });
    Self {
      client,
      cache,
      partition: Partition::All,
      scope: ScreenScope::new(),
      degraded,
    }
  }

  /// Scope of the current screen; closing it abandons in-flight loads.
  pub fn scope(&self) -> &ScreenScope { &self.scope }

  /// Close the current screen's scope and start a fresh one.
  pub fn navigate(&mut self) {
    self.scope.close();
    self.scope = ScreenScope::new();
  }

  /// Manual refresh: forget every cached timeline.
  pub fn refresh(&self) {
    self.cache.clear();
  }

  pub fn degraded_fetches(&self) -> usize { self.degraded.load(Ordering::Relaxed) }

  // ── Screens ───────────────────────────────────────────────────────────────
  //
  // Each returns `Ok(None)` when the screen's scope closed before the load
  // finished.

  /// Services and profile are fetched together; counts are computed once
  /// every service has been resolved.
  pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<Option<DashboardView>> {
    self
      .scope
      .run(async {
        let (profile, services) = tokio::join!(self.client.profile(), self.client.services());
        let services = services.context("loading services")?;
        let profile = profile
          .inspect_err(|e| tracing::warn!("profile unavailable: {e}"))
          .ok();
        let summary = DashboardSummary::load(&self.cache, services, self.partition, now).await;
        Ok::<_, anyhow::Error>(DashboardView { profile, summary })
      })
      .await
      .transpose()
  }

  pub async fn services(&self, now: DateTime<Utc>) -> Result<Option<Vec<ServiceSummary>>> {
    self
      .scope
      .run(async {
        let services = self.client.services().await.context("loading services")?;
        let summary = DashboardSummary::load(&self.cache, services, self.partition, now).await;
        Ok::<_, anyhow::Error>(summary.services)
      })
      .await
      .transpose()
  }

  pub async fn service(
    &self,
    service_id: &ServiceId,
    now: DateTime<Utc>,
  ) -> Result<Option<ServiceDetail>> {
    self
      .scope
      .run(async {
        let record = self.find_service(service_id).await?;
        let events = self.cache.get(&record.id).await;
        let history = TimelineHistory::build(&events, now);
        let summary = ServiceSummary::build(record, &events, self.partition, now);
        Ok::<_, anyhow::Error>(ServiceDetail { summary, history })
      })
      .await
      .transpose()
  }

  pub async fn history(
    &self,
    service_id: &ServiceId,
    now: DateTime<Utc>,
  ) -> Result<Option<TimelineHistory>> {
    let history = self
      .scope
      .run(async {
        let events = self.cache.get(service_id).await;
        TimelineHistory::build(&events, now)
      })
      .await;
    Ok(history)
  }

  pub async fn submit_support(&self, request: NewSupportRequest) -> Result<SupportTicket> {
    self
      .client
      .submit_support_request(&request)
      .await
      .context("submitting support request")
  }

  async fn find_service(&self, service_id: &ServiceId) -> Result<ServiceRecord> {
    self
      .client
      .services()
      .await
      .context("loading services")?
      .into_iter()
      .find(|s| &s.id == service_id)
      .ok_or_else(|| anyhow!("no service with id {service_id}"))
  }
}
