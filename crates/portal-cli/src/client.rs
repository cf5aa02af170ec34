//! Async HTTP client wrapping the portal JSON API.

use std::time::Duration;

use portal_core::{
  Error, Result,
  account::{ClientProfile, NewSupportRequest, SupportTicket},
  service::{ServiceId, ServiceRecord},
  source::TimelineSource,
  timeline::EventSet,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Requests that take longer than this fail like any other fetch error.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the portal API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token; requests go out unauthenticated when `None`.
  pub token:    Option<String>,
  pub timeout:  Duration,
}

/// Async HTTP client for the portal REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| Error::Fetch(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.config.token.as_deref() {
      Some(token) if !token.is_empty() => req.bearer_auth(token),
      _ => req,
    }
  }

  /// Send `req` and decode a JSON body, mapping every failure onto
  /// [`Error`]. A 401 is logged but otherwise returned like any other error.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T> {
    let resp = self.auth(req).send().await.map_err(|e| {
      if e.is_timeout() {
        Error::Fetch(format!("{path}: timed out"))
      } else {
        Error::Fetch(format!("{path}: {e}"))
      }
    })?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
      tracing::warn!(path, "request rejected: token missing or expired");
      return Err(Error::Unauthorized);
    }
    if !status.is_success() {
      return Err(Error::Http {
        status: status.as_u16(),
        path:   path.to_string(),
      });
    }

    let body = resp
      .bytes()
      .await
      .map_err(|e| Error::Fetch(format!("{path}: reading body: {e}")))?;
    Ok(serde_json::from_slice(&body)?)
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self.send(self.client.get(self.url(path)), path).await
  }

  // ── Account ───────────────────────────────────────────────────────────────

  /// `GET /client/profile`
  pub async fn profile(&self) -> Result<ClientProfile> {
    self.get("/client/profile").await
  }

  /// `POST /client/support-requests`
  pub async fn submit_support_request(
    &self,
    request: &NewSupportRequest,
  ) -> Result<SupportTicket> {
    let path = "/client/support-requests";
    self
      .send(self.client.post(self.url(path)).json(request), path)
      .await
  }

  // ── Services ──────────────────────────────────────────────────────────────

  /// `GET /client/services`
  pub async fn services(&self) -> Result<Vec<ServiceRecord>> {
    self.get("/client/services").await
  }

  /// `GET /client/services/<id>/timeline`
  pub async fn timeline(&self, service_id: &ServiceId) -> Result<EventSet> {
    self
      .get(&format!("/client/services/{service_id}/timeline"))
      .await
  }
}

impl TimelineSource for ApiClient {
  type Error = Error;

  async fn fetch_timeline(&self, service_id: ServiceId) -> Result<EventSet> {
    self.timeline(&service_id).await
  }
}
