//! In-process stand-in for the portal API, served by axum on an ephemeral
//! port.
//!
//! Services at [`now`] (2025-03-15):
//! - `1` Website: original window ended 2024-12-31, kept running by a
//!   maintenance extension to 2025-06-30.
//! - `2` Hosting: no history, original window ends in 5 days.
//! - `3` App: original window ended 2023-12-31; its timeline endpoint fails.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use axum::{
  Json, Router,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tokio::net::TcpListener;

use crate::client::{ApiClient, ApiConfig, DEFAULT_TIMEOUT};

pub const TOKEN: &str = "test-token";

pub fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()
}

#[derive(Default)]
struct Counters {
  timeline: AtomicUsize,
  support:  AtomicUsize,
}

pub struct Backend {
  pub url:  String,
  counters: Arc<Counters>,
}

impl Backend {
  pub async fn start() -> Self {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
      .route("/client/profile", get(profile))
      .route("/client/services", get(services))
      .route("/client/services/{id}/timeline", get(timeline))
      .route("/client/support-requests", post(support))
      .with_state(counters.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    Self { url: format!("http://{addr}"), counters }
  }

  pub fn client(&self) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: self.url.clone(),
      token:    Some(TOKEN.to_string()),
      timeout:  DEFAULT_TIMEOUT,
    })
    .unwrap()
  }

  pub fn timeline_calls(&self) -> usize {
    self.counters.timeline.load(Ordering::SeqCst)
  }

  pub fn support_requests(&self) -> usize {
    self.counters.support.load(Ordering::SeqCst)
  }
}

fn authorized(headers: &HeaderMap) -> bool {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
  (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthenticated." }))).into_response()
}

async fn profile(headers: HeaderMap) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  Json(json!({
    "id": 12,
    "name": "Ada Lovelace",
    "email": "ada@example.com",
    "company": "Analytical Engines Ltd"
  }))
  .into_response()
}

async fn services(headers: HeaderMap) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  Json(json!([
    { "id": 1, "service_type": "Website", "start_date": "2024-01-01", "end_date": "2024-12-31", "status": "active" },
    { "id": 2, "service_type": "Hosting", "start_date": "2025-01-01", "end_date": "2025-03-20" },
    { "id": "3", "service_type": "App", "start_date": "2023-01-01 00:00:00", "end_date": "2023-12-31 00:00:00" }
  ]))
  .into_response()
}

async fn timeline(
  State(counters): State<Arc<Counters>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  counters.timeline.fetch_add(1, Ordering::SeqCst);
  match id.as_str() {
    "1" => Json(json!({
      "timeline": [
        { "id": 1, "timeline_type": "Development", "start_date": "2024-01-01", "end_date": "2024-03-31" }
      ],
      "maintenance": [
        { "id": 7, "months_added": 6, "amount_paid": "300.00", "start_date": "2025-01-01", "end_date": "2025-06-30" }
      ]
    }))
    .into_response(),
    "2" => Json(json!({ "timeline": [], "maintenance": [] })).into_response(),
    "3" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    "slow" => {
      tokio::time::sleep(Duration::from_secs(2)).await;
      Json(json!({})).into_response()
    }
    "garbled" => (StatusCode::OK, "<html>maintenance mode</html>").into_response(),
    _ => StatusCode::NOT_FOUND.into_response(),
  }
}

async fn support(State(counters): State<Arc<Counters>>, headers: HeaderMap) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  counters.support.fetch_add(1, Ordering::SeqCst);
  (StatusCode::CREATED, Json(json!({ "id": 501 }))).into_response()
}
