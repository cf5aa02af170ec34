//! The `TimelineSource` trait: where timeline history comes from.
//!
//! Implemented by the HTTP client in `portal-cli`. The cache and the dashboard
//! depend on this abstraction, not on any concrete transport.

use std::{future::Future, sync::Arc};

use crate::{service::ServiceId, timeline::EventSet};

/// Abstraction over the remote timeline record store.
///
/// All methods return `Send` futures so sources can be driven from a
/// multi-threaded tokio runtime.
pub trait TimelineSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the full timeline history (phases and maintenance) of one service.
  fn fetch_timeline(
    &self,
    service_id: ServiceId,
  ) -> impl Future<Output = Result<EventSet, Self::Error>> + Send + '_;
}

impl<T: TimelineSource> TimelineSource for Arc<T> {
  type Error = T::Error;

  fn fetch_timeline(
    &self,
    service_id: ServiceId,
  ) -> impl Future<Output = Result<EventSet, Self::Error>> + Send + '_ {
    (**self).fetch_timeline(service_id)
  }
}
