//! Cancellation scopes for screens.
//!
//! A screen runs its loads inside a [`ScreenScope`]. Once the scope is closed
//! (the user navigated away, or hit Ctrl-C) in-flight work is dropped and its
//! result discarded, so nothing updates state that belongs to a dead screen.

use std::{future::Future, sync::Arc};

use tokio::sync::watch;

/// Cloneable handle to one screen's lifetime. All clones share the same
/// closed flag.
#[derive(Debug, Clone)]
pub struct ScreenScope {
  closed: Arc<watch::Sender<bool>>,
}

impl ScreenScope {
  pub fn new() -> Self {
    let (closed, _rx) = watch::channel(false);
    Self { closed: Arc::new(closed) }
  }

  /// Close the scope. Idempotent.
  pub fn close(&self) {
    self.closed.send_replace(true);
  }

  pub fn is_closed(&self) -> bool { *self.closed.borrow() }

  /// Drive `fut` to completion unless the scope closes first.
  /// Returns `None` if the scope was, or became, closed.
  pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
    if self.is_closed() {
      return None;
    }
    let mut rx = self.closed.subscribe();
    tokio::select! {
      biased;
      _ = rx.wait_for(|closed| *closed) => None,
      out = fut => Some(out),
    }
  }
}

impl Default for ScreenScope {
  fn default() -> Self { Self::new() }
}
