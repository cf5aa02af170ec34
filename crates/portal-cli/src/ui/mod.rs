//! Plain-text rendering of the portal screens.

pub mod service_detail;
pub mod service_list;

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use portal_core::status::{Severity, Status};

use crate::app::DashboardView;

/// Calendar date as shown to the client.
pub fn date(dt: DateTime<Utc>) -> String { dt.format("%Y-%m-%d").to_string() }

pub fn opt_date(dt: Option<DateTime<Utc>>) -> String {
  dt.map(date).unwrap_or_else(|| "—".to_string())
}

/// Status label with a severity marker, e.g. `! Expiring in 3 days`.
pub fn badge(status: &Status) -> String {
  let marker = match status.severity() {
    Severity::Success => '+',
    Severity::Warning => '!',
    Severity::Danger => 'x',
    Severity::Info => '>',
    Severity::Neutral => '-',
  };
  format!("{marker} {}", status.label)
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

pub fn dashboard(view: &DashboardView) -> String {
  let mut out = String::new();
  let s = &view.summary;

  if let Some(profile) = &view.profile {
    let _ = writeln!(out, "Welcome, {}", profile.display_name());
    let _ = writeln!(out);
  }

  let _ = writeln!(out, "Services       {}", s.total());
  let _ = writeln!(out, "  active       {}", s.active);
  let _ = writeln!(out, "  expiring     {}", s.expiring_soon);
  let _ = writeln!(out, "  expired      {}", s.expired);
  if s.upcoming > 0 {
    let _ = writeln!(out, "  upcoming     {}", s.upcoming);
  }

  if !s.services.is_empty() {
    let _ = writeln!(out);
    out.push_str(&service_list::render(&s.services));
  }
  out
}
