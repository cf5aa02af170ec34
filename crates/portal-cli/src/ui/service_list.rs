//! Services list, one line per service.

use std::fmt::Write as _;

use portal_core::dashboard::ServiceSummary;

use super::{badge, date};

pub fn render(services: &[ServiceSummary]) -> String {
  if services.is_empty() {
    return "No services assigned.\n".to_string();
  }

  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<8} {:<16} {:<10} {:<10} STATUS",
    "ID", "SERVICE", "FROM", "UNTIL"
  );
  for s in services {
    let extended = if s.period.is_extended { " (extended)" } else { "" };
    let _ = writeln!(
      out,
      "{:<8} {:<16} {:<10} {:<10} {}{extended}",
      s.record.id,
      s.record.service_type,
      date(s.period.start),
      date(s.period.end),
      badge(&s.status),
    );
  }
  out
}
