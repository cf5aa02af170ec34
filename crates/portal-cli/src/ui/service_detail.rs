//! Service detail and timeline history.

use std::fmt::Write as _;

use portal_core::{history::TimelineHistory, period::PeriodSource};

use super::{badge, date, opt_date};
use crate::app::ServiceDetail;

pub fn render(detail: &ServiceDetail) -> String {
  let mut out = String::new();
  let s = &detail.summary;
  let p = &s.period;

  let _ = writeln!(out, "{} #{}", s.record.service_type, s.record.id);
  let _ = writeln!(out, "Status     {}", badge(&s.status));
  let _ = writeln!(out, "Period     {} → {}", date(p.start), date(p.end));

  if p.is_extended {
    let via = match (p.source, p.label.as_deref()) {
      (PeriodSource::Phase, Some(label)) => format!("phase \"{label}\""),
      (PeriodSource::Maintenance, _) => "maintenance extension".to_string(),
      _ => "timeline".to_string(),
    };
    let completed = if p.is_completed { ", completed" } else { "" };
    let _ = writeln!(out, "Extended   via {via}{completed}");
    let _ = writeln!(
      out,
      "Original   {} → {}",
      opt_date(s.record.start_date),
      opt_date(s.record.end_date)
    );
  }

  let _ = writeln!(out);
  out.push_str(&history(&detail.history));
  out
}

pub fn history(history: &TimelineHistory) -> String {
  if history.is_empty() {
    return "No timeline history.\n".to_string();
  }

  let mut out = String::new();
  if !history.phases.is_empty() {
    let _ = writeln!(out, "Timeline");
    for row in &history.phases {
      let _ = writeln!(
        out,
        "  {:<16} {:<10} → {:<10}  {}",
        row.event.timeline_type,
        opt_date(row.event.start_date),
        opt_date(row.event.end_date),
        badge(&row.status),
      );
    }
  }

  if !history.maintenance.is_empty() {
    let _ = writeln!(out, "Maintenance");
    for row in &history.maintenance {
      let months = row
        .event
        .months_added
        .map(|m| format!("+{m} mo"))
        .unwrap_or_default();
      let paid = row
        .event
        .amount_paid
        .map(|a| format!("{a:.2} paid"))
        .unwrap_or_default();
      let _ = writeln!(
        out,
        "  {:<8} {:<12} {:<10} → {:<10}  {}",
        months,
        paid,
        opt_date(row.event.start_date),
        opt_date(row.event.end_date),
        badge(&row.status),
      );
    }
    let _ = writeln!(
      out,
      "  total: {} months, {:.2} paid",
      history.months_added, history.total_paid
    );
  }
  out
}
