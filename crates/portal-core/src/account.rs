//! Client profile and support requests.

use serde::{Deserialize, Serialize};

use crate::service::{RecordId, ServiceId};

/// The logged-in client, as shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
  pub id:      RecordId,
  #[serde(default)]
  pub name:    String,
  #[serde(default)]
  pub email:   String,
  #[serde(default)]
  pub company: Option<String>,
}

impl ClientProfile {
  /// Company name when set, otherwise the personal name.
  pub fn display_name(&self) -> &str {
    self
      .company
      .as_deref()
      .filter(|c| !c.trim().is_empty())
      .unwrap_or(&self.name)
  }
}

/// Body of a support request submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupportRequest {
  pub subject:    String,
  pub message:    String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub service_id: Option<ServiceId>,
}

/// Acknowledgement returned after a support request is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
  pub id: RecordId,
}
