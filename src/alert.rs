//! data structures for deserializing incoming alertmanager webhooks
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// one webhook notification from alertmanager, possibly carrying several
/// alerts at once
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBatch {
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(rename = "externalURL", default)]
    pub external_url: Option<String>,
}

/// a single alert inside a batch
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Alert {
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// annotation values are kept as raw json so a batch with a non-string
    /// summary or description still deserializes
    #[serde(default)]
    pub annotations: HashMap<String, serde_json::Value>,
}

/// lifecycle state of the whole batch. Alertmanager only ever sends `firing`
/// or `resolved`; a missing or unrecognized value is treated as firing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AlertStatus {
    #[default]
    Firing,
    Resolved,
}

impl From<String> for AlertStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "resolved" => AlertStatus::Resolved,
            _ => AlertStatus::Firing,
        }
    }
}

impl Alert {
    /// the `alertname` label, if the alert carries one
    pub fn name(&self) -> Option<&str> {
        self.labels.get("alertname").map(String::as_str)
    }
}
