// Alertmanager webhook payload
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// GitLab limits issue titles to 255 characters.
pub const MAX_TITLE_CHARS: usize = 255;

const FINGERPRINT_LABEL_PREFIX: &str = "fingerprint::";

/// Label that ties a tracked issue to one alert occurrence.
pub fn fingerprint_label(fingerprint: &str) -> String {
    format!("{}{}", FINGERPRINT_LABEL_PREFIX, fingerprint)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    // anything that is not "firing" counts as resolved
    #[serde(other)]
    Resolved,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Firing => f.write_str("firing"),
            AlertStatus::Resolved => f.write_str("resolved"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub fingerprint: String,
    pub status: AlertStatus,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(rename = "generatorURL", default)]
    pub generator_url: String,
}

impl Alert {
    pub fn is_resolved(&self) -> bool {
        self.status != AlertStatus::Firing
    }

    /// `summary`, falling back to `message`, cut to the tracker's title limit.
    pub fn title(&self) -> String {
        let title = self
            .annotations
            .get("summary")
            .filter(|s| !s.is_empty())
            .or_else(|| self.annotations.get("message"))
            .map(String::as_str)
            .unwrap_or("");

        title.chars().take(MAX_TITLE_CHARS).collect()
    }

    /// Fingerprint label first, then one `key::value` label per alert label.
    pub fn issue_labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.labels.len() + 1);
        labels.push(fingerprint_label(&self.fingerprint));
        labels.extend(self.labels.iter().map(|(k, v)| format!("{}::{}", k, v)));
        labels
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupLabels {
    #[serde(default)]
    pub alertname: String,
    #[serde(default)]
    pub job: String,
}

/// One webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBatch {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub status: String,
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub group_labels: GroupLabels,
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub common_annotations: BTreeMap<String, String>,
    #[serde(rename = "externalURL", default)]
    pub external_url: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub group_key: String,
}
