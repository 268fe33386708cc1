use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `GET /health`, both for `200` (ready) and `503` (starting).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub uptime_seconds: Option<f64>,
    /// Readiness flags of backend sub-services (AI client, parser, ...).
    #[serde(default)]
    pub services: BTreeMap<String, bool>,
    #[serde(default)]
    pub detail: Option<HealthDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDetail {
    pub message: String,
}

impl HealthReport {
    pub fn detail_message(&self) -> Option<&str> {
        self.detail.as_ref().map(|d| d.message.as_str())
    }
}
