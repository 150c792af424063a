//! Request and response bodies of the HTTP API.
//!
//! Field names are camelCase on the wire:
//!
//! ```json
//! {
//!   "url": "https://vimeo.com/123456?h=abc123",
//!   "videoId": "123456",
//!   "format": "mp3",
//!   "quality": "best",
//!   "startTime": 30,
//!   "endTime": 45.5
//! }
//! ```
//!
//! `vimeoUrl` is accepted as an alias of `url`. Only `url` is required;
//! `startTime` and `endTime` must be given together. An optional `cookies`
//! string (`name=value; name2=value2`) is handed to yt-dlp for pages behind
//! a login and never echoed back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::observability::MetricsSnapshot;
use crate::pipeline::AttemptResult;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DownloadAudioPayload {
    #[serde(default, alias = "vimeoUrl")]
    pub url: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub cookies: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InfoPayload {
    #[serde(default, alias = "vimeoUrl")]
    pub url: Option<String>,
    #[serde(default)]
    pub cookies: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_hash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<AttemptResult>>,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub work_dir: &'static str,
    pub version: &'static str,
    pub metrics: MetricsSnapshot,
}
