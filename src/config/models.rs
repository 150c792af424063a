use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub vimeo: VimeoConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound for JSON request bodies
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_max_body_bytes() -> ByteSize {
    ByteSize(64 * 1024) // 64 KB
}

/// Download pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadsConfig {
    /// Shared ephemeral directory for request-scoped artifacts
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Pause after a failed extractor attempt before the next candidate
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Candidate strategy name ("auto", "vimeo", "generic")
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl DownloadsConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            backoff_ms: default_backoff_ms(),
            strategy: default_strategy(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("clipfetch")
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_strategy() -> String {
    "auto".to_string()
}

/// yt-dlp invocation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor_binary")]
    pub binary: String,
    #[serde(default = "default_extractor_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retries")]
    pub fragment_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// `Name: value` lines sent as `--add-header`
    #[serde(default = "default_extra_headers")]
    pub extra_headers: Vec<String>,
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary: default_extractor_binary(),
            timeout_secs: default_extractor_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            retries: default_retries(),
            fragment_retries: default_retries(),
            user_agent: default_user_agent(),
            extra_headers: default_extra_headers(),
        }
    }
}

fn default_extractor_binary() -> String {
    "yt-dlp".to_string()
}

fn default_extractor_timeout_secs() -> u64 {
    180
}

fn default_probe_timeout_secs() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_extra_headers() -> Vec<String> {
    vec![
        "Accept: */*".to_string(),
        "Accept-Language: en-US,en;q=0.9".to_string(),
        "Sec-Fetch-Mode: navigate".to_string(),
    ]
}

/// ffmpeg invocation settings for the trim stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_transcoder_binary")]
    pub binary: String,
    #[serde(default = "default_transcoder_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl TranscoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            binary: default_transcoder_binary(),
            timeout_secs: default_transcoder_timeout_secs(),
            bitrate: default_bitrate(),
            sample_rate: default_sample_rate(),
        }
    }
}

fn default_transcoder_binary() -> String {
    "ffmpeg".to_string()
}

fn default_transcoder_timeout_secs() -> u64 {
    60
}

fn default_bitrate() -> String {
    "128k".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

/// URL bases used to build Vimeo fallback candidates
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VimeoConfig {
    #[serde(default = "default_page_base")]
    pub page_base: String,
    #[serde(default = "default_player_base")]
    pub player_base: String,
}

impl Default for VimeoConfig {
    fn default() -> Self {
        Self {
            page_base: default_page_base(),
            player_base: default_player_base(),
        }
    }
}

fn default_page_base() -> String {
    "https://vimeo.com".to_string()
}

fn default_player_base() -> String {
    "https://player.vimeo.com/video".to_string()
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Default `tracing` filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
