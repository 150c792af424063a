use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "CLIPFETCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/clipfetch.toml";
const ENV_PREFIX: &str = "CLIPFETCH";
const ENV_SEPARATOR: &str = "__";
const PORT_ENV_VAR: &str = "PORT";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(config_path)?;
    apply_port_override(&mut config, env::var(PORT_ENV_VAR).ok().as_deref());

    Ok(config)
}

/// Hosting platforms commonly inject a bare `PORT`; it only replaces the port
/// of the configured bind address.
fn apply_port_override(config: &mut Config, port: Option<&str>) {
    let Some(raw) = port else { return };
    match raw.trim().parse::<u16>() {
        Ok(port) => config.server.bind_addr.set_port(port),
        Err(_) => tracing::warn!(value = raw, "Ignoring unparseable PORT"),
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // CLIPFETCH__EXTRACTOR__TIMEOUT_SECS -> extractor.timeout_secs
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.port(), 3000);
        assert_eq!(config.extractor.binary, "yt-dlp");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"
max_body_bytes = "16KB"

[downloads]
work_dir = "/var/tmp/clips"
backoff_ms = 250
strategy = "generic"

[extractor]
binary = "/opt/bin/yt-dlp"
timeout_secs = 300
extra_headers = ["Accept: audio/*"]

[transcoder]
bitrate = "192k"
sample_rate = 48000
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.server.max_body_bytes.as_u64(), 16 * 1024);
        assert_eq!(config.downloads.work_dir, PathBuf::from("/var/tmp/clips"));
        assert_eq!(config.downloads.backoff_ms, 250);
        assert_eq!(config.downloads.strategy, "generic");
        assert_eq!(config.extractor.binary, "/opt/bin/yt-dlp");
        assert_eq!(config.extractor.timeout_secs, 300);
        assert_eq!(config.extractor.extra_headers, vec!["Accept: audio/*"]);
        // Untouched keys keep their defaults
        assert_eq!(config.extractor.retries, 3);
        assert_eq!(config.transcoder.bitrate, "192k");
        assert_eq!(config.transcoder.sample_rate, 48000);
        assert_eq!(config.transcoder.binary, "ffmpeg");
    }

    // Environment overrides are not exercised here: env::set_var is unsafe
    // under edition 2024 and races with parallel tests.

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        apply_port_override(&mut config, Some("8081"));
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8081");

        apply_port_override(&mut config, Some("not-a-port"));
        assert_eq!(config.server.bind_addr.port(), 8081);

        apply_port_override(&mut config, None);
        assert_eq!(config.server.bind_addr.port(), 8081);
    }
}
