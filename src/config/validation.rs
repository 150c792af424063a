use super::models::Config;
use thiserror::Error;
use url::Url;

const KNOWN_STRATEGIES: &[&str] = &["auto", "vimeo", "generic"];
const MAX_EXTRACTOR_TIMEOUT_SECS: u64 = 30 * 60;
const MAX_TRANSCODER_TIMEOUT_SECS: u64 = 10 * 60;
const MAX_BACKOFF_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyValue { field: &'static str },

    #[error("{field} must be between 1 and {max} seconds, got {value}")]
    InvalidTimeout {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("downloads.backoff_ms ({0}) exceeds {MAX_BACKOFF_MS}ms")]
    BackoffTooLong(u64),

    #[error("Unknown source strategy '{0}', expected one of: auto, vimeo, generic")]
    UnknownStrategy(String),

    #[error("transcoder.bitrate '{0}' must look like '128k'")]
    InvalidBitrate(String),

    #[error("transcoder.sample_rate must be positive")]
    InvalidSampleRate,

    #[error("{field} '{value}' is not an http(s) URL")]
    InvalidBaseUrl { field: &'static str, value: String },

    #[error("extractor.extra_headers entry '{0}' must look like 'Name: value'")]
    InvalidHeader(String),

    #[error("server.max_body_bytes must be positive")]
    InvalidBodyLimit,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_downloads(config)?;
    validate_extractor(config)?;
    validate_transcoder(config)?;
    validate_vimeo(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_body_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidBodyLimit);
    }
    Ok(())
}

fn validate_downloads(config: &Config) -> Result<(), ValidationError> {
    if config.downloads.work_dir.as_os_str().is_empty() {
        return Err(ValidationError::EmptyValue {
            field: "downloads.work_dir",
        });
    }

    if config.downloads.backoff_ms > MAX_BACKOFF_MS {
        return Err(ValidationError::BackoffTooLong(config.downloads.backoff_ms));
    }

    if !KNOWN_STRATEGIES.contains(&config.downloads.strategy.as_str()) {
        return Err(ValidationError::UnknownStrategy(
            config.downloads.strategy.clone(),
        ));
    }

    Ok(())
}

fn validate_extractor(config: &Config) -> Result<(), ValidationError> {
    let extractor = &config.extractor;

    if extractor.binary.trim().is_empty() {
        return Err(ValidationError::EmptyValue {
            field: "extractor.binary",
        });
    }

    check_timeout("extractor.timeout_secs", extractor.timeout_secs, MAX_EXTRACTOR_TIMEOUT_SECS)?;
    check_timeout(
        "extractor.probe_timeout_secs",
        extractor.probe_timeout_secs,
        MAX_EXTRACTOR_TIMEOUT_SECS,
    )?;

    for header in &extractor.extra_headers {
        let valid = header
            .split_once(':')
            .map(|(name, _)| !name.trim().is_empty() && !name.contains(char::is_whitespace))
            .unwrap_or(false);
        if !valid {
            return Err(ValidationError::InvalidHeader(header.clone()));
        }
    }

    Ok(())
}

fn validate_transcoder(config: &Config) -> Result<(), ValidationError> {
    let transcoder = &config.transcoder;

    if transcoder.binary.trim().is_empty() {
        return Err(ValidationError::EmptyValue {
            field: "transcoder.binary",
        });
    }

    check_timeout(
        "transcoder.timeout_secs",
        transcoder.timeout_secs,
        MAX_TRANSCODER_TIMEOUT_SECS,
    )?;

    let digits = transcoder
        .bitrate
        .strip_suffix('k')
        .or_else(|| transcoder.bitrate.strip_suffix('K'));
    let bitrate_ok = digits
        .map(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()) && d != "0")
        .unwrap_or(false);
    if !bitrate_ok {
        return Err(ValidationError::InvalidBitrate(transcoder.bitrate.clone()));
    }

    if transcoder.sample_rate == 0 {
        return Err(ValidationError::InvalidSampleRate);
    }

    Ok(())
}

fn validate_vimeo(config: &Config) -> Result<(), ValidationError> {
    for (field, value) in [
        ("vimeo.page_base", &config.vimeo.page_base),
        ("vimeo.player_base", &config.vimeo.player_base),
    ] {
        let ok = Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !ok {
            return Err(ValidationError::InvalidBaseUrl {
                field,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

fn check_timeout(field: &'static str, value: u64, max: u64) -> Result<(), ValidationError> {
    if value == 0 || value > max {
        return Err(ValidationError::InvalidTimeout { field, value, max });
    }
    Ok(())
}
