//! Error taxonomy shared by the pipeline and the HTTP layer.
//!
//! - [`InputError`]: caller-supplied data is unusable. Never retried.
//! - [`ProcessError`]: an external tool failed to spawn, exited non-zero or
//!   timed out.
//! - [`DownloadError`]: a tool claimed success but produced nothing usable, or
//!   every candidate URL failed.

use std::io;
use thiserror::Error;

use crate::pipeline::AttemptResult;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing source URL")]
    MissingUrl,

    #[error("invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("could not extract a media identifier from URL")]
    IdentifierNotFound,

    #[error("invalid time range: {0}")]
    InvalidRange(String),

    #[error("unsupported audio format '{0}'")]
    UnsupportedFormat(String),

    #[error("unsupported quality tier '{0}'")]
    UnsupportedQuality(String),

    #[error("unknown source strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid cookies: {0}")]
    InvalidCookies(String),
}

impl InputError {
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::MissingUrl => "missing_url",
            InputError::InvalidUrl(_) => "invalid_url",
            InputError::IdentifierNotFound => "identifier_not_found",
            InputError::InvalidRange(_) => "invalid_range",
            InputError::UnsupportedFormat(_) => "unsupported_format",
            InputError::UnsupportedQuality(_) => "unsupported_quality",
            InputError::UnknownStrategy(_) => "unknown_strategy",
            InputError::InvalidCookies(_) => "invalid_cookies",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{tool} timed out after {seconds}s")]
    TimedOut { tool: &'static str, seconds: u64 },

    #[error("{tool} exited with {status}: {detail}")]
    Exited {
        tool: &'static str,
        status: String,
        detail: String,
    },

    #[error("failed to create audio chunk: {detail}")]
    TrimFailed { detail: String },
}

impl ProcessError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::Spawn { .. } => "tool_unavailable",
            ProcessError::TimedOut { .. } => "tool_timeout",
            ProcessError::Exited { .. } => "tool_failed",
            ProcessError::TrimFailed { .. } => "trim_failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("all {} candidate URLs failed for '{identifier}'", attempts.len())]
    AllCandidatesExhausted {
        identifier: String,
        hash: Option<String>,
        attempts: Vec<AttemptResult>,
    },

    #[error("audio chunk was not created or is empty")]
    TrimProducedEmptyOutput,

    #[error("extractor returned unreadable metadata: {0}")]
    InvalidMetadata(String),
}

impl DownloadError {
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::AllCandidatesExhausted { .. } => "all_candidates_exhausted",
            DownloadError::TrimProducedEmptyOutput => "trim_produced_empty_output",
            DownloadError::InvalidMetadata(_) => "invalid_metadata",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Input(e) => e.kind(),
            Error::Process(e) => e.kind(),
            Error::Download(e) => e.kind(),
            Error::Io(_) => "filesystem",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
