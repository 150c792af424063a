use serde::Serialize;

use crate::sources::CandidateUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    /// The extractor failed to start, exited non-zero or timed out.
    ProcessError,
    /// The extractor exited cleanly but left no usable file.
    EmptyOutput,
}

/// Diagnostic record of one candidate attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub candidate: CandidateUrl,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl AttemptResult {
    pub fn success(candidate: CandidateUrl) -> Self {
        Self {
            candidate,
            outcome: AttemptOutcome::Success,
            error_detail: None,
        }
    }

    pub fn process_error(candidate: CandidateUrl, detail: impl Into<String>) -> Self {
        Self {
            candidate,
            outcome: AttemptOutcome::ProcessError,
            error_detail: Some(detail.into()),
        }
    }

    pub fn empty_output(candidate: CandidateUrl) -> Self {
        Self {
            candidate,
            outcome: AttemptOutcome::EmptyOutput,
            error_detail: Some("extractor exited successfully but produced no audio".to_string()),
        }
    }
}
