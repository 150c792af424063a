use url::Url;

use super::traits::CandidateStrategy;
use super::types::{CandidatePlan, Rationale};
use crate::error::InputError;
use crate::media::DownloadRequest;

/// Hands the caller's URL to the extractor verbatim.
///
/// Suitable for any site the extractor understands; there is no fallback
/// list, so a failure is reported after a single attempt.
#[derive(Debug, Clone, Default)]
pub struct GenericStrategy;

impl GenericStrategy {
    pub fn new() -> Self {
        Self
    }

    fn derive_identifier(url: &Url) -> String {
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_owned)
            .or_else(|| url.host_str().map(str::to_owned))
            .unwrap_or_else(|| "media".to_string())
    }
}

impl CandidateStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn supports(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https")
    }

    fn plan(&self, request: &DownloadRequest) -> Result<CandidatePlan, InputError> {
        let source = request.source_url.trim();
        if source.is_empty() {
            return Err(InputError::MissingUrl);
        }

        let url = Url::parse(source).map_err(|e| InputError::InvalidUrl(e.to_string()))?;
        if !self.supports(&url) {
            return Err(InputError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let identifier = request
            .explicit_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Self::derive_identifier(&url));

        let mut plan = CandidatePlan::new(identifier, None);
        plan.push(source, Rationale::Original);
        Ok(plan)
    }
}
