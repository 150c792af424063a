use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::traits::CandidateStrategy;
use super::types::{CandidatePlan, Rationale};
use crate::config::VimeoConfig;
use crate::error::InputError;
use crate::media::DownloadRequest;

/// Path shapes in priority order: canonical video page, embedded player,
/// bare page id, any `video/<id>` segment, numeric segment before a query,
/// trailing numeric segment.
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"vimeo\.com/video/(\d+)",
        r"player\.vimeo\.com/video/(\d+)",
        r"vimeo\.com/(\d+)",
        r"video/(\d+)",
        r"/(\d+)\?",
        r"/(\d+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static identifier pattern"))
    .collect()
});

static HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]h=([a-f0-9]+)").expect("static hash pattern"));

const REFERER: &str = "https://vimeo.com/";

/// Candidate derivation for Vimeo pages and players.
///
/// Private and unlisted videos are frequently only reachable through the
/// player URL carrying the `h` hash, so that form is tried first when present.
#[derive(Debug, Clone)]
pub struct VimeoStrategy {
    page_base: String,
    player_base: String,
}

impl VimeoStrategy {
    pub fn new(config: &VimeoConfig) -> Self {
        Self {
            page_base: config.page_base.trim_end_matches('/').to_string(),
            player_base: config.player_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn extract_id(url: &str) -> Option<String> {
        ID_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_hash(url: &str) -> Option<String> {
        HASH_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for VimeoStrategy {
    fn default() -> Self {
        Self::new(&VimeoConfig::default())
    }
}

impl CandidateStrategy for VimeoStrategy {
    fn name(&self) -> &'static str {
        "vimeo"
    }

    fn supports(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| {
                let host = host.to_ascii_lowercase();
                host == "vimeo.com" || host.ends_with(".vimeo.com")
            })
            .unwrap_or(false)
    }

    fn plan(&self, request: &DownloadRequest) -> Result<CandidatePlan, InputError> {
        let source = request.source_url.trim();
        if source.is_empty() {
            return Err(InputError::MissingUrl);
        }

        let identifier = request
            .explicit_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .or_else(|| Self::extract_id(source))
            .ok_or(InputError::IdentifierNotFound)?;
        let hash = Self::extract_hash(source);

        let mut plan = CandidatePlan::new(identifier.clone(), hash.clone());
        if let Some(hash) = &hash {
            plan.push(
                format!("{}/{}?h={}", self.player_base, identifier, hash),
                Rationale::HashQualifiedPlayer,
            );
        }
        plan.push(source, Rationale::Original)
            .push(format!("{}/{}", self.page_base, identifier), Rationale::CanonicalPage)
            .push(format!("{}/{}", self.player_base, identifier), Rationale::Player);

        Ok(plan)
    }

    fn referer(&self) -> Option<&str> {
        Some(REFERER)
    }
}
