use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate URL was derived; order of derivation encodes priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    HashQualifiedPlayer,
    Original,
    CanonicalPage,
    Player,
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rationale::HashQualifiedPlayer => "hash-qualified player URL",
            Rationale::Original => "original URL",
            Rationale::CanonicalPage => "canonical page URL",
            Rationale::Player => "fallback player URL",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUrl {
    pub url: String,
    pub rationale: Rationale,
}

/// Ordered fallback plan produced by a strategy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePlan {
    pub identifier: String,
    pub hash: Option<String>,
    pub candidates: Vec<CandidateUrl>,
}

impl CandidatePlan {
    pub fn new(identifier: impl Into<String>, hash: Option<String>) -> Self {
        Self {
            identifier: identifier.into(),
            hash,
            candidates: Vec::new(),
        }
    }

    /// Appends a candidate unless the same URL is already planned.
    pub fn push(&mut self, url: impl Into<String>, rationale: Rationale) -> &mut Self {
        let url = url.into();
        if !self.candidates.iter().any(|c| c.url == url) {
            self.candidates.push(CandidateUrl { url, rationale });
        }
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.url.clone()).collect()
    }
}
