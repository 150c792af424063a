use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::attempt::AttemptResult;
use crate::error::{DownloadError, InputError, Result};
use crate::humanize::ByteSize;
use crate::media::{Cookies, DownloadRequest};
use crate::observability::Metrics;
use crate::sources::StrategyRegistry;
use crate::storage::{Artifact, ArtifactKind, CookieFile, RequestScope, Workspace};
use crate::tools::{EXTRACTOR_TOOL, ExtractJob, Extractor};

/// Result of a successful fetch.
#[derive(Debug)]
pub struct Fetched {
    pub artifact: Artifact,
    pub identifier: String,
    pub hash: Option<String>,
    pub attempts: Vec<AttemptResult>,
    /// Scope the artifact was written under; later stages derive their paths from it.
    pub scope: RequestScope,
}

/// Walks a request's candidate URLs until one yields audio.
#[derive(Clone)]
pub struct FetchOrchestrator {
    extractor: Arc<dyn Extractor>,
    strategies: Arc<StrategyRegistry>,
    strategy: String,
    backoff: Duration,
    metrics: Arc<Metrics>,
}

impl FetchOrchestrator {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        strategies: Arc<StrategyRegistry>,
        strategy: impl Into<String>,
        backoff: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            extractor,
            strategies,
            strategy: strategy.into(),
            backoff,
            metrics,
        }
    }

    /// Download the request's source as a full-length audio artifact.
    ///
    /// Candidates are tried strictly in order, one extractor process at a
    /// time. Each failed attempt's files are removed before the next one
    /// starts. A process failure is followed by the backoff pause unless it
    /// was the last candidate; an empty result moves on immediately.
    pub async fn fetch(&self, request: &DownloadRequest, workspace: &Workspace) -> Result<Fetched> {
        let strategy = self.strategies.resolve(&self.strategy, &request.source_url)?;
        let plan = strategy.plan(request)?;
        let total = plan.candidates.len();
        let scope = workspace.scope(&plan.identifier);

        info!(
            token = %scope.token(),
            strategy = strategy.name(),
            identifier = %plan.identifier,
            has_hash = plan.hash.is_some(),
            has_cookies = request.cookies.is_some(),
            candidates = total,
            "Planned candidate URLs"
        );

        // Lives until fetch returns; every attempt reads the same jar
        let cookie_file = match &request.cookies {
            Some(cookies) => Some(write_cookie_file(&scope, cookies, &request.source_url).await?),
            None => None,
        };

        let template = scope.full_template();
        let expected = scope.full_path(request.format.extractor_extension());
        let mut attempts = Vec::with_capacity(total);

        for (index, candidate) in plan.candidates.iter().enumerate() {
            let attempt = index + 1;
            self.metrics.attempt_made();
            info!(
                attempt,
                total,
                url = %candidate.url,
                rationale = %candidate.rationale,
                "Trying candidate"
            );

            let job = ExtractJob {
                target: &candidate.url,
                output_template: &template,
                format: request.format,
                quality: request.quality,
                referer: strategy.referer(),
                cookies: cookie_file.as_ref().map(CookieFile::path),
            };

            let outcome = self
                .extractor
                .extract(&job)
                .await
                .and_then(|output| output.check(EXTRACTOR_TOOL, scope.dir()));

            match outcome {
                Ok(_) => match Artifact::adopt(expected.clone(), ArtifactKind::FullAudio).await {
                    Ok(Some(artifact)) => {
                        info!(
                            attempt,
                            url = %candidate.url,
                            size = %ByteSize(artifact.size_bytes()),
                            "Download succeeded"
                        );
                        attempts.push(AttemptResult::success(candidate.clone()));
                        return Ok(Fetched {
                            artifact,
                            identifier: plan.identifier,
                            hash: plan.hash,
                            attempts,
                            scope: scope.clone(),
                        });
                    }
                    Ok(None) => {
                        warn!(attempt, url = %candidate.url, "Extractor succeeded but the file is missing or empty");
                        discard_leftovers(&scope).await;
                        attempts.push(AttemptResult::empty_output(candidate.clone()));
                    }
                    Err(e) => {
                        warn!(attempt, url = %candidate.url, error = %e, "Could not inspect extractor output");
                        discard_leftovers(&scope).await;
                        return Err(e.into());
                    }
                },
                Err(e) => {
                    warn!(attempt, url = %candidate.url, error = %e, "Attempt failed");
                    discard_leftovers(&scope).await;
                    attempts.push(AttemptResult::process_error(candidate.clone(), e.to_string()));

                    if attempt < total && !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        warn!(
            identifier = %plan.identifier,
            attempts = attempts.len(),
            "All candidate URLs failed"
        );
        Err(DownloadError::AllCandidatesExhausted {
            identifier: plan.identifier,
            hash: plan.hash,
            attempts,
        }
        .into())
    }
}

async fn write_cookie_file(scope: &RequestScope, cookies: &Cookies, source_url: &str) -> Result<CookieFile> {
    let url = Url::parse(source_url).map_err(|e| InputError::InvalidUrl(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| InputError::InvalidUrl("URL has no host".to_string()))?;
    Ok(CookieFile::write(scope, cookies, host).await?)
}

async fn discard_leftovers(scope: &RequestScope) {
    if let Err(e) = scope.remove_full_leftovers().await {
        warn!(token = %scope.token(), error = %e, "Failed to remove attempt leftovers");
    }
}
