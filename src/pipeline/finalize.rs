use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{DownloadError, Error, InputError, ProcessError};
use crate::humanize::ByteSize;
use crate::media::{AudioFormat, ClipRange, format_seconds};
use crate::observability::Metrics;
use crate::storage::{Artifact, ArtifactKind, RequestScope};
use crate::tools::{TRANSCODER_TOOL, Transcoder, TrimJob};

#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    /// The range was rejected before any work; the full artifact is handed
    /// back untouched and remains the caller's to release.
    #[error("{error}")]
    Rejected { error: InputError, artifact: Artifact },

    #[error(transparent)]
    Failed(#[from] Error),
}

impl FinalizeError {
    /// Collapse into a crate error, releasing any handed-back artifact.
    pub fn into_error(self) -> Error {
        match self {
            FinalizeError::Rejected { error, artifact } => {
                drop(artifact);
                error.into()
            }
            FinalizeError::Failed(error) => error,
        }
    }
}

/// Decides whether a full download is served as is or cut down to a clip.
#[derive(Clone)]
pub struct ArtifactLifecycleManager {
    transcoder: Arc<dyn Transcoder>,
    metrics: Arc<Metrics>,
}

impl ArtifactLifecycleManager {
    pub fn new(transcoder: Arc<dyn Transcoder>, metrics: Arc<Metrics>) -> Self {
        Self { transcoder, metrics }
    }

    /// Produce the artifact that should be streamed for this request.
    ///
    /// With a usable range the full artifact is released as soon as the
    /// transcoder terminates, whatever the outcome, so at most one of the two
    /// files is live when this returns.
    pub async fn finalize(
        &self,
        full: Artifact,
        range: Option<ClipRange>,
        format: AudioFormat,
        scope: &RequestScope,
    ) -> Result<Artifact, FinalizeError> {
        let Some(range) = range else {
            return Ok(full);
        };

        let duration = range.duration();
        if duration <= 0.0 {
            return Err(FinalizeError::Rejected {
                error: InputError::InvalidRange(format!(
                    "endTime ({}) must be greater than startTime ({})",
                    format_seconds(range.end),
                    format_seconds(range.start)
                )),
                artifact: full,
            });
        }

        let output = scope.clip_path(format.extension());
        info!(
            token = %scope.token(),
            start = range.start,
            end = range.end,
            duration,
            "Creating audio chunk"
        );

        let result = {
            let job = TrimJob {
                input: full.path(),
                output: &output,
                start: range.start,
                duration,
                format,
            };
            self.transcoder.trim(&job).await
        };

        if let Err(e) = full.release() {
            warn!(token = %scope.token(), error = %e, "Failed to release full artifact");
        }

        if let Err(e) = result.and_then(|output| output.check(TRANSCODER_TOOL, scope.dir())) {
            discard_clip(scope).await;
            return Err(Error::from(ProcessError::TrimFailed {
                detail: trim_detail(e),
            })
            .into());
        }

        match Artifact::adopt(output, ArtifactKind::TrimmedAudio).await {
            Ok(Some(clip)) => {
                self.metrics.clip_created();
                info!(size = %ByteSize(clip.size_bytes()), "Audio chunk created");
                Ok(clip)
            }
            Ok(None) => {
                discard_clip(scope).await;
                Err(Error::from(DownloadError::TrimProducedEmptyOutput).into())
            }
            Err(e) => {
                discard_clip(scope).await;
                Err(Error::from(e).into())
            }
        }
    }
}

fn trim_detail(error: ProcessError) -> String {
    match error {
        ProcessError::Exited { detail, .. } => detail,
        other => other.to_string(),
    }
}

async fn discard_clip(scope: &RequestScope) {
    if let Err(e) = scope.remove_clip_leftovers().await {
        warn!(token = %scope.token(), error = %e, "Failed to remove clip leftovers");
    }
}
