//! Request pipeline: fetch full audio, optionally trim it, or just probe.

mod attempt;
mod fetch;
mod finalize;
mod metadata;

pub use attempt::{AttemptOutcome, AttemptResult};
pub use fetch::{FetchOrchestrator, Fetched};
pub use finalize::{ArtifactLifecycleManager, FinalizeError};
pub use metadata::{MediaInfo, MetadataProbe};
