//! Candidate URL derivation.
//!
//! A [`CandidateStrategy`] turns a [`DownloadRequest`](crate::media::DownloadRequest)
//! into an ordered [`CandidatePlan`]. The orchestrator walks the plan front to
//! back and stops at the first URL the extractor can turn into audio.
//!
//! - [`VimeoStrategy`] knows Vimeo's page/player/hash URL shapes
//! - [`GenericStrategy`] passes the caller's URL through unchanged
//! - [`StrategyRegistry`] selects one by name, or by host with `"auto"`

mod generic;
mod registry;
mod traits;
mod types;
mod vimeo;

pub use generic::GenericStrategy;
pub use registry::{AUTO, StrategyRegistry};
pub use traits::CandidateStrategy;
pub use types::{CandidatePlan, CandidateUrl, Rationale};
pub use vimeo::VimeoStrategy;
