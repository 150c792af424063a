use url::Url;

use super::types::CandidatePlan;
use crate::error::InputError;
use crate::media::DownloadRequest;

/// Derives the ordered candidate URLs for a request.
///
/// Implementations encode what one hosting platform knows about its own URL
/// shapes. A strategy never touches the network or the filesystem.
pub trait CandidateStrategy: Send + Sync {
    /// Registry name, also used in config (`downloads.strategy`).
    fn name(&self) -> &'static str;

    /// Whether `auto` resolution should pick this strategy for `url`.
    fn supports(&self, url: &Url) -> bool;

    /// Build the fallback plan, highest priority first.
    fn plan(&self, request: &DownloadRequest) -> Result<CandidatePlan, InputError>;

    /// Referer header the extractor should send for this platform.
    fn referer(&self) -> Option<&str> {
        None
    }
}
