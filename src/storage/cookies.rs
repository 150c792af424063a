use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::artifact::unlink;
use super::workspace::RequestScope;
use crate::media::Cookies;

/// A request's cookie jar written out for the extractor.
///
/// Deleted when dropped, so it never outlives the tool runs that read it.
#[derive(Debug)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    /// Write `cookies` for `host` to the scope's cookie path, readable only
    /// by the service user.
    pub async fn write(scope: &RequestScope, cookies: &Cookies, host: &str) -> io::Result<Self> {
        let path = scope.cookie_path();
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await?;
        // Guard first, so a failed write still removes the file
        let guard = Self { path };
        file.write_all(cookies.to_netscape(host).as_bytes()).await?;
        file.flush().await?;

        debug!(token = %scope.token(), cookies = cookies.len(), "Cookie file written");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CookieFile {
    fn drop(&mut self) {
        if let Err(e) = unlink(&self.path) {
            warn!(error = %e, "Failed to remove cookie file");
        }
    }
}
