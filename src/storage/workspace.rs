use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::artifact::remove_if_exists;

const MAX_SLUG_LEN: usize = 40;

/// The shared ephemeral directory all requests write into.
///
/// File names are request-unique, so concurrent requests never contend for
/// a path and no locking is needed.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed.
    pub async fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Whether a file can currently be created and removed in the directory.
    pub async fn is_writable(&self) -> bool {
        let probe = self.dir.join(format!(".probe-{}", Uuid::new_v4()));
        if fs::write(&probe, b"ok").await.is_err() {
            return false;
        }
        remove_if_exists(&probe).await.is_ok()
    }

    /// Mint a fresh scope for one request.
    pub fn scope(&self, identifier: &str) -> RequestScope {
        RequestScope {
            token: Uuid::now_v7(),
            dir: self.dir.clone(),
            slug: slugify(identifier),
        }
    }
}

/// Request-scoped path factory keyed by a time-ordered UUID.
#[derive(Debug, Clone)]
pub struct RequestScope {
    token: Uuid,
    dir: PathBuf,
    slug: String,
}

impl RequestScope {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn stem(&self, part: &str) -> String {
        format!("{}-{}-{}", self.token, self.slug, part)
    }

    /// yt-dlp output template for the full download.
    pub fn full_template(&self) -> PathBuf {
        self.dir.join(format!("{}.%(ext)s", self.stem("full")))
    }

    /// Where the full download lands once converted to `ext`.
    pub fn full_path(&self, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem("full"), ext))
    }

    pub fn clip_path(&self, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem("clip"), ext))
    }

    /// Netscape cookie file passed to the extractor for this request.
    pub fn cookie_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.stem("cookies")))
    }

    /// Delete every file belonging to the `full` stem: the converted output
    /// plus partial downloads and intermediate containers.
    pub async fn remove_full_leftovers(&self) -> io::Result<usize> {
        self.remove_leftovers(&self.stem("full")).await
    }

    pub async fn remove_clip_leftovers(&self) -> io::Result<usize> {
        self.remove_leftovers(&self.stem("clip")).await
    }

    async fn remove_leftovers(&self, stem: &str) -> io::Result<usize> {
        let prefix = format!("{stem}.");
        let mut removed = 0;

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(&prefix) || entry.file_type().await?.is_dir() {
                continue;
            }
            if remove_if_exists(&entry.path()).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(token = %self.token, stem, removed, "Removed leftover files");
        }
        Ok(removed)
    }
}

/// Identifier reduced to characters safe in a file name.
fn slugify(identifier: &str) -> String {
    let slug: String = identifier
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_SLUG_LEN)
        .collect();
    if slug.is_empty() {
        "media".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("123456"), "123456");
        assert_eq!(slugify("../../etc/passwd"), "etcpasswd");
        assert_eq!(slugify("???"), "media");
        assert_eq!(slugify(&"a".repeat(100)).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_scopes_are_unique() {
        let workspace = Workspace::new("/work");
        let a = workspace.scope("123");
        let b = workspace.scope("123");

        assert_ne!(a.token(), b.token());
        assert_ne!(a.full_path("mp3"), b.full_path("mp3"));
    }

    #[test]
    fn test_scope_paths() {
        let workspace = Workspace::new("/work");
        let scope = workspace.scope("123");
        let token = scope.token();

        assert_eq!(
            scope.full_template(),
            PathBuf::from(format!("/work/{token}-123-full.%(ext)s"))
        );
        assert_eq!(scope.full_path("mp3"), PathBuf::from(format!("/work/{token}-123-full.mp3")));
        assert_eq!(scope.clip_path("ogg"), PathBuf::from(format!("/work/{token}-123-clip.ogg")));
        assert_eq!(scope.cookie_path(), PathBuf::from(format!("/work/{token}-123-cookies.txt")));
    }

    #[tokio::test]
    async fn test_remove_leftovers_only_touches_own_stem() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path());
        let scope = workspace.scope("42");
        let other = workspace.scope("42");

        let mine = [
            scope.full_path("mp3"),
            scope.full_path("webm.part"),
            scope.full_path("webm"),
        ];
        for path in &mine {
            fs::write(path, b"x").await.unwrap();
        }
        fs::write(scope.clip_path("mp3"), b"x").await.unwrap();
        fs::write(other.full_path("mp3"), b"x").await.unwrap();
        fs::write(scope.cookie_path(), b"x").await.unwrap();
        fs::create_dir(scope.full_path("d")).await.unwrap();

        assert_eq!(scope.remove_full_leftovers().await.unwrap(), 3);
        assert!(scope.cookie_path().exists());
        assert!(scope.full_path("d").is_dir());
        for path in &mine {
            assert!(!path.exists());
        }
        assert!(scope.clip_path("mp3").exists());
        assert!(other.full_path("mp3").exists());
    }

    #[tokio::test]
    async fn test_prepare_and_writable() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path().join("nested/work"));

        workspace.prepare().await.unwrap();
        assert!(workspace.is_writable().await);

        let missing = Workspace::new(temp_dir.path().join("does-not-exist"));
        assert!(!missing.is_writable().await);
    }
}
