use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::error::{DownloadError, InputError, Result};
use crate::media::Cookies;
use crate::storage::{CookieFile, Workspace};
use crate::tools::{EXTRACTOR_TOOL, Extractor};

/// Summary of a media page as reported by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
    pub description: Option<String>,
    pub format_count: usize,
    pub platform: Option<String>,
    pub canonical_url: Option<String>,
    /// Direct URL of the first audio-only format, else of the first format.
    pub audio_url: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    uploader: Option<String>,
    upload_date: Option<String>,
    description: Option<String>,
    extractor_key: Option<String>,
    extractor: Option<String>,
    webpage_url: Option<String>,
    format: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    url: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
}

impl RawFormat {
    fn is_audio_only(&self) -> bool {
        self.acodec.as_deref().is_some_and(|c| c != "none") && self.vcodec.as_deref() == Some("none")
    }
}

impl MediaInfo {
    /// Parse the extractor's single-document JSON dump.
    pub fn from_json(json: &str) -> std::result::Result<Self, DownloadError> {
        let raw: RawInfo =
            serde_json::from_str(json).map_err(|e| DownloadError::InvalidMetadata(e.to_string()))?;

        let audio_url = raw
            .formats
            .iter()
            .find(|f| f.is_audio_only())
            .or_else(|| raw.formats.first())
            .and_then(|f| f.url.clone());

        Ok(Self {
            title: raw.title,
            duration: raw.duration,
            thumbnail: raw.thumbnail,
            uploader: raw.uploader,
            upload_date: raw.upload_date,
            description: raw.description,
            format_count: raw.formats.len(),
            platform: raw.extractor_key.or(raw.extractor),
            canonical_url: raw.webpage_url,
            audio_url,
            format: raw.format,
        })
    }
}

/// Metadata lookup without downloading anything.
#[derive(Clone)]
pub struct MetadataProbe {
    extractor: Arc<dyn Extractor>,
    workspace: Workspace,
}

impl MetadataProbe {
    pub fn new(extractor: Arc<dyn Extractor>, workspace: Workspace) -> Self {
        Self { extractor, workspace }
    }

    /// Look up `source_url`, authenticating with `cookies` when given.
    pub async fn probe(&self, source_url: &str, cookies: Option<&Cookies>) -> Result<MediaInfo> {
        let source = source_url.trim();
        if source.is_empty() {
            return Err(InputError::MissingUrl.into());
        }
        let url = Url::parse(source).map_err(|e| InputError::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(InputError::InvalidUrl(format!("unsupported scheme '{}'", url.scheme())).into());
        }

        let cookie_file = match (cookies, url.host_str()) {
            (Some(cookies), Some(host)) => {
                let scope = self.workspace.scope("probe");
                Some(CookieFile::write(&scope, cookies, host).await?)
            }
            _ => None,
        };

        info!(url = source, has_cookies = cookie_file.is_some(), "Probing metadata");
        let output = self
            .extractor
            .dump_json(source, cookie_file.as_ref().map(CookieFile::path))
            .await?
            .check(EXTRACTOR_TOOL, self.workspace.dir())?;

        let info = MediaInfo::from_json(&output.stdout)?;
        info!(
            title = info.title.as_deref().unwrap_or("-"),
            formats = info.format_count,
            "Metadata probe finished"
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ProcessError};
    use crate::tools::{ExtractJob, ToolOutput};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "title": "Sample talk",
        "duration": 125.4,
        "thumbnail": "https://i.vimeocdn.com/video/1.jpg",
        "uploader": "Someone",
        "upload_date": "20240102",
        "description": "A talk",
        "extractor": "vimeo",
        "extractor_key": "Vimeo",
        "webpage_url": "https://vimeo.com/123",
        "format": "hls-720p - 1280x720",
        "formats": [
            {"url": "https://cdn/video.mp4", "acodec": "mp4a.40.2", "vcodec": "avc1"},
            {"url": "https://cdn/audio.m4a", "acodec": "mp4a.40.2", "vcodec": "none"},
            {"url": "https://cdn/audio2.m4a", "acodec": "opus", "vcodec": "none"}
        ]
    }"#;

    struct CannedExtractor {
        output: ToolOutput,
        cookie_jar: Mutex<Option<(PathBuf, String)>>,
    }

    impl CannedExtractor {
        fn new(output: ToolOutput) -> Self {
            Self {
                output,
                cookie_jar: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Extractor for CannedExtractor {
        async fn extract(&self, _job: &ExtractJob<'_>) -> std::result::Result<ToolOutput, ProcessError> {
            Ok(ToolOutput::ok())
        }

        async fn dump_json(&self, _target: &str, cookies: Option<&Path>) -> std::result::Result<ToolOutput, ProcessError> {
            if let Some(path) = cookies {
                let jar = std::fs::read_to_string(path).unwrap();
                *self.cookie_jar.lock().unwrap() = Some((path.to_path_buf(), jar));
            }
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_from_json() {
        let info = MediaInfo::from_json(SAMPLE).unwrap();

        assert_eq!(info.title.as_deref(), Some("Sample talk"));
        assert_eq!(info.duration, Some(125.4));
        assert_eq!(info.format_count, 3);
        assert_eq!(info.platform.as_deref(), Some("Vimeo"));
        assert_eq!(info.canonical_url.as_deref(), Some("https://vimeo.com/123"));
        assert_eq!(info.audio_url.as_deref(), Some("https://cdn/audio.m4a"));
    }

    #[test]
    fn test_audio_url_falls_back_to_first_format() {
        let json = r#"{"title": "x", "formats": [{"url": "https://cdn/a.mp4", "acodec": "aac", "vcodec": "h264"}]}"#;
        let info = MediaInfo::from_json(json).unwrap();
        assert_eq!(info.audio_url.as_deref(), Some("https://cdn/a.mp4"));

        let info = MediaInfo::from_json(r#"{"title": "x"}"#).unwrap();
        assert_eq!(info.format_count, 0);
        assert!(info.audio_url.is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            MediaInfo::from_json("not json"),
            Err(DownloadError::InvalidMetadata(_))
        ));
    }

    #[tokio::test]
    async fn test_probe() {
        let output = ToolOutput {
            stdout: SAMPLE.to_string(),
            ..ToolOutput::ok()
        };
        let probe = MetadataProbe::new(Arc::new(CannedExtractor::new(output)), Workspace::new("/tmp"));

        let info = probe.probe("https://vimeo.com/123", None).await.unwrap();
        assert_eq!(info.uploader.as_deref(), Some("Someone"));
    }

    #[tokio::test]
    async fn test_probe_with_cookies_removes_jar() {
        let temp_dir = TempDir::new().unwrap();
        let output = ToolOutput {
            stdout: SAMPLE.to_string(),
            ..ToolOutput::ok()
        };
        let extractor = Arc::new(CannedExtractor::new(output));
        let probe = MetadataProbe::new(extractor.clone(), Workspace::new(temp_dir.path()));
        let cookies = Cookies::parse("sid=xyz").unwrap().unwrap();

        probe
            .probe("https://www.masterclass.com/classes/x", Some(&cookies))
            .await
            .unwrap();

        let (path, jar) = extractor.cookie_jar.lock().unwrap().clone().unwrap();
        assert!(jar.contains(".masterclass.com\tTRUE\t/\tTRUE\t0\tsid\txyz"));
        assert!(!path.exists());
        assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_probe_failures() {
        let probe = MetadataProbe::new(
            Arc::new(CannedExtractor::new(ToolOutput::failed(1, "ERROR: Unsupported URL"))),
            Workspace::new("/tmp"),
        );

        assert!(matches!(
            probe.probe("  ", None).await,
            Err(Error::Input(InputError::MissingUrl))
        ));
        assert!(matches!(
            probe.probe("ftp://example.com/a", None).await,
            Err(Error::Input(InputError::InvalidUrl(_)))
        ));

        let err = probe.probe("https://example.com/a", None).await.unwrap_err();
        assert_eq!(err.kind(), "tool_failed");
    }
}
