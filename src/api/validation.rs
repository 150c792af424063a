use super::models::DownloadAudioPayload;
use crate::error::InputError;
use crate::media::{AudioFormat, ClipRange, Cookies, DownloadRequest, QualityTier};

/// Turn a decoded request body into a pipeline request.
///
/// Range ordering is deliberately not checked here; see
/// [`ArtifactLifecycleManager::finalize`](crate::pipeline::ArtifactLifecycleManager::finalize).
pub fn download_request(payload: DownloadAudioPayload) -> Result<DownloadRequest, InputError> {
    let source_url = payload
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(InputError::MissingUrl)?;

    let format = match payload.format.as_deref().map(str::trim) {
        None | Some("") => AudioFormat::default(),
        Some(name) => name.parse()?,
    };
    let quality = match payload.quality.as_deref().map(str::trim) {
        None | Some("") => QualityTier::default(),
        Some(name) => name.parse()?,
    };
    let range = ClipRange::from_bounds(payload.start_time, payload.end_time)?;
    let explicit_id = payload
        .video_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    let cookies = match payload.cookies.as_deref() {
        Some(raw) => Cookies::parse(raw)?,
        None => None,
    };

    Ok(DownloadRequest {
        source_url,
        explicit_id,
        format,
        quality,
        range,
        cookies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(url: &str) -> DownloadAudioPayload {
        DownloadAudioPayload {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn download_request_applies_defaults() {
        let request = download_request(payload(" https://vimeo.com/1 ")).unwrap();

        assert_eq!(request.source_url, "https://vimeo.com/1");
        assert_eq!(request.format, AudioFormat::Mp3);
        assert_eq!(request.quality, QualityTier::Best);
        assert!(request.range.is_none());
        assert!(request.explicit_id.is_none());
    }

    #[test]
    fn download_request_requires_url() {
        assert!(matches!(
            download_request(DownloadAudioPayload::default()),
            Err(InputError::MissingUrl)
        ));
        assert!(matches!(download_request(payload("   ")), Err(InputError::MissingUrl)));
    }

    #[test]
    fn download_request_keeps_inverted_range() {
        let request = download_request(DownloadAudioPayload {
            start_time: Some(30.0),
            end_time: Some(10.0),
            ..payload("https://vimeo.com/1")
        })
        .unwrap();

        let range = request.range.unwrap();
        assert_eq!((range.start, range.end), (30.0, 10.0));
    }

    #[test]
    fn download_request_rejects_bad_fields() {
        let lone_start = DownloadAudioPayload {
            start_time: Some(5.0),
            ..payload("https://vimeo.com/1")
        };
        assert!(matches!(
            download_request(lone_start),
            Err(InputError::InvalidRange(_))
        ));

        let bad_format = DownloadAudioPayload {
            format: Some("mp4".to_string()),
            ..payload("https://vimeo.com/1")
        };
        assert!(matches!(
            download_request(bad_format),
            Err(InputError::UnsupportedFormat(_))
        ));

        let bad_quality = DownloadAudioPayload {
            quality: Some("lossless".to_string()),
            video_id: Some("1".to_string()),
            ..payload("https://vimeo.com/1")
        };
        assert!(matches!(
            download_request(bad_quality),
            Err(InputError::UnsupportedQuality(_))
        ));
    }

    #[test]
    fn download_request_parses_cookies() {
        let request = download_request(DownloadAudioPayload {
            cookies: Some("sid=abc; theme=dark".to_string()),
            ..payload("https://www.masterclass.com/classes/x")
        })
        .unwrap();
        assert_eq!(request.cookies.map(|c| c.len()), Some(2));

        let blank = download_request(DownloadAudioPayload {
            cookies: Some("  ".to_string()),
            ..payload("https://vimeo.com/1")
        })
        .unwrap();
        assert!(blank.cookies.is_none());

        let broken = DownloadAudioPayload {
            cookies: Some("sid=a\nb".to_string()),
            ..payload("https://vimeo.com/1")
        };
        assert!(matches!(
            download_request(broken),
            Err(InputError::InvalidCookies(_))
        ));
    }
}
