//! Request-level domain types: what the caller asked for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// Immutable per-request input to the pipeline.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub source_url: String,
    pub explicit_id: Option<String>,
    pub format: AudioFormat,
    pub quality: QualityTier,
    pub range: Option<ClipRange>,
    pub cookies: Option<Cookies>,
}

impl DownloadRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            explicit_id: None,
            format: AudioFormat::default(),
            quality: QualityTier::default(),
            range: None,
            cookies: None,
        }
    }

    pub fn with_explicit_id(mut self, id: impl Into<String>) -> Self {
        self.explicit_id = Some(id.into());
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_range(mut self, range: ClipRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_cookies(mut self, cookies: Cookies) -> Self {
        self.cookies = Some(cookies);
        self
    }
}

/// Browser cookies in `Cookie` header form (`name=value; name2=value2`).
///
/// `Debug` never prints the values.
#[derive(Clone, PartialEq)]
pub struct Cookies(Vec<(String, String)>);

impl Cookies {
    /// Parse a header-style cookie string. Blank input is `None`; segments
    /// without `=` are skipped.
    pub fn parse(raw: &str) -> Result<Option<Self>, InputError> {
        let mut pairs = Vec::new();
        for segment in raw.split(';') {
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                continue;
            }
            if name.chars().chain(value.chars()).any(char::is_control) {
                return Err(InputError::InvalidCookies(format!(
                    "cookie '{name}' contains control characters"
                )));
            }
            pairs.push((name.to_string(), value.to_string()));
        }

        Ok(if pairs.is_empty() { None } else { Some(Self(pairs)) })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a Netscape cookie file scoped to `host` and its subdomains.
    pub fn to_netscape(&self, host: &str) -> String {
        let domain = format!(".{}", host.trim_start_matches("www."));
        let mut jar = String::from("# Netscape HTTP Cookie File\n");
        for (name, value) in &self.0 {
            jar.push_str(&format!("{domain}\tTRUE\t/\tTRUE\t0\t{name}\t{value}\n"));
        }
        jar
    }
}

impl fmt::Debug for Cookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cookies(<{} redacted>)", self.0.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Aac,
    Opus,
    Vorbis,
    Flac,
    Wav,
}

impl AudioFormat {
    /// Name passed to `yt-dlp --audio-format`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Aac => "aac",
            AudioFormat::Opus => "opus",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// Extension of served files and trimmed clips.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Vorbis => "ogg",
            other => other.as_str(),
        }
    }

    /// Extension yt-dlp gives the file after `-x --audio-format`.
    ///
    /// yt-dlp names raw ADTS output `.m4a`, so this differs from
    /// [`extension`](Self::extension) for `aac`.
    pub fn extractor_extension(&self) -> &'static str {
        match self {
            AudioFormat::Aac => "m4a",
            other => other.extension(),
        }
    }

    /// ffmpeg audio encoder used when trimming into this format.
    pub fn encoder(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::M4a | AudioFormat::Aac => "aac",
            AudioFormat::Opus => "libopus",
            AudioFormat::Vorbis => "libvorbis",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "pcm_s16le",
        }
    }

    /// Lossless encoders ignore `-b:a`.
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioFormat::Flac | AudioFormat::Wav)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Opus | AudioFormat::Vorbis => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "m4a" => Ok(AudioFormat::M4a),
            "aac" => Ok(AudioFormat::Aac),
            "opus" => Ok(AudioFormat::Opus),
            "vorbis" | "ogg" => Ok(AudioFormat::Vorbis),
            "flac" => Ok(AudioFormat::Flac),
            "wav" => Ok(AudioFormat::Wav),
            _ => Err(InputError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    Best,
    Good,
    Medium,
}

impl QualityTier {
    /// Value for `yt-dlp --audio-quality` (0 is best VBR).
    pub fn audio_quality(&self) -> &'static str {
        match self {
            QualityTier::Best => "0",
            QualityTier::Good => "2",
            QualityTier::Medium => "5",
        }
    }
}

impl FromStr for QualityTier {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(QualityTier::Best),
            "good" => Ok(QualityTier::Good),
            "medium" => Ok(QualityTier::Medium),
            _ => Err(InputError::UnsupportedQuality(s.to_string())),
        }
    }
}

/// Requested sub-range in seconds.
///
/// Ordering of `start` and `end` is checked by the lifecycle manager, not
/// here, so an inverted range can still reach `finalize` and be rejected
/// there without touching the full artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    pub fn new(start: f64, end: f64) -> Result<Self, InputError> {
        for (name, value) in [("startTime", start), ("endTime", end)] {
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::InvalidRange(format!(
                    "{name} must be a non-negative number of seconds"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Builds a range from optional bounds; both or neither must be present.
    pub fn from_bounds(start: Option<f64>, end: Option<f64>) -> Result<Option<Self>, InputError> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Err(InputError::InvalidRange(
                "startTime and endTime must be supplied together".to_string(),
            )),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Formats seconds the way they are echoed in file names: `30`, `12.5`.
pub fn format_seconds(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as u64)
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
