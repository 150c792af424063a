use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;

use super::{ToolOutput, run_tool};
use crate::config::ExtractorConfig;
use crate::error::ProcessError;
use crate::media::{AudioFormat, QualityTier};

pub const TOOL: &str = "yt-dlp";

/// One audio extraction attempt against a single URL.
#[derive(Debug, Clone)]
pub struct ExtractJob<'a> {
    pub target: &'a str,
    /// yt-dlp output template; must end in `.%(ext)s`
    pub output_template: &'a Path,
    pub format: AudioFormat,
    pub quality: QualityTier,
    pub referer: Option<&'a str>,
    /// Netscape cookie file for authenticated pages
    pub cookies: Option<&'a Path>,
}

/// URL-to-audio extractor running as an opaque child process per call.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Download and convert `job.target` to audio at `job.output_template`.
    async fn extract(&self, job: &ExtractJob<'_>) -> Result<ToolOutput, ProcessError>;

    /// Print the target's metadata as a single JSON document on stdout.
    async fn dump_json(&self, target: &str, cookies: Option<&Path>) -> Result<ToolOutput, ProcessError>;
}

/// yt-dlp backed extractor
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: ExtractorConfig,
}

impl YtDlp {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn build_extract_args(&self, job: &ExtractJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--no-check-certificate".into(),
            "--user-agent".into(),
            self.config.user_agent.clone().into(),
        ];

        if let Some(referer) = job.referer {
            args.push("--referer".into());
            args.push(referer.into());
        }

        for header in &self.config.extra_headers {
            args.push("--add-header".into());
            args.push(header.into());
        }

        push_cookies(&mut args, job.cookies);

        args.extend([
            "--retries".into(),
            self.config.retries.to_string().into(),
            "--fragment-retries".into(),
            self.config.fragment_retries.to_string().into(),
            "-x".into(),
            "--audio-format".into(),
            job.format.as_str().into(),
            "--audio-quality".into(),
            job.quality.audio_quality().into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "-o".into(),
            job.output_template.as_os_str().to_os_string(),
            // Stop option parsing so a hostile URL can't smuggle flags
            "--".into(),
            job.target.into(),
        ]);

        args
    }

    pub fn build_probe_args(&self, target: &str, cookies: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-J".into(),
            "--no-playlist".into(),
            "--skip-download".into(),
            "--no-warnings".into(),
            "--no-check-certificate".into(),
            "--user-agent".into(),
            self.config.user_agent.clone().into(),
        ];
        push_cookies(&mut args, cookies);
        args.extend(["--".into(), target.into()]);
        args
    }
}

fn push_cookies(args: &mut Vec<OsString>, cookies: Option<&Path>) {
    if let Some(path) = cookies {
        args.push("--cookies".into());
        args.push(path.as_os_str().to_os_string());
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(&self, job: &ExtractJob<'_>) -> Result<ToolOutput, ProcessError> {
        let args = self.build_extract_args(job);
        run_tool(TOOL, &self.config.binary, &args, self.config.timeout()).await
    }

    async fn dump_json(&self, target: &str, cookies: Option<&Path>) -> Result<ToolOutput, ProcessError> {
        let args = self.build_probe_args(target, cookies);
        run_tool(TOOL, &self.config.binary, &args, self.config.probe_timeout()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lossy(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    }

    #[test]
    fn test_extract_args_fixed_flag_set() {
        let ytdlp = YtDlp::new(ExtractorConfig::default());
        let template = Path::new("/work/token-123-full.%(ext)s");
        let job = ExtractJob {
            target: "https://vimeo.com/123",
            output_template: template,
            format: AudioFormat::Mp3,
            quality: QualityTier::Best,
            referer: Some("https://vimeo.com/"),
            cookies: None,
        };

        let args = lossy(&ytdlp.build_extract_args(&job));

        assert!(args.contains(&"--no-check-certificate".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert!(args.contains(&"-x".to_string()));
        assert_eq!(value_after(&args, "--retries").as_deref(), Some("3"));
        assert_eq!(value_after(&args, "--fragment-retries").as_deref(), Some("3"));
        assert_eq!(value_after(&args, "--audio-format").as_deref(), Some("mp3"));
        assert_eq!(value_after(&args, "--audio-quality").as_deref(), Some("0"));
        assert_eq!(value_after(&args, "--referer").as_deref(), Some("https://vimeo.com/"));
        assert_eq!(value_after(&args, "-o").as_deref(), Some("/work/token-123-full.%(ext)s"));
        assert_eq!(args.iter().filter(|a| *a == "--add-header").count(), 3);

        // Target URL is always last, behind the option terminator
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://vimeo.com/123");
    }

    #[test]
    fn test_extract_args_without_referer() {
        let ytdlp = YtDlp::new(ExtractorConfig::default());
        let job = ExtractJob {
            target: "https://example.com/a",
            output_template: Path::new("/work/x.%(ext)s"),
            format: AudioFormat::Opus,
            quality: QualityTier::Medium,
            referer: None,
            cookies: None,
        };

        let args = lossy(&ytdlp.build_extract_args(&job));
        assert!(!args.contains(&"--referer".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert_eq!(value_after(&args, "--audio-format").as_deref(), Some("opus"));
        assert_eq!(value_after(&args, "--audio-quality").as_deref(), Some("5"));
    }

    #[test]
    fn test_probe_args() {
        let ytdlp = YtDlp::new(ExtractorConfig::default());
        let args = lossy(&ytdlp.build_probe_args("https://vimeo.com/1", None));

        assert_eq!(args[0], "-J");
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert_eq!(args.last().unwrap(), "https://vimeo.com/1");
    }

    #[test]
    fn test_cookie_file_passed_before_target() {
        let ytdlp = YtDlp::new(ExtractorConfig::default());
        let cookies = Path::new("/work/token-123-cookies.txt");
        let job = ExtractJob {
            target: "https://www.masterclass.com/classes/x",
            output_template: Path::new("/work/x.%(ext)s"),
            format: AudioFormat::Mp3,
            quality: QualityTier::Best,
            referer: None,
            cookies: Some(cookies),
        };

        for args in [
            lossy(&ytdlp.build_extract_args(&job)),
            lossy(&ytdlp.build_probe_args(job.target, Some(cookies))),
        ] {
            assert_eq!(value_after(&args, "--cookies").as_deref(), Some("/work/token-123-cookies.txt"));
            let cookie_flag = args.iter().position(|a| a == "--cookies").unwrap();
            let terminator = args.iter().position(|a| a == "--").unwrap();
            assert!(cookie_flag < terminator);
        }
    }
}
