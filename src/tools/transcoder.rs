use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;

use super::{ToolOutput, run_tool};
use crate::config::TranscoderConfig;
use crate::error::ProcessError;
use crate::media::{AudioFormat, format_seconds};

pub const TOOL: &str = "ffmpeg";

/// Cut `duration` seconds starting at `start` out of `input`.
#[derive(Debug, Clone)]
pub struct TrimJob<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub start: f64,
    pub duration: f64,
    pub format: AudioFormat,
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn trim(&self, job: &TrimJob<'_>) -> Result<ToolOutput, ProcessError>;
}

/// ffmpeg backed transcoder
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    config: TranscoderConfig,
}

impl Ffmpeg {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    pub fn build_trim_args(&self, job: &TrimJob<'_>) -> Vec<OsString> {
        // -ss before -i seeks the input instead of decoding up to the offset
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-ss".into(),
            format_seconds(job.start).into(),
            "-i".into(),
            job.input.as_os_str().to_os_string(),
            "-t".into(),
            format_seconds(job.duration).into(),
            "-vn".into(),
            "-c:a".into(),
            job.format.encoder().into(),
        ];

        if !job.format.is_lossless() {
            args.push("-b:a".into());
            args.push(self.config.bitrate.clone().into());
        }

        args.push("-ar".into());
        args.push(self.config.sample_rate.to_string().into());
        args.push(job.output.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn trim(&self, job: &TrimJob<'_>) -> Result<ToolOutput, ProcessError> {
        let args = self.build_trim_args(job);
        run_tool(TOOL, &self.config.binary, &args, self.config.timeout()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lossy(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_trim_args_mp3() {
        let ffmpeg = Ffmpeg::new(TranscoderConfig::default());
        let job = TrimJob {
            input: Path::new("/work/a-full.mp3"),
            output: Path::new("/work/a-clip.mp3"),
            start: 30.0,
            duration: 12.5,
            format: AudioFormat::Mp3,
        };

        let args = lossy(&ffmpeg.build_trim_args(&job));
        let expected: Vec<String> = [
            "-hide_banner", "-nostdin", "-y", "-ss", "30", "-i", "/work/a-full.mp3", "-t", "12.5",
            "-vn", "-c:a", "libmp3lame", "-b:a", "128k", "-ar", "44100", "/work/a-clip.mp3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(args, expected);
    }

    #[test]
    fn test_trim_args_lossless_skips_bitrate() {
        let ffmpeg = Ffmpeg::new(TranscoderConfig::default());
        let job = TrimJob {
            input: Path::new("/work/a-full.flac"),
            output: Path::new("/work/a-clip.flac"),
            start: 0.0,
            duration: 5.0,
            format: AudioFormat::Flac,
        };

        let args = lossy(&ffmpeg.build_trim_args(&job));
        assert!(!args.contains(&"-b:a".to_string()));
        assert!(args.contains(&"flac".to_string()));
    }
}
