//! External tool invocation
//!
//! Every tool run is a separate child process awaited with a hard wall-clock
//! timeout. Exit status and captured output are returned as data so callers
//! can keep the diagnostics; only spawn failures and timeouts are errors.

mod extractor;
mod transcoder;

pub use extractor::{ExtractJob, Extractor, TOOL as EXTRACTOR_TOOL, YtDlp};
pub use transcoder::{Ffmpeg, TOOL as TRANSCODER_TOOL, Transcoder, TrimJob};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ProcessError;

/// Lines of stderr kept for caller-visible diagnostics.
const DIAGNOSTIC_LINES: usize = 5;
const DIAGNOSTIC_MAX_CHARS: usize = 1000;

/// Captured result of a finished tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Successful run with empty output (used by test doubles).
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            success: true,
            ..Default::default()
        }
    }

    /// Failed run with the given code and stderr (used by test doubles).
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "termination by signal".to_string(),
        }
    }

    /// Turn a non-zero exit into an error carrying the redacted stderr.
    pub fn check(self, tool: &'static str, work_dir: &Path) -> Result<Self, ProcessError> {
        if self.success {
            return Ok(self);
        }
        Err(ProcessError::Exited {
            tool,
            status: self.status_label(),
            detail: summarize_stderr(&self.stderr, work_dir),
        })
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Spawn `binary` with `args` and wait at most `timeout` for it to exit.
///
/// The child is killed if the timeout fires or the returned future is
/// dropped (for example when the HTTP client disconnects).
pub async fn run_tool(
    tool: &'static str,
    binary: &str,
    args: &[OsString],
    timeout: Duration,
) -> Result<ToolOutput, ProcessError> {
    debug!(tool, binary, ?args, "Spawning external tool");

    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn { tool, source })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let output = ToolOutput::from(output);
            debug!(tool, code = ?output.code, "External tool exited");
            Ok(output)
        }
        Ok(Err(source)) => Err(ProcessError::Spawn { tool, source }),
        Err(_) => {
            warn!(tool, seconds = timeout.as_secs(), "External tool timed out, killed");
            Err(ProcessError::TimedOut {
                tool,
                seconds: timeout.as_secs(),
            })
        }
    }
}

/// Tail of a tool's stderr with the work directory masked out.
pub fn summarize_stderr(stderr: &str, work_dir: &Path) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let tail = lines[lines.len().saturating_sub(DIAGNOSTIC_LINES)..].join("\n");

    let dir = work_dir.to_string_lossy();
    let redacted = if dir.is_empty() {
        tail
    } else {
        tail.replace(dir.as_ref(), "<workdir>")
    };

    if redacted.chars().count() > DIAGNOSTIC_MAX_CHARS {
        let kept: String = redacted.chars().take(DIAGNOSTIC_MAX_CHARS).collect();
        format!("{kept}...")
    } else if redacted.is_empty() {
        "no diagnostic output".to_string()
    } else {
        redacted
    }
}

/// Availability report for one configured binary.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: &'static str,
    pub binary: String,
    pub resolved: Option<PathBuf>,
    pub version: Option<String>,
}

/// Resolve `binary` on PATH and ask it for its version.
pub async fn inspect(
    name: &'static str,
    binary: &str,
    version_flag: &str,
) -> ToolStatus {
    let resolved = which::which(binary).ok();
    let version = match &resolved {
        Some(_) => run_tool(name, binary, &[OsString::from(version_flag)], Duration::from_secs(10))
            .await
            .ok()
            .filter(|out| out.success)
            .and_then(|out| out.stdout.lines().next().map(|l| l.trim().to_string())),
        None => None,
    };

    ToolStatus {
        name,
        binary: binary.to_string(),
        resolved,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<OsString> {
        vec![OsString::from("-c"), OsString::from(script)]
    }

    #[tokio::test]
    async fn test_run_tool_captures_output() {
        let output = run_tool("sh", "sh", &sh("echo out; echo err >&2"), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_run_tool_non_zero_is_data() {
        let output = run_tool("sh", "sh", &sh("echo boom >&2; exit 3"), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(3));

        let err = output.check("sh", Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, ProcessError::Exited { ref detail, .. } if detail == "boom"));
    }

    #[tokio::test]
    async fn test_run_tool_timeout() {
        let result = run_tool("sh", "sh", &sh("sleep 5"), Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ProcessError::TimedOut { tool: "sh", .. })));
    }

    #[tokio::test]
    async fn test_run_tool_missing_binary() {
        let result = run_tool(
            "missing",
            "definitely-not-a-real-binary-xyz",
            &[],
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[test]
    fn test_summarize_stderr_redacts_and_truncates() {
        let stderr = "line1\n\nline2\nline3\nline4\nline5\n\
                      ERROR: unable to write /srv/work/abc-full.mp3\n";
        let summary = summarize_stderr(stderr, Path::new("/srv/work"));

        assert!(!summary.contains("line1"));
        assert!(summary.contains("line2"));
        assert!(summary.ends_with("ERROR: unable to write <workdir>/abc-full.mp3"));
        assert!(!summary.contains("/srv/work"));

        assert_eq!(summarize_stderr("", Path::new("/tmp")), "no diagnostic output");

        let long = "x".repeat(DIAGNOSTIC_MAX_CHARS + 10);
        assert!(summarize_stderr(&long, Path::new("/tmp")).ends_with("..."));
    }
}
