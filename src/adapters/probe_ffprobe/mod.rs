//! FFprobe adapter for media file probing
//!
//! Runs one `ffprobe` process per call with the target appended as the last
//! argument, bounds it by a timeout and decodes its JSON output into a
//! [`ProbeResult`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapters::toml_config::ProbeConfig;
use crate::domain::errors::ProbeError;
use crate::ports::ProbePort;
use crate::probe::ProbeResult;

/// Default probe executable, resolved through `PATH`
pub const DEFAULT_PROGRAM: &str = "ffprobe";

/// Arguments requesting JSON for format, streams and chapters
const FFPROBE_ARGS: [&str; 7] = [
    "-v",
    "error",
    "-print_format",
    "json",
    "-show_chapters",
    "-show_format",
    "-show_streams",
];

/// How long pipe readers may keep draining after the process has exited
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

static URI_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid URI scheme regex"));

/// The executable and fixed leading arguments of a probe invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    program: String,
    base_args: Vec<String>,
}

impl ProbeCommand {
    /// `ffprobe` from `PATH` with the JSON arguments
    pub fn ffprobe() -> Self {
        Self::custom(DEFAULT_PROGRAM, FFPROBE_ARGS)
    }

    /// An explicit ffprobe executable; the file must exist
    pub fn with_override(path: impl Into<PathBuf>) -> Result<Self, ProbeError> {
        let path = path.into();
        if !path.is_file() {
            return Err(ProbeError::OverrideNotFound(path));
        }
        Ok(Self::custom(path.to_string_lossy(), FFPROBE_ARGS))
    }

    /// Any program with any leading arguments
    pub fn custom<P, I, S>(program: P, base_args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            base_args: base_args.into_iter().map(Into::into).collect(),
        }
    }

    /// Interpret a configured command: a value with a path separator is an override
    pub fn from_setting(command: &str) -> Result<Self, ProbeError> {
        if command.contains(MAIN_SEPARATOR) || command.contains('/') {
            Self::with_override(command)
        } else {
            Ok(Self::custom(command, FFPROBE_ARGS))
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full command line for `target`
    pub fn cmdline(&self, target: &str) -> Vec<String> {
        let mut cmdline = Vec::with_capacity(self.base_args.len() + 2);
        cmdline.push(self.program.clone());
        cmdline.extend(self.base_args.iter().cloned());
        cmdline.push(target.to_string());
        cmdline
    }
}

impl Default for ProbeCommand {
    fn default() -> Self {
        Self::ffprobe()
    }
}

/// Per-invocation limits and checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOptions {
    timeout: Duration,
    verify_local_mediafile: bool,
}

impl ProbeOptions {
    pub fn new(timeout_secs: f64, verify_local_mediafile: bool) -> Result<Self, ProbeError> {
        let invalid = || ProbeError::InvalidArgument {
            name: "timeout",
            problem: "Must be a positive number of seconds",
            value: timeout_secs.to_string(),
        };
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(invalid());
        }
        let timeout = Duration::try_from_secs_f64(timeout_secs).map_err(|_| invalid())?;
        Ok(Self {
            timeout,
            verify_local_mediafile,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            verify_local_mediafile: true,
        }
    }
}

/// Whether `target` names a stream URL rather than a local path
pub fn looks_like_uri(target: &str) -> bool {
    URI_SCHEME_RE.is_match(target)
}

/// Raw result of one finished (or killed) probe process
struct ProcessCapture {
    exit_code: Option<i32>,
    success: bool,
    timed_out: bool,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    command: ProbeCommand,
    options: ProbeOptions,
}

impl FfprobeAdapter {
    pub fn new(command: ProbeCommand, options: ProbeOptions) -> Self {
        Self { command, options }
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        Ok(Self::new(
            ProbeCommand::from_setting(&config.command)?,
            ProbeOptions::new(config.timeout_secs, config.verify_local_mediafile)?,
        ))
    }

    fn validate_target(&self, target: &OsStr) -> Result<(), ProbeError> {
        let display = target.to_string_lossy();
        if display.trim().is_empty() {
            return Err(ProbeError::InvalidArgument {
                name: "target",
                problem: "Must be a file path or URI",
                value: display.into_owned(),
            });
        }
        if self.options.verify_local_mediafile
            && !looks_like_uri(&display)
            && !Path::new(target).exists()
        {
            return Err(ProbeError::MediaFileNotFound(display.into_owned()));
        }
        Ok(())
    }

    /// Spawn the probe on `target`; `cmdline` is its printable form
    async fn execute(
        &self,
        target: &OsStr,
        cmdline: &[String],
    ) -> Result<ProcessCapture, ProbeError> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.base_args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::ExecutableNotFound(cmdline[0].clone())
                } else {
                    ProbeError::Launch {
                        cmd: cmdline[0].clone(),
                        source,
                    }
                }
            })?;

        let stdout = PipeCollector::start(child.stdout.take());
        let stderr = PipeCollector::start(child.stderr.take());

        let wait_failed = |source: std::io::Error| ProbeError::Launch {
            cmd: cmdline[0].clone(),
            source,
        };

        let (status, timed_out) =
            match tokio::time::timeout(self.options.timeout, child.wait()).await {
                Ok(waited) => (waited.map_err(wait_failed)?, false),
                Err(_) => {
                    warn!(
                        cmd = %cmdline.join(" "),
                        timeout_secs = self.options.timeout.as_secs_f64(),
                        "Probe timed out; killing process"
                    );
                    if let Err(e) = child.start_kill() {
                        warn!("Failed to kill probe process: {}", e);
                    }
                    (child.wait().await.map_err(wait_failed)?, true)
                }
            };

        Ok(ProcessCapture {
            exit_code: status.code(),
            success: !timed_out && status.success(),
            timed_out,
            stdout: stdout.finish().await,
            stderr: stderr.finish().await,
        })
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, target: &OsStr) -> Result<ProbeResult, ProbeError> {
        self.validate_target(target)?;

        let cmdline = self.command.cmdline(&target.to_string_lossy());
        debug!(cmd = %cmdline.join(" "), "Running probe");

        let capture = self.execute(target, &cmdline).await?;

        if !capture.success {
            return Err(ProbeError::Subprocess {
                cmdline,
                exit_code: capture.exit_code,
                stderr: String::from_utf8_lossy(&capture.stderr).trim().to_string(),
                timed_out: capture.timed_out,
            });
        }

        let document: serde_json::Value =
            serde_json::from_slice(&capture.stdout).map_err(ProbeError::JsonParse)?;

        let result = ProbeResult::from_json(cmdline, document)?;
        debug!("{}", result);
        Ok(result)
    }
}

/// Drains a child pipe in the background, keeping whatever arrived
struct PipeCollector {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl PipeCollector {
    fn start<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let task = tokio::spawn(async move {
            let Some(mut pipe) = pipe else {
                return;
            };
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                }
            }
        });
        Self { buffer, task }
    }

    /// Wait briefly for EOF, then return what was read
    async fn finish(mut self) -> Vec<u8> {
        if tokio::time::timeout(PIPE_DRAIN_GRACE, &mut self.task)
            .await
            .is_err()
        {
            self.task.abort();
        }
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PROBE_JSON: &str = r#"{"format":{"format_name":"flac","duration":"180.0"},"streams":[{"index":0,"codec_type":"audio","codec_name":"flac","tags":{"ARTIST":"A","TITLE":"T"}}]}"#;

    fn sh(script: &str) -> ProbeCommand {
        ProbeCommand::custom("sh", ["-c", script, "probe"])
    }

    fn adapter(script: &str, timeout_secs: f64) -> FfprobeAdapter {
        FfprobeAdapter::new(sh(script), ProbeOptions::new(timeout_secs, true).unwrap())
    }

    fn media_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".flac").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_ffprobe_cmdline() {
        let cmdline = ProbeCommand::ffprobe().cmdline("song.flac");
        assert_eq!(
            cmdline,
            vec![
                "ffprobe",
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_chapters",
                "-show_format",
                "-show_streams",
                "song.flac"
            ]
        );
    }

    #[test]
    fn test_override_must_exist() {
        let err = ProbeCommand::with_override("/definitely/not/here/ffprobe").unwrap_err();
        assert!(matches!(err, ProbeError::OverrideNotFound(_)));
        let err = ProbeCommand::from_setting("/definitely/not/here/ffprobe").unwrap_err();
        assert!(matches!(err, ProbeError::OverrideNotFound(_)));
    }

    #[test]
    fn test_override_existing_file() {
        let file = NamedTempFile::new().unwrap();
        let command = ProbeCommand::from_setting(file.path().to_str().unwrap()).unwrap();
        assert_eq!(command.program(), file.path().to_str().unwrap());
    }

    #[test]
    fn test_plain_setting_uses_path_lookup() {
        let command = ProbeCommand::from_setting("ffprobe").unwrap();
        assert_eq!(command, ProbeCommand::ffprobe());
    }

    #[test]
    fn test_timeout_must_be_positive() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e20] {
            let err = ProbeOptions::new(bad, true).unwrap_err();
            assert!(matches!(err, ProbeError::InvalidArgument { name: "timeout", .. }));
        }
        assert!(ProbeOptions::new(0.5, false).is_ok());
    }

    #[test]
    fn test_uri_detection() {
        assert!(looks_like_uri("http://example.com/a.mp3"));
        assert!(looks_like_uri("rtsp://host/stream"));
        assert!(!looks_like_uri("/music/a.mp3"));
        assert!(!looks_like_uri("C:\\music\\a.mp3"));
    }

    #[tokio::test]
    #[serial]
    async fn test_probe_parses_output() {
        let file = media_file(PROBE_JSON);
        let target = file.path().to_str().unwrap();
        let result = adapter("cat \"$1\"", 5.0)
            .probe(OsStr::new(target))
            .await
            .unwrap();
        assert_eq!(result.media_target(), target);
        assert_eq!(result.audio().len(), 1);
        assert_eq!(result.format.format_name.as_deref(), Some("flac"));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    #[serial]
    async fn test_non_utf8_file_name_reaches_prober() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.flac"));
        std::fs::write(&path, PROBE_JSON).unwrap();

        let result = adapter("cat \"$1\"", 5.0)
            .probe(path.as_os_str())
            .await
            .unwrap();
        assert_eq!(result.audio().len(), 1);
        assert!(result.media_target().ends_with("caf\u{FFFD}.flac"));
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_local_file_is_not_spawned() {
        let err = adapter("cat \"$1\"", 5.0)
            .probe(OsStr::new("/definitely/not/here/song.flac"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::MediaFileNotFound(_)));
    }

    #[tokio::test]
    #[serial]
    async fn test_uri_skips_local_check() {
        let result = adapter("printf '{}'", 5.0)
            .probe(OsStr::new("http://example.invalid/song.mp3"))
            .await
            .unwrap();
        assert!(result.streams.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_nonzero_exit_is_subprocess_error() {
        let file = media_file("");
        let err = adapter("echo boom >&2; exit 3", 5.0)
            .probe(file.path().as_os_str())
            .await
            .unwrap_err();
        match err {
            ProbeError::Subprocess {
                exit_code,
                stderr,
                timed_out,
                ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "boom");
                assert!(!timed_out);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_nonzero_exit_wins_over_valid_json() {
        let file = media_file(PROBE_JSON);
        let err = adapter("cat \"$1\"; exit 1", 5.0)
            .probe(file.path().as_os_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Subprocess { exit_code: Some(1), .. }));
    }

    #[tokio::test]
    #[serial]
    async fn test_malformed_output_is_json_error() {
        let file = media_file("");
        let err = adapter("echo not json", 5.0)
            .probe(file.path().as_os_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::JsonParse(_)));
    }

    #[tokio::test]
    #[serial]
    async fn test_timeout_kills_and_keeps_partial_output() {
        let file = media_file("");
        let err = adapter("echo partial >&2; exec sleep 5", 0.3)
            .probe(file.path().as_os_str())
            .await
            .unwrap_err();
        match err {
            ProbeError::Subprocess {
                stderr, timed_out, ..
            } => {
                assert!(timed_out);
                assert_eq!(stderr, "partial");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_executable() {
        let file = media_file("");
        let probe = FfprobeAdapter::new(
            ProbeCommand::custom("clean-locator-no-such-probe", FFPROBE_ARGS),
            ProbeOptions::default(),
        );
        let err = probe.probe(file.path().as_os_str()).await.unwrap_err();
        assert!(matches!(err, ProbeError::ExecutableNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_target_is_invalid() {
        let err = adapter("true", 1.0).probe(OsStr::new("  ")).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidArgument { name: "target", .. }));
    }
}
