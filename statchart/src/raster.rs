// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector to raster conversion through an external tool.
//!
//! Conversion is best-effort: every failure is reported as a [`RasterOutcome::Unavailable`]
//! value and the caller keeps the vector artifact.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::Builder;
use thiserror::Error;
use tracing::warn;

/// Default conversion program.
pub const DEFAULT_PROGRAM: &str = "rsvg-convert";
/// Default timeout for one conversion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Why a raster could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterConversionFailure {
    /// The conversion program is not installed, or conversion is disabled.
    #[error("conversion tool not available")]
    ToolMissing,
    /// The program did not finish within the timeout and was killed.
    #[error("conversion timed out")]
    TimedOut,
    /// The program exited unsuccessfully (`None` when killed by a signal).
    #[error("conversion exited with status {0:?}")]
    ExitStatus(Option<i32>),
    /// Staging files or spawning the program failed.
    #[error("conversion I/O error: {0}")]
    Io(String),
    /// The program reported success but wrote nothing.
    #[error("conversion produced no output")]
    EmptyOutput,
}

/// Result of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterOutcome {
    /// The raster was written to this path.
    Converted(PathBuf),
    /// No raster; the vector artifact stands alone.
    Unavailable(RasterConversionFailure),
}

impl RasterOutcome {
    /// Returns `true` if a raster was produced.
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }

    /// `(success, raster_path)`.
    pub fn into_parts(self) -> (bool, Option<PathBuf>) {
        match self {
            Self::Converted(path) => (true, Some(path)),
            Self::Unavailable(_) => (false, None),
        }
    }
}

/// Converts SVG bytes to a raster file at `target`.
///
/// Implementations must be callable from several threads at once for different targets.
pub trait RasterConverter: Send + Sync + fmt::Debug {
    /// Runs one conversion, bounded by `timeout`.
    fn convert(&self, vector: &[u8], target: &Path, timeout: Duration) -> RasterOutcome;
}

/// A converter that never produces a raster.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRasterConverter;

impl RasterConverter for NoopRasterConverter {
    fn convert(&self, _vector: &[u8], _target: &Path, _timeout: Duration) -> RasterOutcome {
        RasterOutcome::Unavailable(RasterConversionFailure::ToolMissing)
    }
}

/// Runs an external program such as `rsvg-convert`.
///
/// `{input}` and `{output}` in the argument list are replaced by the staged SVG path and the
/// path the program must write to. The output only lands on `target` after the program exits
/// successfully with a non-empty file.
#[derive(Clone, Debug)]
pub struct CommandRasterConverter {
    program: String,
    args: Vec<String>,
    poll_interval: Duration,
}

impl Default for CommandRasterConverter {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROGRAM,
            ["-f", "png", "-o", OUTPUT_PLACEHOLDER, INPUT_PLACEHOLDER],
        )
    }
}

impl CommandRasterConverter {
    /// Creates a converter for `program` with templated `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Sets how often the child is polled for completion.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The configured program.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    fn run(
        &self,
        vector: &[u8],
        target: &Path,
        timeout: Duration,
    ) -> Result<(), RasterConversionFailure> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut input = Builder::new()
            .prefix(".statchart-")
            .suffix(".svg")
            .tempfile_in(dir)
            .map_err(io_failure)?;
        input.write_all(vector).map_err(io_failure)?;
        input.flush().map_err(io_failure)?;

        let output = Builder::new()
            .prefix(".statchart-")
            .suffix(".raster")
            .tempfile_in(dir)
            .map_err(io_failure)?
            .into_temp_path();

        let mut child = Command::new(&self.program)
            .args(self.expand_args(input.path(), &output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RasterConversionFailure::ToolMissing,
                _ => io_failure(e),
            })?;

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RasterConversionFailure::TimedOut);
                    }
                    thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(io_failure(e));
                }
            }
        };

        if !status.success() {
            return Err(RasterConversionFailure::ExitStatus(status.code()));
        }
        let len = std::fs::metadata(&output).map_err(io_failure)?.len();
        if len == 0 {
            return Err(RasterConversionFailure::EmptyOutput);
        }
        output
            .persist(target)
            .map_err(|e| io_failure(e.error))?;
        Ok(())
    }
}

impl RasterConverter for CommandRasterConverter {
    fn convert(&self, vector: &[u8], target: &Path, timeout: Duration) -> RasterOutcome {
        match self.run(vector, target, timeout) {
            Ok(()) => RasterOutcome::Converted(target.to_path_buf()),
            Err(reason) => {
                warn!(
                    program = %self.program,
                    target = %target.display(),
                    %reason,
                    "raster conversion failed; keeping vector only"
                );
                RasterOutcome::Unavailable(reason)
            }
        }
    }
}

fn io_failure(e: io::Error) -> RasterConversionFailure {
    RasterConversionFailure::Io(e.to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SVG: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;

    fn sh(script: &str) -> CommandRasterConverter {
        CommandRasterConverter::new("sh", ["-c", script, "sh", "{input}", "{output}"])
            .with_poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn successful_conversion_lands_on_target() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("a_b_pie_chart.png");
        let outcome = sh(r#"cp "$1" "$2""#).convert(SVG, &target, Duration::from_secs(5));

        assert_eq!(outcome, RasterOutcome::Converted(target.clone()));
        assert_eq!(std::fs::read(&target).expect("raster written"), SVG);
    }

    #[test]
    fn staging_files_are_cleaned_up() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("out.png");
        let _ = sh("exit 0").convert(SVG, &target, Duration::from_secs(5));
        let _ = sh(r#"cp "$1" "$2""#).convert(SVG, &target, Duration::from_secs(5));

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["out.png"]);
    }

    #[test]
    fn failures_are_typed() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("out.png");
        let t = Duration::from_secs(5);

        assert_eq!(
            sh("exit 3").convert(SVG, &target, t),
            RasterOutcome::Unavailable(RasterConversionFailure::ExitStatus(Some(3)))
        );
        assert_eq!(
            sh("exit 0").convert(SVG, &target, t),
            RasterOutcome::Unavailable(RasterConversionFailure::EmptyOutput)
        );
        assert_eq!(
            CommandRasterConverter::new("statchart-no-such-tool", ["{input}"])
                .convert(SVG, &target, t),
            RasterOutcome::Unavailable(RasterConversionFailure::ToolMissing)
        );
        assert!(!target.exists());
    }

    #[test]
    fn slow_tool_is_killed_at_timeout() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("out.png");
        let start = Instant::now();
        let outcome = sh("sleep 5").convert(SVG, &target, Duration::from_millis(100));

        assert_eq!(
            outcome,
            RasterOutcome::Unavailable(RasterConversionFailure::TimedOut)
        );
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(!target.exists());
    }

    #[test]
    fn noop_is_always_unavailable() {
        let (ok, path) = NoopRasterConverter
            .convert(SVG, Path::new("x.png"), DEFAULT_TIMEOUT)
            .into_parts();
        assert!(!ok);
        assert!(path.is_none());
    }
}
