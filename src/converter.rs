//! Locating and running the external LibreOffice converter.
//!
//! The binary is resolved once at startup with [`locate_converter`] and the
//! resulting [`Converter`] is passed to whoever needs it.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use crate::error::ConvertError;

/// Default per-file timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Executable names looked up on the search path, in order.
const SEARCH_PATH_NAMES: &[&str] = &["soffice", "libreoffice"];

/// Install locations checked when nothing is on the search path.
const WELL_KNOWN_LOCATIONS: &[&str] = &[
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    r"C:\Program Files\LibreOffice\program\soffice.exe",
    r"C:\Program Files (x86)\LibreOffice\program\soffice.exe",
    "/usr/bin/soffice",
    "/usr/lib/libreoffice/program/soffice",
    "/opt/libreoffice/program/soffice",
    "/snap/bin/libreoffice",
];

static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(Error:?\s.*?)\s*$").expect("valid regex"));

static CONVERT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^convert\s+(?P<input>.+?)\s+->\s+(?P<output>.+?)\s+using filter")
        .expect("valid regex")
});

/// Find the converter binary.
///
/// An explicit path wins if it exists (and is an error if it doesn't). Then the
/// search path is tried, then the usual install locations.
pub fn locate_converter(explicit: Option<&Path>) -> Result<PathBuf, ConvertError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConvertError::ConfiguredConverterMissing {
            path: path.to_path_buf(),
        });
    }

    for name in SEARCH_PATH_NAMES {
        if let Ok(found) = which::which(name) {
            tracing::debug!("Found converter on PATH: {}", found.display());
            return Ok(found);
        }
    }

    WELL_KNOWN_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
        .inspect(|found| tracing::debug!("Found converter at {}", found.display()))
        .ok_or_else(ConvertError::unavailable)
}

/// Pull the first `Error: ...` line out of converter output.
pub fn extract_error_line(output: &str) -> Option<String> {
    ERROR_LINE
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Output path the converter reports in its `convert a -> b using filter` line.
pub fn reported_output(output: &str) -> Option<PathBuf> {
    CONVERT_LINE
        .captures(output)
        .and_then(|c| c.name("output"))
        .map(|m| PathBuf::from(m.as_str()))
}

/// A resolved converter binary plus the timeout applied to each run.
#[derive(Debug, Clone)]
pub struct Converter {
    program: PathBuf,
    timeout: Duration,
}

impl Converter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Locate the binary and wrap it with the default timeout.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ConvertError> {
        locate_converter(explicit).map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments for converting `input` into `outdir`.
    pub fn build_args(input: &Path, outdir: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "--headless".into(),
            "--convert-to".into(),
            "docx".into(),
            "--outdir".into(),
            outdir.as_os_str().to_owned(),
            input.as_os_str().to_owned(),
        ]
    }

    /// Run one conversion and return the combined stdout/stderr.
    ///
    /// A zero exit status is required; whether the output file actually
    /// appeared is for the caller to check.
    pub async fn run(&self, input: &Path, outdir: &Path) -> Result<String, ConvertError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::build_args(input, outdir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            "Running converter: program='{}', input='{}', outdir='{}'",
            self.program.display(),
            input.display(),
            outdir.display()
        );

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::ConverterMissing {
                    path: self.program.clone(),
                });
            }
            Ok(Err(e)) => return Err(ConvertError::Io(e)),
            Err(_) => return Err(ConvertError::Timeout(self.timeout.as_secs())),
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();

        if !output.status.success() {
            return Err(ConvertError::ProcessFailed {
                code: output.status.code().unwrap_or(-1),
                output: combined.chars().take(2000).collect(),
            });
        }

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_order() {
        let args = Converter::build_args(Path::new("/in/a.wpd"), Path::new("/out"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, ["--headless", "--convert-to", "docx", "--outdir", "/out", "/in/a.wpd"]);
    }

    #[test]
    fn test_extract_error_line() {
        let out = "Warning: failed to launch javaldx\nError: source file could not be loaded\n";
        assert_eq!(
            extract_error_line(out),
            Some("Error: source file could not be loaded".to_string())
        );
        let clean = "convert a.wpd -> a.docx using filter : MS Word 2007 XML";
        assert_eq!(extract_error_line(clean), None);
    }

    #[test]
    fn test_reported_output() {
        let out = "convert /in/a.wpd -> /out/a.docx using filter : MS Word 2007 XML";
        assert_eq!(reported_output(out), Some(PathBuf::from("/out/a.docx")));
        assert_eq!(reported_output("nothing here"), None);
    }

    #[test]
    fn test_explicit_converter_must_exist() {
        let err = locate_converter(Some(Path::new("/definitely/not/here/soffice"))).unwrap_err();
        assert!(matches!(err, ConvertError::ConfiguredConverterMissing { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_default_timeout() {
        let converter = Converter::new("soffice");
        assert_eq!(converter.timeout(), DEFAULT_TIMEOUT);
        let converter = converter.with_timeout(Duration::from_secs(5));
        assert_eq!(converter.timeout(), Duration::from_secs(5));
    }
}
