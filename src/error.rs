use std::path::PathBuf;
use thiserror::Error;

/// Install hint shown whenever LibreOffice cannot be found.
pub const INSTALL_GUIDANCE: &str = "LibreOffice is required. Install it from libreoffice.org \
or with Homebrew:\n\n  brew install --cask libreoffice";

/// Errors produced while locating the converter or converting a single file.
///
/// Only [`ConvertError::ConverterUnavailable`] is fatal to a run. Every other
/// variant is recorded against the file that caused it and the batch moves on.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No converter binary could be found on this machine.
    #[error("LibreOffice (soffice) not found. {guidance}")]
    ConverterUnavailable {
        /// Install instructions for the user.
        guidance: &'static str,
    },

    /// An explicitly configured converter path does not exist.
    #[error("Configured converter does not exist: {path}. {}", INSTALL_GUIDANCE)]
    ConfiguredConverterMissing { path: PathBuf },

    #[error("File not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Expected a .{expected} file, got: {path}")]
    WrongExtension { path: PathBuf, expected: &'static str },

    #[error("Cannot create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another file in the same batch already maps to this output.
    #[error("Output {path} would overwrite the conversion of {first}")]
    OutputCollision { path: PathBuf, first: PathBuf },

    #[error("Conversion timed out after {0} seconds")]
    Timeout(u64),

    /// The converter disappeared between startup and this invocation.
    #[error("Converter binary not found: {path}")]
    ConverterMissing { path: PathBuf },

    #[error("Converter exited with code {code}: {output}")]
    ProcessFailed { code: i32, output: String },

    #[error("Expected output file not created: {path}{}", fmt_detail(.detail))]
    OutputMissing {
        path: PathBuf,
        /// Error line printed by the converter, if any.
        detail: Option<String>,
    },

    #[error("IO error during conversion: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_detail(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl ConvertError {
    pub fn unavailable() -> Self {
        ConvertError::ConverterUnavailable {
            guidance: INSTALL_GUIDANCE,
        }
    }

    /// Whether this error should abort the whole run rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConvertError::ConverterUnavailable { .. }
                | ConvertError::ConfiguredConverterMissing { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ConvertError::unavailable().is_fatal());
        assert!(!ConvertError::Timeout(5).is_fatal());
        assert!(!ConvertError::SourceMissing { path: PathBuf::from("a.wpd") }.is_fatal());
    }

    #[test]
    fn test_output_missing_message() {
        let err = ConvertError::OutputMissing {
            path: PathBuf::from("/out/a.docx"),
            detail: Some("Error: source file could not be loaded".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("/out/a.docx"));
        assert!(msg.contains("could not be loaded"));

        let bare = ConvertError::OutputMissing { path: PathBuf::from("/out/a.docx"), detail: None };
        assert_eq!(bare.to_string(), "Expected output file not created: /out/a.docx");
    }

    #[test]
    fn test_unavailable_carries_guidance() {
        let hint = "brew install --cask libreoffice";
        assert!(ConvertError::unavailable().to_string().contains(hint));
        let configured = ConvertError::ConfiguredConverterMissing { path: PathBuf::from("/x") };
        assert!(configured.to_string().contains(hint));
    }
}
