//! Options/result objects shared by the front-ends.
//!
//! Field names are camelCase so the same JSON works for any UI shell that
//! talks to the orchestrator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert_engine::{
    BatchReport, ConfigBuilder, ConversionOutcome, ConversionStats, ConvertEngine, SOURCE_EXTENSION,
};
use crate::converter::Converter;

pub const NOTHING_FOUND: &str = "No .wpd files found.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestType {
    #[default]
    Same,
    Converted,
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    pub recursive: bool,
    pub dest_type: DestType,
    pub dest_path: String,
    pub preserve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub stats: ConversionStats,
    #[serde(default)]
    pub log: Vec<String>,
}

impl ConvertResponse {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            stats: ConversionStats::default(),
            log: Vec::new(),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

/// One line per file, relative to `scan_root` where possible.
pub fn log_lines(report: &BatchReport, scan_root: &Path) -> Vec<String> {
    report
        .results
        .iter()
        .map(|result| {
            let name = result
                .source
                .strip_prefix(scan_root)
                .unwrap_or(&result.source)
                .display()
                .to_string();
            match &result.outcome {
                ConversionOutcome::Converted => format!("{name} ✓"),
                ConversionOutcome::Skipped => format!("{name} (skipped, already converted)"),
                ConversionOutcome::Failed(e) => format!("{name} ✗ {e}"),
            }
        })
        .collect()
}

pub fn summary_message(stats: &ConversionStats) -> String {
    if stats.total == 0 {
        return NOTHING_FOUND.to_string();
    }
    format!(
        "Converted {} of {} files ({} skipped, {} failed).",
        stats.successful, stats.total, stats.skipped, stats.failed
    )
}

/// Build an engine from front-end options.
pub fn engine_for(
    src_path: &str,
    opts: &ConvertOptions,
    converter: &Converter,
) -> Result<ConvertEngine, String> {
    let source = expand_path(src_path.trim());
    let dest = match opts.dest_type {
        DestType::Custom => {
            let dest = opts.dest_path.trim();
            if dest.is_empty() {
                return Err("Please choose a destination folder for custom output.".to_string());
            }
            Some(expand_path(dest))
        }
        _ => None,
    };

    let config = ConfigBuilder::new()
        .source(&source)
        .recursive(opts.recursive)
        .organize(opts.dest_type == DestType::Converted)
        .preserve_structure(opts.dest_type == DestType::Custom && opts.preserve)
        .destination(dest)
        .build()
        .map_err(|e| e.to_string())?;

    Ok(ConvertEngine::new(config, converter.clone()))
}

/// Convert `src_path` with `opts`, the way a front-end "Convert" button does.
pub async fn convert_request(
    src_path: &str,
    opts: &ConvertOptions,
    converter: &Converter,
) -> ConvertResponse {
    if src_path.trim().is_empty() {
        return ConvertResponse::rejected("Please select a file or folder first.");
    }

    let engine = match engine_for(src_path, opts, converter) {
        Ok(engine) => engine,
        Err(message) => return ConvertResponse::rejected(message),
    };

    let report = engine.convert_all().await;
    if report.is_empty() {
        tracing::info!("Nothing to convert: no .{} files at {}", SOURCE_EXTENSION, src_path);
        return ConvertResponse::rejected(NOTHING_FOUND);
    }

    ConvertResponse {
        success: report.stats.failed == 0,
        message: summary_message(&report.stats),
        stats: report.stats,
        log: log_lines(&report, &engine.config().scan_root()),
    }
}
