use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::converter::{self, Converter};
use crate::error::ConvertError;

/// Extension of the files we look for (compared case-insensitively).
pub const SOURCE_EXTENSION: &str = "wpd";
/// Extension the converter produces.
pub const OUTPUT_EXTENSION: &str = "docx";
/// Subfolder used by [`DestinationPolicy::Organized`].
pub const ORGANIZED_DIR_NAME: &str = "Converted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationPolicy {
    /// Next to the source file.
    SameFolder,
    /// In a `Converted` folder next to the source file.
    Organized,
    /// Under a user-chosen root, optionally mirroring the source tree.
    Custom { root: PathBuf, preserve_structure: bool },
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub source: PathBuf,
    pub recursive: bool,
    pub destination: DestinationPolicy,
}

impl ConvertConfig {
    /// Directory that structure preservation is relative to.
    pub fn scan_root(&self) -> PathBuf {
        if self.source.is_dir() {
            self.source.clone()
        } else {
            parent_dir(&self.source)
        }
    }
}

#[derive(Debug)]
pub enum ConversionOutcome {
    Converted,
    /// Output already existed; nothing was run.
    Skipped,
    Failed(ConvertError),
}

#[derive(Debug)]
pub struct ConversionResult {
    pub source: PathBuf,
    /// Where the `.docx` was (or would have been) written. `None` if the
    /// file failed before a destination could be worked out.
    pub output: Option<PathBuf>,
    pub outcome: ConversionOutcome,
}

impl ConversionResult {
    fn failed(source: &Path, output: Option<PathBuf>, err: ConvertError) -> Self {
        Self {
            source: source.to_path_buf(),
            output,
            outcome: ConversionOutcome::Failed(err),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ConversionOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&ConvertError> {
        match &self.outcome {
            ConversionOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ConversionStats {
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        self.total += 1;
        match outcome {
            ConversionOutcome::Converted => self.successful += 1,
            ConversionOutcome::Skipped => self.skipped += 1,
            ConversionOutcome::Failed(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<ConversionResult>,
    pub stats: ConversionStats,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.stats.total == 0
    }
}

/// True if `path` ends in `.wpd`, any case.
pub fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Find the `.wpd` files under `root`.
///
/// A matching file yields itself; a directory yields its matching files
/// (top level only unless `recursive`). Anything else yields nothing.
pub fn discover_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    if root.is_file() {
        return if has_source_extension(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    if !root.is_dir() {
        return Vec::new();
    }

    let walker = WalkDir::new(root).min_depth(1).follow_links(true);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_source_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Parent of `path`, or `.` for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Directory the converted file for `file` goes to.
pub fn resolve_output_dir(file: &Path, scan_root: &Path, policy: &DestinationPolicy) -> PathBuf {
    let parent = parent_dir(file);
    match policy {
        DestinationPolicy::SameFolder => parent,
        DestinationPolicy::Organized => parent.join(ORGANIZED_DIR_NAME),
        DestinationPolicy::Custom {
            root,
            preserve_structure: false,
        } => root.clone(),
        DestinationPolicy::Custom {
            root,
            preserve_structure: true,
        } => match parent.strip_prefix(scan_root) {
            Ok(relative) => root.join(relative),
            Err(_) => root.clone(),
        },
    }
}

/// `<output_dir>/<stem>.docx`
pub fn output_path_for(file: &Path, output_dir: &Path) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    output_dir.join(name)
}

/// Outputs handed out so far in one batch, mapped to the source that got them.
///
/// Two sources can land on the same `.docx` (a flat custom destination, or
/// `memo.wpd` next to `memo.WPD`). Only the first one may write it.
#[derive(Debug, Default)]
pub struct OutputClaims {
    claimed: HashMap<PathBuf, PathBuf>,
}

impl OutputClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `output` for `source`, or return the source that already has it.
    pub fn claim(&mut self, source: &Path, output: &Path) -> Result<(), PathBuf> {
        match self.claimed.get(output) {
            Some(first) if first != source => Err(first.clone()),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(output.to_path_buf(), source.to_path_buf());
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertEngine {
    config: ConvertConfig,
    converter: Converter,
}

impl ConvertEngine {
    pub fn new(config: ConvertConfig, converter: Converter) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn scan(&self) -> Vec<PathBuf> {
        discover_files(&self.config.source, self.config.recursive)
    }

    pub fn output_dir_for(&self, file: &Path) -> PathBuf {
        resolve_output_dir(file, &self.config.scan_root(), &self.config.destination)
    }

    /// Convert one file. Never fails: problems end up in the result.
    pub async fn convert_file(&self, file: &Path) -> ConversionResult {
        let path = file.to_path_buf();
        if !file.exists() {
            return ConversionResult::failed(file, None, ConvertError::SourceMissing { path });
        }
        if !file.is_file() {
            return ConversionResult::failed(file, None, ConvertError::NotAFile { path });
        }
        if !has_source_extension(file) {
            return ConversionResult::failed(
                file,
                None,
                ConvertError::WrongExtension {
                    path: file.to_path_buf(),
                    expected: SOURCE_EXTENSION,
                },
            );
        }
        if let Err(e) = fs::File::open(file) {
            tracing::warn!("Cannot read {}: {}", file.display(), e);
            return ConversionResult::failed(file, None, ConvertError::Io(e));
        }

        let output_dir = self.output_dir_for(file);
        let output = output_path_for(file, &output_dir);

        if let Err(source) = fs::create_dir_all(&output_dir) {
            tracing::warn!("Cannot create {}: {}", output_dir.display(), source);
            return ConversionResult::failed(
                file,
                Some(output),
                ConvertError::CreateOutputDir { path: output_dir, source },
            );
        }

        if output.exists() {
            tracing::info!("Skipping {}: {} already exists", file.display(), output.display());
            return ConversionResult {
                source: file.to_path_buf(),
                output: Some(output),
                outcome: ConversionOutcome::Skipped,
            };
        }

        tracing::info!("Converting {} -> {}", file.display(), output_dir.display());

        let outcome = match self.converter.run(file, &output_dir).await {
            Ok(log) => {
                tracing::debug!("Converter output for {}: {}", file.display(), log);
                if output.exists() {
                    ConversionOutcome::Converted
                } else {
                    if let Some(reported) = converter::reported_output(&log) {
                        tracing::warn!(
                            "Converter reported {} but {} is missing",
                            reported.display(),
                            output.display()
                        );
                    }
                    ConversionOutcome::Failed(ConvertError::OutputMissing {
                        path: output.clone(),
                        detail: converter::extract_error_line(&log),
                    })
                }
            }
            Err(e) => ConversionOutcome::Failed(e),
        };

        if let ConversionOutcome::Failed(e) = &outcome {
            tracing::warn!("Conversion of {} failed: {}", file.display(), e);
        }

        ConversionResult {
            source: file.to_path_buf(),
            output: Some(output),
            outcome,
        }
    }

    /// [`convert_file`](Self::convert_file), unless an earlier file in the
    /// batch already claimed the same output.
    pub async fn convert_claimed(
        &self,
        file: &Path,
        claims: &mut OutputClaims,
    ) -> ConversionResult {
        let output = output_path_for(file, &self.output_dir_for(file));
        if let Err(first) = claims.claim(file, &output) {
            tracing::warn!(
                "{} would overwrite {} from {}",
                file.display(),
                output.display(),
                first.display()
            );
            return ConversionResult::failed(
                file,
                Some(output.clone()),
                ConvertError::OutputCollision { path: output, first },
            );
        }
        self.convert_file(file).await
    }

    pub async fn convert_all(&self) -> BatchReport {
        self.convert_all_with(|_, _| {}).await
    }

    /// Convert every discovered file in order, calling `on_result` after each.
    pub async fn convert_all_with<F>(&self, on_result: F) -> BatchReport
    where
        F: FnMut(usize, &ConversionResult),
    {
        let files = self.scan();
        if files.is_empty() {
            tracing::info!(
                "No .{} files found under {}",
                SOURCE_EXTENSION,
                self.config.source.display()
            );
            return BatchReport::default();
        }
        self.convert_files(&files, on_result).await
    }

    /// Convert an already scanned list in order, calling `on_result` after each.
    pub async fn convert_files<F>(&self, files: &[PathBuf], mut on_result: F) -> BatchReport
    where
        F: FnMut(usize, &ConversionResult),
    {
        let mut report = BatchReport::default();
        let mut claims = OutputClaims::new();

        for (index, file) in files.iter().enumerate() {
            let result = self.convert_claimed(file, &mut claims).await;
            report.stats.record(&result.outcome);
            on_result(index, &result);
            report.results.push(result);
        }

        tracing::info!(
            "Batch finished: {} total, {} converted, {} skipped, {} failed",
            report.stats.total,
            report.stats.successful,
            report.stats.skipped,
            report.stats.failed
        );

        report
    }
}

// Builder for ConvertConfig
pub struct ConfigBuilder {
    source: Option<PathBuf>,
    recursive: bool,
    organize: bool,
    destination: Option<PathBuf>,
    preserve_structure: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            recursive: false,
            organize: false,
            destination: None,
            preserve_structure: false,
        }
    }

    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn organize(mut self, organize: bool) -> Self {
        self.organize = organize;
        self
    }

    pub fn destination<P: AsRef<Path>>(mut self, dest: Option<P>) -> Self {
        self.destination = dest.map(|d| d.as_ref().to_path_buf());
        self
    }

    pub fn preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }

    pub fn build(self) -> Result<ConvertConfig> {
        let source = self.source
            .ok_or_else(|| anyhow::anyhow!("Source path is required"))?;

        let destination = match (self.destination, self.organize) {
            (Some(_), true) => {
                return Err(anyhow::anyhow!(
                    "Cannot organize into a subfolder and use a custom destination at once"
                ));
            }
            (Some(root), false) => DestinationPolicy::Custom {
                root,
                preserve_structure: self.preserve_structure,
            },
            (None, true) => DestinationPolicy::Organized,
            (None, false) => {
                if self.preserve_structure {
                    return Err(anyhow::anyhow!(
                        "Preserving structure requires a custom destination"
                    ));
                }
                DestinationPolicy::SameFolder
            }
        };

        Ok(ConvertConfig {
            source,
            recursive: self.recursive,
            destination,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_source_extension() {
        assert!(has_source_extension(Path::new("letter.wpd")));
        assert!(has_source_extension(Path::new("LETTER.WPD")));
        assert!(!has_source_extension(Path::new("letter.doc")));
        assert!(!has_source_extension(Path::new("wpd")));
    }

    #[test]
    fn test_resolve_output_dir_policies() {
        let root = Path::new("/docs");
        let file = Path::new("/docs/2001/letters/a.wpd");

        assert_eq!(
            resolve_output_dir(file, root, &DestinationPolicy::SameFolder),
            PathBuf::from("/docs/2001/letters")
        );
        assert_eq!(
            resolve_output_dir(file, root, &DestinationPolicy::Organized),
            PathBuf::from("/docs/2001/letters/Converted")
        );
        assert_eq!(
            resolve_output_dir(
                file,
                root,
                &DestinationPolicy::Custom {
                    root: PathBuf::from("/out"),
                    preserve_structure: false
                }
            ),
            PathBuf::from("/out")
        );
        assert_eq!(
            resolve_output_dir(
                file,
                root,
                &DestinationPolicy::Custom { root: PathBuf::from("/out"), preserve_structure: true }
            ),
            PathBuf::from("/out/2001/letters")
        );
    }

    #[test]
    fn test_preserve_structure_outside_scan_root_falls_back() {
        let policy = DestinationPolicy::Custom {
            root: PathBuf::from("/out"),
            preserve_structure: true,
        };
        assert_eq!(
            resolve_output_dir(Path::new("/elsewhere/a.wpd"), Path::new("/docs"), &policy),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_bare_file_name_resolves_to_current_dir() {
        let file = Path::new("letter.wpd");
        assert_eq!(
            resolve_output_dir(file, Path::new("."), &DestinationPolicy::SameFolder),
            PathBuf::from(".")
        );
        assert_eq!(
            resolve_output_dir(file, Path::new("."), &DestinationPolicy::Organized),
            PathBuf::from("./Converted")
        );

        let config = ConvertConfig {
            source: PathBuf::from("no-such-letter.wpd"),
            recursive: false,
            destination: DestinationPolicy::SameFolder,
        };
        assert_eq!(config.scan_root(), PathBuf::from("."));
    }

    #[test]
    fn test_output_claims() {
        let mut claims = OutputClaims::new();
        let out = Path::new("/out/letter.docx");
        assert!(claims.claim(Path::new("/docs/2001/letter.wpd"), out).is_ok());
        assert!(claims.claim(Path::new("/docs/2001/letter.wpd"), out).is_ok());
        assert_eq!(
            claims.claim(Path::new("/docs/2002/letter.wpd"), out),
            Err(PathBuf::from("/docs/2001/letter.wpd"))
        );
        assert!(claims.claim(Path::new("/docs/memo.wpd"), Path::new("/out/memo.docx")).is_ok());
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("/docs/Memo.Final.wpd"), Path::new("/out")),
            PathBuf::from("/out/Memo.Final.docx")
        );
    }

    #[test]
    fn test_stats_record() {
        let mut stats = ConversionStats::default();
        stats.record(&ConversionOutcome::Converted);
        stats.record(&ConversionOutcome::Skipped);
        stats.record(&ConversionOutcome::Failed(ConvertError::Timeout(1)));
        assert_eq!(stats, ConversionStats { total: 3, successful: 1, failed: 1, skipped: 1 });
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .source("/docs")
            .recursive(true)
            .destination(Some("/out"))
            .preserve_structure(true)
            .build()
            .unwrap();

        assert!(config.recursive);
        assert_eq!(
            config.destination,
            DestinationPolicy::Custom { root: PathBuf::from("/out"), preserve_structure: true }
        );

        let organized = ConfigBuilder::new().source("/docs").organize(true).build().unwrap();
        assert_eq!(organized.destination, DestinationPolicy::Organized);
    }

    #[test]
    fn test_config_builder_rejects_conflicts() {
        assert!(ConfigBuilder::new().build().is_err());
        assert!(ConfigBuilder::new()
            .source("/docs")
            .organize(true)
            .destination(Some("/out"))
            .build()
            .is_err());
        assert!(ConfigBuilder::new()
            .source("/docs")
            .preserve_structure(true)
            .build()
            .is_err());
    }
}
