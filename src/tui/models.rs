use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileItem {
    pub source: PathBuf,
    /// Path shown in the list, relative to the scan root.
    pub display_name: String,
    pub output_dir: PathBuf,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStatus {
    Pending,
    Converting,
    Converted,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigInputMode {
    Source,
    Recursive,
    Destination,
    DestinationPath,
    Preserve,
    Confirm,
}

impl ConfigInputMode {
    /// Steps that take free text rather than a single key.
    pub fn is_text_input(self) -> bool {
        matches!(self, ConfigInputMode::Source | ConfigInputMode::DestinationPath)
    }
}
