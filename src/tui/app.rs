use std::time::{Duration, Instant};

use ratatui::widgets::{ListState, ScrollbarState};

use crate::api::DestType;
use crate::convert_engine::{ConversionStats, ConvertEngine, OutputClaims};
use crate::converter::Converter;
use super::models::{ConfigInputMode, FileItem};

#[derive(Debug)]
pub struct App {
    pub files: Vec<FileItem>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
    pub current_processing: Option<usize>,
    pub processing_progress: f64,
    pub show_help: bool,
    pub show_details: bool,
    pub show_config: bool,
    pub show_summary: bool,
    pub config_input_mode: ConfigInputMode,
    pub source_input: String,
    pub recursive: bool,
    pub dest_type: DestType,
    pub dest_path_input: String,
    pub preserve: bool,
    pub start_time: Option<Instant>,
    pub running: bool,
    pub finished: bool,
    pub stats: ConversionStats,
    pub processed: usize,
    pub converter: Result<Converter, String>,
    pub engine: Option<ConvertEngine>,
    pub claims: OutputClaims,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    /// `converter` carries the locate error message when LibreOffice is
    /// missing, so the form can still be shown.
    pub fn new(converter: Result<Converter, String>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            files: Vec::new(),
            list_state,
            scroll_state: ScrollbarState::default(),
            current_processing: None,
            processing_progress: 0.0,
            show_help: false,
            show_details: true,
            show_config: true,
            show_summary: false,
            config_input_mode: ConfigInputMode::Source,
            source_input: String::new(),
            recursive: false,
            dest_type: DestType::Same,
            dest_path_input: String::new(),
            preserve: false,
            start_time: None,
            running: false,
            finished: false,
            stats: ConversionStats::default(),
            processed: 0,
            converter,
            engine: None,
            claims: OutputClaims::new(),
            status_message: None,
            status_message_time: None,
        }
    }

    pub fn with_source(source: String, converter: Result<Converter, String>) -> Self {
        let mut app = Self::new(converter);
        app.source_input = source;
        if !app.source_input.is_empty() {
            app.config_input_mode = ConfigInputMode::Recursive;
        }
        app
    }

    pub fn next(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.files.len() => i + 1,
            _ => 0,
        };
        self.select(i);
    }

    pub fn previous(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.files.len() - 1,
            Some(i) => i - 1,
        };
        self.select(i);
    }

    fn select(&mut self, i: usize) {
        self.list_state.select(Some(i));
        self.scroll_state = ScrollbarState::new(self.files.len()).position(i);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_details(&mut self) {
        self.show_details = !self.show_details;
    }

    pub fn dismiss_summary(&mut self) {
        self.show_summary = false;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let (Some(_), Some(time)) = (&self.status_message, self.status_message_time) {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::tui::models::ProcessingStatus;

    fn item(name: &str) -> FileItem {
        FileItem {
            source: PathBuf::from(name),
            display_name: name.to_string(),
            output_dir: PathBuf::from("."),
            status: ProcessingStatus::Pending,
            error_message: None,
        }
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = App::new(Err("missing".to_string()));
        app.files = vec![item("a.wpd"), item("b.wpd"), item("c.wpd")];

        app.previous();
        assert_eq!(app.list_state.selected(), Some(2));
        app.next();
        assert_eq!(app.list_state.selected(), Some(0));
        app.next();
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn test_with_source_skips_path_step() {
        let app = App::with_source("/docs".to_string(), Err("missing".to_string()));
        assert_eq!(app.config_input_mode, ConfigInputMode::Recursive);

        let app = App::with_source(String::new(), Err("missing".to_string()));
        assert_eq!(app.config_input_mode, ConfigInputMode::Source);
    }
}
