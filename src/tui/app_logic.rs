use crossterm::event::KeyCode;
use ratatui::widgets::ScrollbarState;

use crate::api::{self, ConvertOptions, DestType, NOTHING_FOUND};
use crate::convert_engine::{ConversionStats, OutputClaims};
use super::app::App;
use super::models::{ConfigInputMode, FileItem, ProcessingStatus};

impl App {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            recursive: self.recursive,
            dest_type: self.dest_type,
            dest_path: self.dest_path_input.clone(),
            preserve: self.preserve,
        }
    }

    // Configuration input handling
    pub fn handle_config_input(&mut self, c: char) {
        match self.config_input_mode {
            ConfigInputMode::Source => match c {
                '\n' | '\r' => self.advance_config_step(),
                '\x08' => {
                    self.source_input.pop();
                }
                _ => self.source_input.push(c),
            },
            ConfigInputMode::DestinationPath => match c {
                '\n' | '\r' => self.advance_config_step(),
                '\x08' => {
                    self.dest_path_input.pop();
                }
                _ => self.dest_path_input.push(c),
            },
            ConfigInputMode::Recursive => match c.to_ascii_lowercase() {
                'y' => {
                    self.recursive = true;
                    self.advance_config_step();
                }
                'n' => {
                    self.recursive = false;
                    self.advance_config_step();
                }
                _ => {}
            },
            ConfigInputMode::Destination => {
                let choice = match c.to_ascii_lowercase() {
                    's' => Some(DestType::Same),
                    'c' => Some(DestType::Converted),
                    'd' => Some(DestType::Custom),
                    _ => None,
                };
                if let Some(dest_type) = choice {
                    self.dest_type = dest_type;
                    self.advance_config_step();
                }
            }
            ConfigInputMode::Preserve => match c.to_ascii_lowercase() {
                'y' => {
                    self.preserve = true;
                    self.advance_config_step();
                }
                'n' => {
                    self.preserve = false;
                    self.advance_config_step();
                }
                _ => {}
            },
            ConfigInputMode::Confirm => {}
        }
    }

    pub fn advance_config_step(&mut self) {
        self.config_input_mode = match self.config_input_mode {
            ConfigInputMode::Source => {
                if self.source_input.trim().is_empty() {
                    self.set_status_message("Please enter a file or folder first.".to_string());
                    ConfigInputMode::Source
                } else {
                    ConfigInputMode::Recursive
                }
            }
            ConfigInputMode::Recursive => ConfigInputMode::Destination,
            ConfigInputMode::Destination => {
                if self.dest_type == DestType::Custom {
                    ConfigInputMode::DestinationPath
                } else {
                    ConfigInputMode::Confirm
                }
            }
            ConfigInputMode::DestinationPath => {
                if self.dest_path_input.trim().is_empty() {
                    self.set_status_message("Please enter a destination folder.".to_string());
                    ConfigInputMode::DestinationPath
                } else {
                    ConfigInputMode::Preserve
                }
            }
            ConfigInputMode::Preserve => ConfigInputMode::Confirm,
            ConfigInputMode::Confirm => ConfigInputMode::Confirm,
        };
    }

    pub fn go_back_config_step(&mut self) {
        self.config_input_mode = match self.config_input_mode {
            ConfigInputMode::Source => ConfigInputMode::Source,
            ConfigInputMode::Recursive => ConfigInputMode::Source,
            ConfigInputMode::Destination => ConfigInputMode::Recursive,
            ConfigInputMode::DestinationPath => ConfigInputMode::Destination,
            ConfigInputMode::Preserve => ConfigInputMode::DestinationPath,
            ConfigInputMode::Confirm => {
                if self.dest_type == DestType::Custom {
                    ConfigInputMode::Preserve
                } else {
                    ConfigInputMode::Destination
                }
            }
        };
    }

    pub fn handle_config_navigation(&mut self, key: KeyCode) {
        match key {
            KeyCode::Left | KeyCode::Backspace => self.go_back_config_step(),
            KeyCode::Right => {
                let mode = self.config_input_mode;
                if !mode.is_text_input() && mode != ConfigInputMode::Confirm {
                    self.advance_config_step();
                }
            }
            _ => {}
        }
    }

    /// Build the engine from the form and list the files it would convert.
    ///
    /// Stays on the config screen (with a status message) when the converter
    /// is missing, the options are invalid or nothing matches.
    pub fn prepare_batch(&mut self) {
        let converter = match &self.converter {
            Ok(converter) => converter.clone(),
            Err(message) => {
                self.set_status_message(message.clone());
                return;
            }
        };

        let engine = match api::engine_for(&self.source_input, &self.options(), &converter) {
            Ok(engine) => engine,
            Err(message) => {
                self.set_status_message(message);
                return;
            }
        };

        let scan_root = engine.config().scan_root();
        self.files = engine
            .scan()
            .into_iter()
            .map(|source| FileItem {
                display_name: source
                    .strip_prefix(&scan_root)
                    .unwrap_or(&source)
                    .display()
                    .to_string(),
                output_dir: engine.output_dir_for(&source),
                source,
                status: ProcessingStatus::Pending,
                error_message: None,
            })
            .collect();

        if self.files.is_empty() {
            self.set_status_message(NOTHING_FOUND.to_string());
            return;
        }

        self.stats = ConversionStats::default();
        self.processed = 0;
        self.processing_progress = 0.0;
        self.finished = false;
        self.claims = OutputClaims::new();
        self.engine = Some(engine);
        self.list_state.select(Some(0));
        self.scroll_state = ScrollbarState::new(self.files.len()).position(0);
        self.show_config = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Converter;

    #[test]
    fn test_config_steps_for_custom_destination() {
        let mut app = App::new(Err("missing".to_string()));
        for c in "/docs".chars() {
            app.handle_config_input(c);
        }
        app.handle_config_input('\n');
        assert_eq!(app.config_input_mode, ConfigInputMode::Recursive);

        app.handle_config_input('y');
        assert!(app.recursive);
        assert_eq!(app.config_input_mode, ConfigInputMode::Destination);

        app.handle_config_input('d');
        assert_eq!(app.config_input_mode, ConfigInputMode::DestinationPath);
        for c in "/out".chars() {
            app.handle_config_input(c);
        }
        app.handle_config_input('\n');
        app.handle_config_input('y');
        assert_eq!(app.config_input_mode, ConfigInputMode::Confirm);

        let opts = app.options();
        assert_eq!(opts.dest_type, DestType::Custom);
        assert_eq!(opts.dest_path, "/out");
        assert!(opts.preserve);

        app.go_back_config_step();
        assert_eq!(app.config_input_mode, ConfigInputMode::Preserve);
    }

    #[test]
    fn test_same_folder_skips_destination_path() {
        let mut app = App::with_source("/docs".to_string(), Err("missing".to_string()));
        app.handle_config_input('n');
        app.handle_config_input('s');
        assert_eq!(app.config_input_mode, ConfigInputMode::Confirm);
        app.go_back_config_step();
        assert_eq!(app.config_input_mode, ConfigInputMode::Destination);
    }

    #[test]
    fn test_empty_source_does_not_advance() {
        let mut app = App::new(Err("missing".to_string()));
        app.handle_config_input('\n');
        assert_eq!(app.config_input_mode, ConfigInputMode::Source);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_prepare_batch_without_converter_stays_on_form() {
        let missing = Err("LibreOffice not found".to_string());
        let mut app = App::with_source("/docs".to_string(), missing);
        app.prepare_batch();
        assert!(app.show_config);
        assert_eq!(app.status_message.as_deref(), Some("LibreOffice not found"));
    }

    #[test]
    fn test_prepare_batch_nothing_found() {
        let mut app = App::with_source(
            "/definitely/not/a/real/folder".to_string(),
            Ok(Converter::new("soffice")),
        );
        app.prepare_batch();
        assert!(app.show_config);
        assert!(app.files.is_empty());
        assert_eq!(app.status_message.as_deref(), Some(NOTHING_FOUND));
    }
}
