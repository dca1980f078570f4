use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Scrollbar,
        ScrollbarOrientation, Wrap,
    },
    Frame,
};

use crate::api::DestType;
use crate::convert_engine::ORGANIZED_DIR_NAME;
use super::app::App;
use super::models::{ConfigInputMode, ProcessingStatus};
use super::utils::centered_rect;

const TITLE: &str = "WordPerfect → Word Converter";

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    if app.show_config {
        render_config_screen(f, size, app);
    } else {
        render_main_screen(f, size, app);
    }

    if app.show_summary {
        render_summary_popup(f, app);
    }

    if app.show_help {
        render_help_popup(f, app);
    }
}

fn field_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn field_block(title: &str, active: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        })
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

pub fn render_config_screen(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(area);

    let header = Paragraph::new(format!("{TITLE} - Configuration"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, chunks[0]);

    let custom = app.dest_type == DestType::Custom;
    let mut form_constraints = vec![
        Constraint::Length(3), // Source
        Constraint::Length(3), // Recursive
        Constraint::Length(3), // Destination
    ];
    if custom {
        form_constraints.push(Constraint::Length(3)); // Destination path
        form_constraints.push(Constraint::Length(3)); // Preserve
    }
    form_constraints.push(Constraint::Length(3)); // Confirm
    form_constraints.push(Constraint::Min(1));

    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(form_constraints)
        .split(chunks[1]);

    let mode = app.config_input_mode;
    let mut idx = 0;

    let source = Paragraph::new(app.source_input.as_str())
        .style(field_style(mode == ConfigInputMode::Source))
        .block(field_block(
            "File or folder containing .wpd files",
            mode == ConfigInputMode::Source,
        ));
    f.render_widget(source, form_chunks[idx]);
    idx += 1;

    let recursive_text = if mode == ConfigInputMode::Recursive {
        "Search sub-folders? Press Y or N".to_string()
    } else {
        yes_no(app.recursive).to_string()
    };
    let recursive = Paragraph::new(recursive_text)
        .style(field_style(mode == ConfigInputMode::Recursive))
        .block(field_block("Search sub-folders (recursive)", mode == ConfigInputMode::Recursive));
    f.render_widget(recursive, form_chunks[idx]);
    idx += 1;

    let destination_text = if mode == ConfigInputMode::Destination {
        format!("S = same folder, C = '{ORGANIZED_DIR_NAME}' sub-folder, D = custom folder")
    } else {
        match app.dest_type {
            DestType::Same => "Same folder as each file".to_string(),
            DestType::Converted => format!("'{ORGANIZED_DIR_NAME}' sub-folder next to each file"),
            DestType::Custom => "Custom folder".to_string(),
        }
    };
    let destination = Paragraph::new(destination_text)
        .style(field_style(mode == ConfigInputMode::Destination))
        .block(field_block("Output location", mode == ConfigInputMode::Destination));
    f.render_widget(destination, form_chunks[idx]);
    idx += 1;

    if custom {
        let dest_path = Paragraph::new(app.dest_path_input.as_str())
            .style(field_style(mode == ConfigInputMode::DestinationPath))
            .block(field_block("Destination folder", mode == ConfigInputMode::DestinationPath));
        f.render_widget(dest_path, form_chunks[idx]);
        idx += 1;

        let preserve_text = if mode == ConfigInputMode::Preserve {
            "Keep the source folder structure? Press Y or N".to_string()
        } else {
            yes_no(app.preserve).to_string()
        };
        let preserve = Paragraph::new(preserve_text)
            .style(field_style(mode == ConfigInputMode::Preserve))
            .block(field_block("Preserve folder structure", mode == ConfigInputMode::Preserve));
        f.render_widget(preserve, form_chunks[idx]);
        idx += 1;
    }

    if mode == ConfigInputMode::Confirm {
        let (text, color) = match &app.converter {
            Ok(_) => ("Press ENTER to find .wpd files".to_string(), Color::Green),
            Err(message) => (message.clone(), Color::Red),
        };
        let confirm = Paragraph::new(text)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Ready")
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(confirm, form_chunks[idx]);
    }

    let instructions = match mode {
        ConfigInputMode::Source => "Type the path of a .wpd file or a folder, then press Enter",
        ConfigInputMode::Recursive => "Y to include sub-folders, N for this folder only (← Back)",
        ConfigInputMode::Destination => "Choose where the .docx files go (← Back)",
        ConfigInputMode::DestinationPath => {
            "Type the destination folder, then press Enter (← Back)"
        }
        ConfigInputMode::Preserve => "Y to mirror sub-folders under the destination (← Back)",
        ConfigInputMode::Confirm => "Review your settings and press Enter (← Back)",
    };

    let mut help_lines = vec![Line::from(instructions)];
    if let Some(status) = &app.status_message {
        help_lines.push(Line::from(Span::styled(status.clone(), Style::default().fg(Color::Cyan))));
    } else {
        help_lines.push(Line::from(""));
    }
    help_lines.push(Line::from("Navigation: ← Back | Enter: Next/Confirm | Esc: Quit"));

    let help_text = Paragraph::new(help_lines)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Instructions"));

    f.render_widget(help_text, chunks[2]);
}

pub fn render_main_screen(f: &mut Frame, area: Rect, app: &App) {
    let chunks = if app.show_details {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(area)
    };

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    render_header(f, left_chunks[0], app);
    render_file_list(f, left_chunks[1], app);
    render_status_bar(f, left_chunks[2], app);

    if app.show_details && chunks.len() > 1 {
        render_details_panel(f, chunks[1], app);
    }
}

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.finished {
        format!("{TITLE} - Completed!")
    } else if app.running {
        format!("{TITLE} - Converting...")
    } else {
        TITLE.to_string()
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

pub fn status_tag(status: ProcessingStatus) -> (&'static str, Color) {
    match status {
        ProcessingStatus::Pending => ("[PENDING]", Color::Yellow),
        ProcessingStatus::Converting => ("[CONVERTING]", Color::Blue),
        ProcessingStatus::Converted => ("[CONVERTED]", Color::Green),
        ProcessingStatus::Skipped => ("[SKIPPED]", Color::Gray),
        ProcessingStatus::Failed => ("[FAILED]", Color::Red),
    }
}

pub fn render_file_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let (tag, color) = status_tag(file.status);
            let name_style = if app.current_processing == Some(i) {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{tag} "), Style::default().fg(color)),
                Span::styled(file.display_name.clone(), name_style),
            ]))
        })
        .collect();

    let files_list = List::new(items)
        .block(
            Block::default()
                .title(format!("Files to Convert ({})", app.files.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(files_list, area, &mut app.list_state.clone());

    if app.files.len() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let progress_label = if let Some(status_msg) = &app.status_message {
        status_msg.clone()
    } else if app.finished {
        format!(
            "Complete! {} converted, {} skipped, {} failed",
            app.stats.successful, app.stats.skipped, app.stats.failed
        )
    } else if app.running {
        format!("Converting... {}/{}", app.processed + 1, app.files.len())
    } else {
        format!("Ready to convert {} files", app.files.len())
    };

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent((app.processing_progress * 100.0).clamp(0.0, 100.0) as u16)
        .label(progress_label);

    f.render_widget(progress, chunks[0]);

    let controls_text = if app.finished {
        "b: back, h: help, q: quit"
    } else if app.running {
        "Converting..."
    } else {
        "ENTER: start, b: back, q: quit"
    };

    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    f.render_widget(controls, chunks[1]);
}

pub fn render_details_panel(f: &mut Frame, area: Rect, app: &App) {
    let Some(file) = app.list_state.selected().and_then(|i| app.files.get(i)) else {
        return;
    };

    let (tag, color) = status_tag(file.status);
    let mut lines = vec![
        Line::from("Source:"),
        Line::from(Span::styled(
            file.source.display().to_string(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from("Output folder:"),
        Line::from(Span::styled(
            file.output_dir.display().to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled(tag, Style::default().fg(color))),
    ];

    if let Some(error) = &file.error_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(Color::Red),
        )));
    }

    let details = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(details, area);
}

pub fn render_summary_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 40, f.area());
    let elapsed = app
        .start_time
        .map(|t| format!("{:.1}s", t.elapsed().as_secs_f64()))
        .unwrap_or_default();

    let stat = |label: &str, value: usize, color: Color| {
        Line::from(Span::styled(format!("{label:<12}{value}"), Style::default().fg(color)))
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(Span::styled("Conversion complete", bold)),
        Line::from(""),
        Line::from(format!("Total:      {}", app.stats.total)),
        stat("Converted:", app.stats.successful, Color::Green),
        stat("Skipped:", app.stats.skipped, Color::Gray),
        stat("Failed:", app.stats.failed, Color::Red),
        Line::from(format!("Time:       {elapsed}")),
        Line::from(""),
        Line::from(Span::styled("Press Enter to close", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title("Finished")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

pub fn render_help_popup(f: &mut Frame, _app: &App) {
    let popup_area = centered_rect(60, 50, f.area());

    let help_text = vec![
        Line::from(vec![
            Span::styled(format!("{TITLE} - Help"), Style::default().add_modifier(Modifier::BOLD))
        ]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Up/k    - Move up"),
        Line::from("  Down/j  - Move down"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from("  Enter   - Start converting"),
        Line::from("  b       - Back to settings"),
        Line::from("  d       - Toggle details panel"),
        Line::from("  h/F1    - Toggle this help"),
        Line::from("  q/Esc   - Quit application"),
        Line::from(""),
        Line::from("Files whose .docx already exists are skipped."),
        Line::from("Conversion is done by LibreOffice in headless mode."),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press Esc or h to close", Style::default().fg(Color::Gray))
        ]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
