use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::converter::Converter;
use super::app::App;
use super::models::ConfigInputMode;
use super::rendering::ui;

pub async fn run_tui(source: Option<String>, converter: Result<Converter, String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = match source {
        Some(source) => App::with_source(source, converter),
        None => App::new(converter),
    };

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;

    if app.finished {
        println!(
            "Converted {} of {} files ({} skipped, {} failed).",
            app.stats.successful, app.stats.total, app.stats.skipped, app.stats.failed
        );
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.clear_status_message_if_expired();

        terminal.draw(|f| ui(f, app))?;

        // Keep converting between redraws; input is only polled briefly.
        let poll_timeout = if app.running {
            Duration::from_millis(0)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code) {
                    return Ok(());
                }
            }
        }

        if app.running {
            app.process_next().await;
        }
    }
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, code: KeyCode) -> bool {
    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') | KeyCode::F(1)) {
            app.toggle_help();
        }
        return false;
    }

    if app.show_summary {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
            app.dismiss_summary();
        } else if code == KeyCode::Char('q') {
            return true;
        }
        return false;
    }

    if app.show_config {
        return handle_config_key(app, code);
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => return !app.running,
        KeyCode::Char('h') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Char('d') => app.toggle_details(),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Enter | KeyCode::Char(' ') => app.start_processing(),
        KeyCode::Char('b') => {
            if !app.running {
                app.show_config = true;
                app.config_input_mode = ConfigInputMode::Confirm;
            }
        }
        _ => {}
    }
    false
}

fn handle_config_key(app: &mut App, code: KeyCode) -> bool {
    let text_input = app.config_input_mode.is_text_input();
    match code {
        KeyCode::Esc => return true,
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::Enter => {
            if app.config_input_mode == ConfigInputMode::Confirm {
                app.prepare_batch();
            } else {
                app.handle_config_input('\n');
            }
        }
        KeyCode::Backspace if text_input => app.handle_config_input('\x08'),
        KeyCode::Left | KeyCode::Right | KeyCode::Backspace => app.handle_config_navigation(code),
        KeyCode::Char('q') if !text_input => return true,
        KeyCode::Char(c) => app.handle_config_input(c),
        _ => {}
    }
    false
}
