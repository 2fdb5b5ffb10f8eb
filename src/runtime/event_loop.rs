use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus, InputMode};
use crate::config;
use crate::control::Controller;
use crate::runtime::commands::{self, Command};
use crate::session::SessionEvent;
use crate::ui::{self, View};

/// Main terminal event loop: surfaces session events, draws the UI and
/// handles input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &Controller,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for event in controller.take_events() {
            report_event(app, event);
        }

        let view = View::capture(controller);
        app.clamp_selection(view.tracks.len(), view.jobs.len());
        terminal.draw(|f| ui::draw(f, app, &view, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(key, app, controller);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn report_event(app: &mut App, event: SessionEvent) {
    match event {
        SessionEvent::Completed => app.info("Playback finished"),
        SessionEvent::Failed(msg) => app.error(format!("Playback error: {msg}")),
    }
}

fn handle_key_event(key: KeyEvent, app: &mut App, controller: &Controller) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Command {
        match key.code {
            KeyCode::Esc => app.exit_command_mode(),
            KeyCode::Backspace => app.pop_input_char(),
            KeyCode::Enter => {
                let line = app.take_input();
                commands::run_line(&line, app, controller);
            }
            KeyCode::Char(c) if !c.is_control() => app.push_input_char(c),
            _ => {}
        }
        return;
    }

    let list_len = match app.focus {
        Focus::Tracks => controller.tracks().len(),
        Focus::Jobs => controller.jobs().len(),
    };

    match key.code {
        KeyCode::Char('q') => commands::execute(Command::Quit, app, controller),
        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.next(list_len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(list_len),
        KeyCode::Char('J') if app.focus == Focus::Tracks => {
            if controller.reorder(app.selected_track, 1) {
                app.selected_track += 1;
            }
        }
        KeyCode::Char('K') if app.focus == Focus::Tracks => {
            if controller.reorder(app.selected_track, -1) {
                app.selected_track -= 1;
            }
        }
        KeyCode::Char('d') if app.focus == Focus::Tracks => {
            if let Some(track) = controller.delete(app.selected_track) {
                app.info(format!("Removed {}", track.label));
                app.clamp_track_selection(list_len.saturating_sub(1));
            }
        }
        KeyCode::Char('p') => commands::execute(Command::Play(None), app, controller),
        KeyCode::Char('s') => commands::execute(Command::Stop, app, controller),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let percent = controller.volume().saturating_add(app.volume_step);
            commands::execute(Command::Volume(u32::from(percent)), app, controller);
        }
        KeyCode::Char('-') => {
            let percent = controller.volume().saturating_sub(app.volume_step);
            commands::execute(Command::Volume(u32::from(percent)), app, controller);
        }
        _ => {}
    }
}
