//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::path::PathBuf;

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Focus, InputMode, MessageKind};
use crate::config::UiSettings;
use crate::control::Controller;
use crate::library::Track;
use crate::schedule::{Job, format_hms};
use crate::session::SessionStatus;

const CONTROLS: &[(&str, &str)] = &[
    ("tab", "switch pane"),
    ("j/k", "up/down"),
    ("J/K", "move track"),
    ("d", "delete track"),
    ("p", "play now"),
    ("s", "stop"),
    ("+/-", "volume"),
    (":", "command"),
    ("q", "quit"),
];

const COMMANDS: &str =
    "scan <dir> | at <H:M:S> [dur] | play [dur] | duration <dur> | stop | vol <0-100> | q";

/// Everything one frame shows, read from the controller in one go.
pub struct View {
    pub status: SessionStatus,
    pub tracks: Vec<Track>,
    pub jobs: Vec<Job>,
    pub volume: u8,
    pub folder: Option<PathBuf>,
    pub output_busy: bool,
    pub scheduler_running: bool,
}

impl View {
    pub fn capture(controller: &Controller) -> Self {
        Self {
            status: controller.status(),
            tracks: controller.tracks(),
            jobs: controller.jobs(),
            volume: controller.volume(),
            folder: controller.folder(),
            output_busy: controller.output_busy(),
            scheduler_running: controller.scheduler_running(),
        }
    }
}

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn status_text(view: &View, app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    if view.status.active {
        let label = view.status.current_label.as_deref().unwrap_or("-");
        parts.push(format!("Playing: {label}"));
        parts.push(format!(
            "Remaining: {}",
            format_hms(view.status.remaining_secs())
        ));
        if !view.output_busy {
            parts.push("(silent)".to_string());
        }
    } else {
        parts.push("Ready".to_string());
    }

    parts.push(format!("Volume: {}%", view.volume));
    parts.push(format!("Default: {}", app.default_duration));
    match &view.folder {
        Some(dir) => parts.push(format!("Dir: {}", dir.display())),
        None => parts.push("Dir: -".to_string()),
    }
    if !view.scheduler_running {
        parts.push("Scheduler: off".to_string());
    }
    parts.push(Local::now().format("%H:%M:%S").to_string());

    parts.join(" • ")
}

fn pane_block(title: &'static str, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn draw_tracks(frame: &mut Frame, area: Rect, app: &App, view: &View) {
    let items: Vec<ListItem> = view
        .tracks
        .iter()
        .map(|t| ListItem::new(format!("{}  [{}]", t.label, format_hms(t.duration_secs))))
        .collect();

    let focused = app.focus == Focus::Tracks;
    let list = List::new(items)
        .block(pane_block(" tracks ", focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !view.tracks.is_empty() && focused {
        state.select(Some(app.selected_track));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_jobs(frame: &mut Frame, area: Rect, app: &App, view: &View) {
    let items: Vec<ListItem> = view
        .jobs
        .iter()
        .map(|j| {
            ListItem::new(format!(
                "#{} {}  for {}  {}",
                j.id,
                j.target.format("%Y-%m-%d %H:%M:%S"),
                format_hms(j.duration_secs),
                j.status
            ))
        })
        .collect();

    let focused = app.focus == Focus::Jobs;
    let list = List::new(items)
        .block(pane_block(" schedule ", focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !view.jobs.is_empty() && focused {
        state.select(Some(app.selected_job));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn message_line(app: &App) -> Line<'static> {
    if app.input_mode == InputMode::Command {
        return Line::from(format!(":{}", app.input));
    }
    match &app.message {
        Some(msg) if msg.kind == MessageKind::Error => Line::from(msg.text.clone()).red(),
        Some(msg) => Line::from(msg.text.clone()),
        None => Line::from(COMMANDS).dim(),
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, view: &View, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" fermata ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(view, app)).block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" status "),
    );
    frame.render_widget(status, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    draw_tracks(frame, panes[0], app, view);
    draw_jobs(frame, panes[1], app, view);

    let message = Paragraph::new(message_line(app)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" message ")
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(message, chunks[3]);

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
