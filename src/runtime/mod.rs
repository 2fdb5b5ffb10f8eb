use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::audio::RodioOutput;
use crate::control::Controller;
use crate::library::LoftyProbe;
use crate::session::SystemClock;

mod commands;
mod event_loop;
mod logging;
mod settings;

use commands::Command;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    let log_path = logging::init(&settings.log);
    info!("fermata starting");

    let output = RodioOutput::open()?;
    let mut controller = Controller::new(
        Box::new(output),
        Arc::new(LoftyProbe),
        Arc::new(SystemClock),
        &settings,
    );
    controller.start_scheduler(Duration::from_millis(settings.scheduler.tick_interval_ms))?;

    let mut app = App::new(
        settings.session.default_duration.clone(),
        settings.audio.volume_step,
    );
    if let Some(path) = &log_path {
        app.info(format!("Logging to {}", path.display()));
    }
    if let Some(dir) = env::args().nth(1) {
        commands::execute(Command::Scan(PathBuf::from(dir)), &mut app, &controller);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.shutdown();
    info!("fermata stopped");

    run_result
}
