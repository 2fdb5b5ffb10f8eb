use std::path::PathBuf;

use thiserror::Error;

use crate::app::App;
use crate::control::Controller;
use crate::schedule::{format_hms, parse_duration};

/// A line typed after `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan(PathBuf),
    At {
        time: String,
        duration: Option<String>,
    },
    Play(Option<String>),
    Duration(String),
    Stop,
    Volume(u32),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("volume must be a number between 0 and 100, got {0:?}")]
    Volume(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    match name {
        "" => Err(CommandError::Empty),
        "scan" if rest.is_empty() => Err(CommandError::Usage("scan <folder>")),
        "scan" => Ok(Command::Scan(PathBuf::from(rest))),
        "at" => {
            let time = args.next().ok_or(CommandError::Usage("at <H:M:S> [duration]"))?;
            let duration = args.next().map(str::to_string);
            if args.next().is_some() {
                return Err(CommandError::Usage("at <H:M:S> [duration]"));
            }
            Ok(Command::At {
                time: time.to_string(),
                duration,
            })
        }
        "play" => Ok(Command::Play(args.next().map(str::to_string))),
        "duration" => args
            .next()
            .map(|d| Command::Duration(d.to_string()))
            .ok_or(CommandError::Usage("duration <H:M:S | M:S>")),
        "stop" => Ok(Command::Stop),
        "vol" | "volume" => {
            let arg = args.next().ok_or(CommandError::Usage("vol <0-100>"))?;
            arg.parse::<u32>()
                .map(Command::Volume)
                .map_err(|_| CommandError::Volume(arg.to_string()))
        }
        "q" | "quit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Parse and run one command line, reporting the outcome in `app.message`.
pub fn run_line(line: &str, app: &mut App, controller: &Controller) {
    match parse_command(line) {
        Ok(cmd) => execute(cmd, app, controller),
        Err(CommandError::Empty) => {}
        Err(e) => app.error(e.to_string()),
    }
}

pub fn execute(cmd: Command, app: &mut App, controller: &Controller) {
    match cmd {
        Command::Scan(folder) => match controller.scan_folder(&folder) {
            Ok(found) => {
                app.selected_track = 0;
                app.info(format!("Loaded {} tracks from {}", found.len(), folder.display()));
            }
            Err(e) => app.error(e.to_string()),
        },
        Command::At { time, duration } => {
            let duration = duration.unwrap_or_else(|| app.default_duration.clone());
            match controller.add_schedule(&time, &duration) {
                Ok(job) => app.info(format!(
                    "Scheduled #{} at {} for {}",
                    job.id,
                    job.target.format("%Y-%m-%d %H:%M:%S"),
                    format_hms(job.duration_secs)
                )),
                Err(e) => app.error(e.to_string()),
            }
        }
        Command::Play(duration) => {
            let duration = duration.unwrap_or_else(|| app.default_duration.clone());
            match controller.play_now(&duration) {
                Ok(()) => app.info(format!("Playing for {duration}")),
                Err(e) => app.error(e.to_string()),
            }
        }
        Command::Duration(text) => match parse_duration(&text) {
            Ok(secs) => {
                app.default_duration = format_hms(secs);
                app.info(format!("Default duration set to {}", app.default_duration));
            }
            Err(e) => app.error(e.to_string()),
        },
        Command::Stop => {
            controller.stop();
            app.info("Stopped");
        }
        Command::Volume(percent) => {
            controller.set_volume(percent);
            app.info(format!("Volume {}%", controller.volume()));
        }
        Command::Quit => app.should_quit = true,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use super::*;
    use crate::app::MessageKind;
    use crate::config::Settings;
    use crate::library::LoftyProbe;
    use crate::testutil::{FakeBackend, ManualClock, write_wav};

    fn controller() -> Controller {
        Controller::new(
            Box::new(FakeBackend::default()),
            Arc::new(LoftyProbe),
            Arc::new(ManualClock::with_real_pause(std::time::Duration::from_millis(5))),
            &Settings::default(),
        )
    }

    fn last_message(app: &App) -> (MessageKind, String) {
        let msg = app.message.as_ref().expect("a message");
        (msg.kind, msg.text.clone())
    }

    #[test]
    fn parses_every_command() {
        assert_eq!(
            parse_command("scan /srv/My Music"),
            Ok(Command::Scan(PathBuf::from("/srv/My Music")))
        );
        assert_eq!(
            parse_command("at 07:30:00"),
            Ok(Command::At {
                time: "07:30:00".into(),
                duration: None
            })
        );
        assert_eq!(
            parse_command("  at 7:30:0 45:00 "),
            Ok(Command::At {
                time: "7:30:0".into(),
                duration: Some("45:00".into())
            })
        );
        assert_eq!(parse_command("play"), Ok(Command::Play(None)));
        assert_eq!(parse_command("play 0:30"), Ok(Command::Play(Some("0:30".into()))));
        assert_eq!(parse_command("duration 1:00:00"), Ok(Command::Duration("1:00:00".into())));
        assert_eq!(parse_command("stop"), Ok(Command::Stop));
        assert_eq!(parse_command("vol 40"), Ok(Command::Volume(40)));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(parse_command("scan"), Err(CommandError::Usage("scan <folder>")));
        assert!(matches!(parse_command("at"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_command("at 1:00:00 5:00 extra"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_command("duration"), Err(CommandError::Usage(_))));
        assert_eq!(parse_command("vol loud"), Err(CommandError::Volume("loud".into())));
        assert_eq!(parse_command("vol -3"), Err(CommandError::Volume("-3".into())));
        assert_eq!(parse_command("dance"), Err(CommandError::Unknown("dance".into())));
    }

    #[test]
    fn errors_surface_as_messages() {
        let c = controller();
        let mut app = App::new("00:10:00", 5);

        run_line("play", &mut app, &c);
        assert_eq!(last_message(&app).0, MessageKind::Error);

        run_line("at 25:00:00", &mut app, &c);
        assert_eq!(last_message(&app).0, MessageKind::Error);

        run_line("nonsense", &mut app, &c);
        assert_eq!(
            last_message(&app),
            (MessageKind::Error, "unknown command: nonsense".to_string())
        );
    }

    #[test]
    fn scan_schedule_and_play_through_commands() {
        let c = controller();
        let mut app = App::new("00:10:00", 5);
        let dir = tempdir().unwrap();
        write_wav(&dir.path().join("one.wav"), 2_000);

        run_line(&format!("scan {}", dir.path().display()), &mut app, &c);
        assert_eq!(last_message(&app).0, MessageKind::Info);
        assert_eq!(c.tracks().len(), 1);

        run_line("at 23:59:59", &mut app, &c);
        let jobs = c.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].duration_secs, 600);

        run_line("duration 5:00", &mut app, &c);
        assert_eq!(app.default_duration, "00:05:00");

        run_line("play", &mut app, &c);
        assert!(c.status().active);
        assert_eq!(c.status().total_secs, 300);

        run_line("stop", &mut app, &c);
        assert!(!c.status().active);
    }

    #[test]
    fn volume_and_quit() {
        let c = controller();
        let mut app = App::new("00:10:00", 5);

        run_line("vol 140", &mut app, &c);
        assert_eq!(c.volume(), 100);
        assert_eq!(last_message(&app).1, "Volume 100%");

        run_line("duration 0:61", &mut app, &c);
        assert_eq!(last_message(&app).0, MessageKind::Error);
        assert_eq!(app.default_duration, "00:10:00");

        run_line("q", &mut app, &c);
        assert!(app.should_quit);
    }
}
