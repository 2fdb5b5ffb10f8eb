//! Application model types: `App`, `Focus` and `InputMode`.
//!
//! The `App` struct only holds view state (focus, cursors, the command line
//! and the last message). Library, jobs and playback live in the controller.

/// Which list the cursor keys move in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tracks,
    Jobs,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing after `:`.
    Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

/// The main application model.
pub struct App {
    pub focus: Focus,
    pub selected_track: usize,
    pub selected_job: usize,

    pub input_mode: InputMode,
    pub input: String,
    pub message: Option<Message>,

    /// Budget used by `p` and by `play`/`at` without an explicit duration.
    pub default_duration: String,
    pub volume_step: u8,
    pub should_quit: bool,
}

impl App {
    pub fn new(default_duration: impl Into<String>, volume_step: u8) -> Self {
        Self {
            focus: Focus::Tracks,
            selected_track: 0,
            selected_job: 0,
            input_mode: InputMode::Normal,
            input: String::new(),
            message: None,
            default_duration: default_duration.into(),
            volume_step,
            should_quit: false,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tracks => Focus::Jobs,
            Focus::Jobs => Focus::Tracks,
        };
    }

    fn cursor(&mut self) -> &mut usize {
        match self.focus {
            Focus::Tracks => &mut self.selected_track,
            Focus::Jobs => &mut self.selected_job,
        }
    }

    /// Move the focused cursor down, wrapping around a list of `len` items.
    pub fn next(&mut self, len: usize) {
        let cursor = self.cursor();
        *cursor = if len == 0 { 0 } else { (*cursor + 1) % len };
    }

    /// Move the focused cursor up, wrapping around a list of `len` items.
    pub fn prev(&mut self, len: usize) {
        let cursor = self.cursor();
        *cursor = match len {
            0 => 0,
            _ if *cursor == 0 => len - 1,
            _ => *cursor - 1,
        };
    }

    /// Keep both cursors inside their lists after the lists changed size.
    pub fn clamp_selection(&mut self, tracks: usize, jobs: usize) {
        self.clamp_track_selection(tracks);
        self.selected_job = self.selected_job.min(jobs.saturating_sub(1));
    }

    /// Keep the track cursor inside a track list of `len` items.
    pub fn clamp_track_selection(&mut self, len: usize) {
        self.selected_track = self.selected_track.min(len.saturating_sub(1));
    }

    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.input.clear();
    }

    pub fn exit_command_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Leave command mode and hand back what was typed.
    pub fn take_input(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        std::mem::take(&mut self.input)
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            kind: MessageKind::Info,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            kind: MessageKind::Error,
            text: text.into(),
        });
    }
}
