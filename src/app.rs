//! Application module: exposes the view model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds focus, cursors, the
//! command line and the status message.

mod model;

pub use model::*;
