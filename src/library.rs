//! Track library: folder scanning, duration probing and the ordered list of
//! tracks the playback session walks through.

mod display;
mod model;
mod probe;
mod scan;

pub use model::{Library, SharedLibrary, Track};
pub use probe::{DurationProbe, LoftyProbe, SUPPORTED_EXTENSIONS, is_supported};
pub use scan::scan;
