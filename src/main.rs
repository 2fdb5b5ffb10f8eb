mod app;
mod audio;
mod config;
mod control;
mod library;
mod runtime;
mod schedule;
mod session;
mod sync;
mod ui;

#[cfg(test)]
mod testutil;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
