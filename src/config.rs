//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::state::SurfaceKind;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "meeting-timer")]
#[command(about = "A floating meeting timer with drift-free elapsed time and persisted state")]
#[command(version)]
pub struct Config {
    /// Port to bind the control surface to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file the timer snapshot is persisted to
    #[arg(short, long, default_value = "meeting-timer-state.json")]
    pub state_file: PathBuf,

    /// Host surface the widget sizes itself for
    #[arg(long, value_enum, default_value_t = SurfaceKind::Popup)]
    pub surface: SurfaceKind,

    /// Keep state in memory only
    #[arg(long)]
    pub memory_store: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
