use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render the demo scene to a PNG.
#[derive(Debug, Parser)]
#[command(name = "whit")]
#[command(about = "Whitted-style ray tracer")]
pub struct Args {
    /// JSON render settings; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "whit.png")]
    pub output: PathBuf,

    /// Override the viewport width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the viewport height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Override the number of passes to trace
    #[arg(long, short = 'f')]
    pub frames: Option<u32>,

    /// Average all passes instead of keeping only the last
    #[arg(long)]
    pub accumulate: bool,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}
