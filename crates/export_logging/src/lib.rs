#![deny(missing_docs)]
//! Shared logging utilities for the exporter workspace.
//!
//! This crate provides the `export_*` logging macros used across the codebase,
//! the run-time logger initializer (terminal plus optional log file) and a
//! minimal test initializer for the global logger.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! export_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! export_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! export_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! export_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! export_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Where and how loudly the run logs.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Level for the terminal logger. `Off` disables it entirely.
    pub terminal_level: LevelFilter,
    /// Optional log file, truncated on startup. Always receives `Info` and above.
    pub log_file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            terminal_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

/// Initialize the global logger.
///
/// Fails only if the log file cannot be created. An already-installed logger is
/// left in place.
pub fn initialize(options: &LogOptions) -> io::Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if options.terminal_level != LevelFilter::Off {
        loggers.push(TermLogger::new(
            options.terminal_level,
            terminal_config(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if let Some(path) = options.log_file.as_deref() {
        loggers.push(create_file_logger(path)?);
    }

    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// Flush every installed logger. Called before the process exits on a fatal error.
pub fn flush() {
    log::logger().flush();
}

fn terminal_config() -> Config {
    ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build()
}

fn file_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(path: &Path) -> io::Result<Box<WriteLogger<File>>> {
    let file = File::create(path)?;
    Ok(WriteLogger::new(LevelFilter::Info, file_config(), file))
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
