//! Logger setup built on `fern`.
//!
//! Every level goes to stderr so that stdout only carries the report. The level comes from the
//! `SOLAR_VIABILITY_LOG_LEVEL` environment variable, then the `--log-level` flag, then `warn`.
use anyhow::{Result, bail};
use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::env;
use std::io::IsTerminal;
use std::sync::OnceLock;

/// Set once the global logger is installed.
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "SOLAR_VIABILITY_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Whether [`init`] has already installed the logger.
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parses a level name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
///
/// # Errors
///
/// Fails on any other name.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    Ok(match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    })
}

/// Installs the global logger.
///
/// Calling it again once a logger is installed does nothing.
///
/// # Errors
///
/// Fails on an unknown level name or when another logger was installed elsewhere.
pub fn init(level_from_cli: Option<&str>) -> Result<()> {
    if is_logger_initialised() {
        return Ok(());
    }

    let level = env::var(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| level_from_cli.unwrap_or(DEFAULT_LOG_LEVEL).to_string());
    let level = parse_level(&level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let use_colour = std::io::stderr().is_terminal();

    Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = Local::now().format("%H:%M:%S");
            if use_colour {
                out.finish(format_args!(
                    "[{timestamp} {} {}] {message}",
                    colours.color(record.level()),
                    record.target()
                ));
            } else {
                out.finish(format_args!(
                    "[{timestamp} {} {}] {message}",
                    record.level(),
                    record.target()
                ));
            }
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    // Only this function installs the logger, so a second `set` can only race a concurrent init.
    let _ = LOGGER_INIT.set(());
    Ok(())
}
