//! Helpers shared by the command line tools.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use torrent_sanitize::{Buffer, UrlFilter};

/// Log to stderr: warnings by default, everything down to debug messages
/// with `debug`.
pub fn setup_logging(debug: bool) -> Result<()> {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Warn };

    let colors = ColoredLevelConfig::new()
        .trace(Color::Cyan)
        .debug(Color::Magenta)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:width$}] {}",
                colors.color(record.level()),
                message,
                width = 5
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("Failed to initialize logging")
}

/// Read a torrent file.
pub fn load_buffer(path: &Path) -> Result<Buffer> {
    Buffer::load(path).with_context(|| format!("{}: couldn't read file", path.display()))
}

pub fn load_url_filter(path: &Path) -> Result<UrlFilter> {
    UrlFilter::load(path).with_context(|| format!("{}: invalid url filter", path.display()))
}

/// Split a `key=value` argument at the first `=`.
pub fn parse_key_value(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Couldn't parse key-value argument: '{}'", arg))?;
    Ok((key.to_owned(), value.to_owned()))
}
