use std::{io, path::PathBuf};

use thiserror::Error;

use crate::decoding;

/// An error in the sanitization settings, reported before any document is
/// processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't parse regex pattern '{pattern}'")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rewrite pattern '{0}' has no replacement")]
    MissingRewrite(String),

    #[error("meta key '{0}' is reserved")]
    ReservedMetaKey(String),

    #[error("invalid meta key '{0}'")]
    InvalidMetaKey(String),

    #[error("raw value for meta key '{key}' is not a single bencode value")]
    InvalidRawMeta {
        key: String,
        #[source]
        source: decoding::Error,
    },

    #[error("line {line}")]
    Line {
        line: usize,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("couldn't read url filter '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn at_line(self, line: usize) -> Self {
        ConfigError::Line {
            line,
            source: Box::new(self),
        }
    }
}
