use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Number of bytes shown after the error offset in the rendered message.
const SNIPPET_LEN: usize = 16;

/// An error produced while decoding a torrent document.
///
/// Besides the [`ErrorKind`] it records where in the buffer the problem was
/// found and a chain of operation names, appended with [`Error::context`] as
/// the error travels outwards through the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
    len: usize,
    snippet: String,
    context: Vec<&'static str>,
}

/// An enumeration of potential errors that appear during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Grammar violation: bad length prefix, bad integer, unterminated container, ...
    #[error("{0}")]
    Structure(&'static str),
    /// Lists and dicts nested deeper than the configured limit.
    #[error("maximum nesting depth exceeded")]
    NestingTooDeep,
    /// The top level dictionary ended before its closing delimiter.
    #[error("unexpected end of file while parsing torrent")]
    Truncated,
    /// Bytes follow the closing delimiter of the top level dictionary.
    #[error("file contains garbage after torrent")]
    TrailingGarbage,
    /// Dictionary keys are not strictly increasing.
    #[error("(previous) dict entries in wrong order")]
    UnsortedKeys,
    /// A checked string is not valid UTF-8.
    #[error("string not valid utf-8")]
    InvalidUtf8,
    /// Missing or ill-typed required field, or a field with an invalid value.
    #[error("{0}")]
    Semantic(&'static str),
}

impl Error {
    pub(crate) fn at(kind: ErrorKind, source: &[u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        let end = source.len().min(offset + SNIPPET_LEN);
        Error {
            kind,
            offset,
            len: source.len(),
            snippet: String::from_utf8_lossy(&source[offset..end]).into_owned(),
            context: Vec::new(),
        }
    }

    /// Wrap the error with the name of the operation that failed because of it.
    pub fn context(mut self, context: &'static str) -> Self {
        self.context.push(context);
        self
    }

    /// The root cause of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the input at which the root cause was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Operation names the error passed through, outermost first.
    pub fn context_chain(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.context.iter().rev().copied()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for context in self.context_chain() {
            write!(f, "Error: {}\n    in ", context)?;
        }
        write!(
            f,
            "Error @[{}/{} '{}'...]: {}",
            self.offset, self.len, self.snippet, self.kind
        )
    }
}

impl std::error::Error for Error {}

pub trait ResultExt {
    fn context(self, context: &'static str) -> Self;
}

impl<T> ResultExt for Result<T, Error> {
    fn context(self, context: &'static str) -> Result<T, Error> {
        self.map_err(|err| err.context(context))
    }
}
