//! Decodes the bencode grammar underlying torrent files
//!
//! The decoding layer is zero-copy: every value it hands out borrows from the
//! input buffer, and every entry it skips can be recovered as the exact raw
//! bytes it occupied.
//!
//! # Basic decoding
//!
//! ```
//! # use torrent_sanitize::decoding::Decoder;
//! let mut decoder = Decoder::new(b"i42e5:hello");
//! assert_eq!(decoder.read_integer().unwrap(), 42);
//! assert_eq!(decoder.read_bytes().unwrap(), b"hello");
//! ```
//!
//! # Dictionaries
//!
//! Dictionaries are walked with a [`DictScanner`], which enforces strictly
//! increasing keys and can look up a key in a single forward pass:
//!
//! ```
//! # use torrent_sanitize::decoding::{Decoder, DictScanner};
//! let mut decoder = Decoder::new(b"d1:ai1e1:bi2ee");
//! let mut dict = DictScanner::open(&mut decoder).unwrap();
//! assert!(dict.seek(b"b").unwrap().is_found());
//! assert_eq!(dict.decoder().read_integer().unwrap(), 2);
//! dict.finish().unwrap();
//! ```
//!
//! # Error handling
//!
//! Decoding functions never panic on malformed input. Errors carry the byte
//! offset at which the problem was found and can be wrapped with the name of
//! the failing operation through [`ResultExt::context`].

mod decoder;
mod dict;
mod error;

pub use self::{
    decoder::{DEFAULT_MAX_DEPTH, Decoder},
    dict::{DictScanner, Seek},
    error::{Error, ErrorKind, ResultExt},
};
