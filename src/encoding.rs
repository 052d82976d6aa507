//! Writes the bencode fields that sanitization replaces
//!
//! Everything a document does not touch is reproduced from its raw bytes, so
//! the encoder only needs to produce byte strings, integers and lists, plus
//! dictionary entries for the handful of keys it rewrites. Raw bytes are
//! spliced in verbatim with [`Encoder::emit_raw`].
//!
//! ```
//! # use torrent_sanitize::encoding::{Encoder, ToBencode};
//! let tiers = vec![vec!["udp://tracker.example.com:80".to_string()]];
//!
//! let mut encoder = Encoder::new();
//! encoder.emit_pair("announce-list", &tiers);
//! assert_eq!(
//!     encoder.get_output(),
//!     b"13:announce-listll28:udp://tracker.example.com:80ee"
//! );
//! assert_eq!(42u32.to_bencode(), b"i42e");
//! ```
//!
//! Writing into memory cannot fail, so none of the operations here return
//! errors; sinks are only involved once the whole output is available.

mod encoder;
mod to_bencode;

pub use self::{encoder::Encoder, to_bencode::ToBencode};
