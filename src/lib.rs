//! Parses, validates, sanitizes and re-serializes BitTorrent metadata files.
//!
//! Torrent files from untrusted sources are decoded with a strict bencode
//! cursor that rejects every non-canonical encoding and enforces dictionary
//! key order. Only the fields the sanitizer works on are decoded; all other
//! entries are kept as the exact bytes they were read from, so a document that
//! is written back unmodified is identical to its input.
//!
//! The announce URLs of a document can be rebuilt through a pipeline of
//! [URL normalization](sanitize::AnnounceUrl), a configurable
//! [whitelist/blacklist/rewrite filter](sanitize::UrlFilter) and a
//! [domain grouping merge](sanitize::AnnounceList).
//!
//! ```
//! use torrent_sanitize::{Profile, SanitizeSettings, Torrent, UrlFilter};
//!
//! let data = b"d8:announce34:UDP://Tracker.Example.com/announce\
//!              4:infod6:lengthi1e4:name1:x12:piece lengthi1e6:pieces0:ee";
//!
//! let mut settings = SanitizeSettings::new();
//! settings.url_filter = UrlFilter::parse("+ http://backup.example.org/announce")?;
//!
//! let mut torrent = Torrent::load_with(data, Profile::STRICT, &settings)?;
//! torrent.sanitize_announce_urls(&settings, None);
//!
//! assert_eq!(torrent.announce(), "http://backup.example.org/announce");
//! assert_eq!(torrent.announce_list()[1], ["udp://tracker.example.com:80"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod buffer;
pub mod decoding;
pub mod encoding;
pub mod fs;
pub mod sanitize;
pub mod torrent;
pub mod utf8;

pub use crate::{
    buffer::Buffer,
    sanitize::{SanitizeSettings, UrlFilter},
    torrent::{Profile, Torrent},
};
