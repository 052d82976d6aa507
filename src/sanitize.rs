//! Announce URL sanitization and the settings that drive it
//!
//! URLs pass through three stages before they end up in a rewritten torrent:
//!
//! 1. [`AnnounceUrl::normalize`] canonicalizes a URL and rejects anything
//!    that does not look like a tracker address.
//! 2. [`UrlFilter::filter`] applies the whitelist, the blacklist and the
//!    rewrite rules of a filter configuration.
//! 3. [`AnnounceList`] collects the surviving URLs from all sources into tiers
//!    grouped by domain.
//!
//! ```
//! # use torrent_sanitize::sanitize::{AnnounceList, UrlFilter};
//! let filter = UrlFilter::parse(
//!     "-- bad.example\n\
//!      http://old\\.example/(.*) http://new.example/\\1\n",
//! )?;
//!
//! let mut list = AnnounceList::new(&filter);
//! list.merge("http://old.example/announce");
//! list.merge("udp://tracker.bad.example:6969");
//! list.merge("udp://tracker.new.example/announce");
//!
//! assert_eq!(
//!     list.groups(),
//!     [vec![
//!         "http://new.example/announce".to_string(),
//!         "udp://tracker.new.example:80".to_string(),
//!     ]]
//! );
//! # Ok::<(), torrent_sanitize::sanitize::ConfigError>(())
//! ```
//!
//! Invalid URLs are never an error: they are dropped and processing continues
//! with the remaining ones. Errors are only reported for broken configuration.

mod error;
mod filter;
mod merge;
mod pattern;
mod settings;
mod url;

pub use self::{
    error::ConfigError,
    filter::{RewriteRule, UrlFilter},
    merge::AnnounceList,
    pattern::{Matcher, Pattern},
    settings::{MetaKeyFilter, RESERVED_KEYS, SanitizeSettings},
    url::AnnounceUrl,
};
