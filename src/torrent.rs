//! Torrent documents.
//!
//! A [`Torrent`] borrows the buffer it was loaded from. Only the fields the
//! sanitizer works on are decoded; everything else is kept as the exact bytes
//! it was read from, so that writing an unmodified document reproduces the
//! input byte for byte.
//!
//! ```
//! use torrent_sanitize::torrent::{Profile, Torrent};
//!
//! let data = b"d8:announce22:udp://example.com:6969\
//!              7:comment5:hello\
//!              4:infod6:lengthi1e4:name1:x12:piece lengthi1e6:pieces0:ee";
//!
//! let torrent = Torrent::load(data, Profile::STRICT)?;
//! assert_eq!(torrent.announce(), "udp://example.com:6969");
//! assert_eq!(torrent.info().and_then(|info| info.name.as_deref()), Some("x"));
//! assert_eq!(torrent.to_bytes(), data);
//! # Ok::<(), torrent_sanitize::decoding::Error>(())
//! ```

mod details;
mod info;
mod parse;
mod profile;
mod write;

use std::{borrow::Cow, cell::OnceCell, collections::BTreeMap};

use sha1::{Digest, Sha1};

pub use self::{
    details::{Details, UrlListing},
    info::{File, Info},
    profile::Profile,
};
use crate::sanitize::{AnnounceList, SanitizeSettings};

/// A loaded torrent document.
#[derive(Debug, Clone)]
pub struct Torrent<'a> {
    profile: Profile,
    announce: String,
    announce_list: Vec<Vec<String>>,
    encoding: Option<String>,
    info: Option<Info>,
    /// The `announce-list` entry as read, until the URLs are replaced.
    raw_announce_list: Option<&'a [u8]>,
    raw_info: Option<&'a [u8]>,
    /// Other top level entries including their keys. An entry may hold a run
    /// of several consecutive entries; it is stored under the first key.
    raw_parts: BTreeMap<String, Cow<'a, [u8]>>,
    /// Unread input after `announce-list`, closing `e` included.
    tail: Option<&'a [u8]>,
    info_hash: OnceCell<String>,
}

impl<'a> Torrent<'a> {
    fn empty(profile: Profile) -> Self {
        Torrent {
            profile,
            announce: String::new(),
            announce_list: Vec::new(),
            encoding: None,
            info: None,
            raw_announce_list: None,
            raw_info: None,
            raw_parts: BTreeMap::new(),
            tail: None,
            info_hash: OnceCell::new(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn announce(&self) -> &str {
        &self.announce
    }

    pub fn announce_list(&self) -> &[Vec<String>] {
        &self.announce_list
    }

    /// The `encoding` entry. Only decoded by the strict profile.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// The summary of the `info` dictionary, if it was validated.
    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    /// The exact bytes of the `info` dictionary.
    pub fn raw_info(&self) -> Option<&'a [u8]> {
        self.raw_info
    }

    /// Preserved top level entries, keyed by (first) key.
    pub fn raw_parts(&self) -> &BTreeMap<String, Cow<'a, [u8]>> {
        &self.raw_parts
    }

    /// The SHA-1 of the raw `info` dictionary as 40 uppercase hex digits.
    /// Empty if the document was loaded without its `info` dictionary.
    pub fn info_hash(&self) -> &str {
        self.info_hash.get_or_init(|| match self.raw_info {
            Some(raw) => hex::encode_upper(Sha1::digest(raw)),
            None => String::new(),
        })
    }

    /// Replace the announce URL and the announce list. An empty list is
    /// omitted when the document is written.
    pub fn set_announce_urls(&mut self, announce: String, announce_list: Vec<Vec<String>>) {
        self.announce = announce;
        self.announce_list = announce_list;
        self.raw_announce_list = None;
    }

    /// Take the announce URLs from a finished merge, falling back to a DHT
    /// marker for this document if the merge is empty.
    pub fn replace_announce_urls(&mut self, list: AnnounceList<'_>) {
        let (announce, announce_list) = list.finish(self.info_hash());
        self.set_announce_urls(announce, announce_list);
    }

    /// Rebuild the announce URLs: the forced URLs of the filter first, then
    /// the filtered URLs of this document and then those of `other`.
    pub fn sanitize_announce_urls(&mut self, settings: &SanitizeSettings, other: Option<&Torrent<'_>>) {
        let mut list = AnnounceList::new(&settings.url_filter);
        list.force_merge_all(settings.url_filter.forced_urls());
        list.merge_torrent(self);
        if let Some(other) = other {
            list.merge_torrent(other);
        }
        self.replace_announce_urls(list);
    }

    /// Human readable summary, see [`Details`].
    pub fn details(&self, show_paths: bool) -> Details<'_, 'a> {
        Details::new(self, show_paths)
    }

    /// The announce URL and the announce list, one URL per line.
    pub fn url_listing(&self) -> UrlListing<'_, 'a> {
        UrlListing::new(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sanitize::UrlFilter;

    pub(crate) const INFO: &str =
        "d6:lengthi1000e4:name8:file.bin12:piece lengthi16384e6:pieces20:AAAAAAAAAAAAAAAAAAAAe";
    pub(crate) const INFO_HASH: &str = "0940BBE3670D9EAECCD85012F3DAEE7968B81130";

    fn document(announce_list: &str, extra: &str) -> Vec<u8> {
        format!(
            "d8:announce30:http://tracker.example.com/ann{}{}4:info{}e",
            announce_list, extra, INFO
        )
        .into_bytes()
    }

    #[test]
    fn info_hash_is_uppercase_sha1_of_raw_info() {
        let data = document("", "");
        for profile in [Profile::STRICT, Profile::ANNOUNCE_INFO] {
            let torrent = Torrent::load(&data, profile).unwrap();
            assert_eq!(torrent.raw_info(), Some(INFO.as_bytes()));
            assert_eq!(torrent.info_hash(), INFO_HASH);
        }

        let torrent = Torrent::load(&data, Profile::ANNOUNCE_ONLY).unwrap();
        assert_eq!(torrent.info_hash(), "");
    }

    #[test]
    fn sanitize_merges_forced_then_own_then_other() {
        let mut settings = SanitizeSettings::new();
        settings.url_filter = UrlFilter::parse("+udp://forced.example.net:1").unwrap();

        let data = document("13:announce-listll30:http://tracker.example.com/ann20:udp://other.org:6969ee", "");
        let other_data = b"d8:announce21:udp://extra.info:4242e";
        let other = Torrent::load(other_data, Profile::ANNOUNCE_ONLY).unwrap();

        let mut torrent = Torrent::load(&data, Profile::STRICT).unwrap();
        torrent.sanitize_announce_urls(&settings, Some(&other));

        assert_eq!(torrent.announce(), "udp://forced.example.net:1");
        assert_eq!(
            torrent.announce_list(),
            [
                vec!["udp://forced.example.net:1".to_owned()],
                vec!["http://tracker.example.com/ann".to_owned()],
                vec!["udp://other.org:6969".to_owned()],
                vec!["udp://extra.info:4242".to_owned()],
            ]
        );
    }

    #[test]
    fn sanitize_without_urls_falls_back_to_dht() {
        let mut settings = SanitizeSettings::new();
        settings.url_filter = UrlFilter::parse("-- example\\.com").unwrap();
        let data = document("", "");
        let mut torrent = Torrent::load(&data, Profile::STRICT).unwrap();
        torrent.sanitize_announce_urls(&settings, None);

        assert_eq!(torrent.announce(), format!("dht://{}", INFO_HASH));
        assert!(torrent.announce_list().is_empty());
        assert_eq!(
            torrent.to_bytes(),
            format!("d8:announce46:dht://{}4:info{}e", INFO_HASH, INFO).into_bytes()
        );
    }

    #[test]
    fn replacing_urls_drops_the_raw_announce_list() {
        let data = document("13:announce-listll30:http://tracker.example.com/annee", "");
        let mut torrent = Torrent::load(&data, Profile::ANNOUNCE_INFO).unwrap();
        assert_eq!(torrent.to_bytes(), data);

        torrent.set_announce_urls("udp://a.org:1".to_owned(), vec![vec!["udp://a.org:1".to_owned()]]);
        assert_eq!(
            torrent.to_bytes(),
            format!("d8:announce13:udp://a.org:113:announce-listll13:udp://a.org:1ee4:info{}e", INFO).into_bytes()
        );
    }
}
