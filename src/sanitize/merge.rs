use std::collections::HashMap;

use crate::{
    sanitize::{AnnounceUrl, UrlFilter},
    torrent::Torrent,
};

/// Collects announce URLs from several sources into tiers.
///
/// URLs are grouped by [`AnnounceUrl::domain`]: the first URL of a domain
/// opens a new tier, later URLs of the same domain join it unless they are
/// already in it. Tiers keep the order in which their domains first showed
/// up, URLs within a tier keep insertion order.
#[derive(Debug, Clone)]
pub struct AnnounceList<'f> {
    filter: &'f UrlFilter,
    groups: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl<'f> AnnounceList<'f> {
    pub fn new(filter: &'f UrlFilter) -> Self {
        AnnounceList {
            filter,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, url: AnnounceUrl) {
        match self.index.get(&url.domain) {
            Some(&group) => {
                let group = &mut self.groups[group];
                if !group.contains(&url.url) {
                    group.push(url.url);
                }
            },
            None => {
                self.index.insert(url.domain, self.groups.len());
                self.groups.push(vec![url.url]);
            },
        }
    }

    /// Add the URLs the filter makes of `url`.
    pub fn merge(&mut self, url: &str) {
        for url in self.filter.filter(url) {
            self.add(url);
        }
    }

    pub fn merge_all<I>(&mut self, urls: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for url in urls {
            self.merge(url.as_ref());
        }
    }

    /// Add `url` if it is valid, bypassing the filter rules.
    pub fn force_merge(&mut self, url: &str) {
        if let Some(url) = AnnounceUrl::normalize(url) {
            self.add(url);
        }
    }

    pub fn force_merge_all<I>(&mut self, urls: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for url in urls {
            self.force_merge(url.as_ref());
        }
    }

    /// Add the announce URL and then the announce list of `torrent`.
    pub fn merge_torrent(&mut self, torrent: &Torrent<'_>) {
        self.merge(torrent.announce());
        for tier in torrent.announce_list() {
            self.merge_all(tier);
        }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The announce URL and announce list to store in a document. Without any
    /// URLs the announce URL becomes a DHT marker for `info_hash` and the list
    /// is empty.
    pub fn finish(self, info_hash: &str) -> (String, Vec<Vec<String>>) {
        match self.groups.first().and_then(|group| group.first()) {
            Some(first) => (first.clone(), self.groups),
            None => (format!("dht://{}", info_hash.to_ascii_uppercase()), Vec::new()),
        }
    }
}
