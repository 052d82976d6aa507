use std::fmt::{self, Display, Formatter};

use crate::torrent::Torrent;

/// Summary of a document for display.
///
/// ```text
/// Announce-url: udp://tracker.example.com:80
/// Announce-list:
///  - [ udp://tracker.example.com:80, http://mirror.example.com/ ]
/// Info name: example
/// Info files: 2
/// Info complete length: 1234 bytes
/// Info pieces length: 16384 bytes
/// Info-Hash: 0123456789ABCDEF0123456789ABCDEF01234567
/// ```
///
/// The info lines need a validated `info` dictionary, the hash its raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct Details<'t, 'a> {
    torrent: &'t Torrent<'a>,
    show_paths: bool,
}

impl<'t, 'a> Details<'t, 'a> {
    pub(crate) fn new(torrent: &'t Torrent<'a>, show_paths: bool) -> Self {
        Details { torrent, show_paths }
    }
}

impl Display for Details<'_, '_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let torrent = self.torrent;

        writeln!(f, "Announce-url: {}", torrent.announce())?;
        writeln!(f, "Announce-list:")?;
        for tier in torrent.announce_list() {
            writeln!(f, " - [ {} ]", tier.join(", "))?;
        }
        if let Some(encoding) = torrent.encoding() {
            writeln!(f, "Encoding: {}", encoding)?;
        }

        if let Some(info) = torrent.info() {
            writeln!(f, "Info name: {}", info.name.as_deref().unwrap_or_default())?;
            writeln!(f, "Info files: {}", info.files.len())?;
            if self.show_paths {
                for file in &info.files {
                    writeln!(f, " - {} bytes: '{}'", file.length, file.path)?;
                }
            }
            writeln!(f, "Info complete length: {} bytes", info.total_length)?;
            writeln!(f, "Info pieces length: {} bytes", info.piece_length)?;
        }
        if torrent.raw_info().is_some() {
            writeln!(f, "Info-Hash: {}", torrent.info_hash())?;
        }
        Ok(())
    }
}

/// The announce URL followed by the URLs of every tier, one per line.
#[derive(Debug, Clone, Copy)]
pub struct UrlListing<'t, 'a> {
    torrent: &'t Torrent<'a>,
}

impl<'t, 'a> UrlListing<'t, 'a> {
    pub(crate) fn new(torrent: &'t Torrent<'a>) -> Self {
        UrlListing { torrent }
    }
}

impl Display for UrlListing<'_, '_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "{}", self.torrent.announce())?;
        for url in self.torrent.announce_list().iter().flatten() {
            writeln!(f, "{}", url)?;
        }
        Ok(())
    }
}
