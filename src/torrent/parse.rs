use std::{borrow::Cow, collections::BTreeMap};

use log::{debug, warn};

use crate::{
    decoding::{Decoder, DictScanner, Error, ErrorKind, ResultExt},
    sanitize::SanitizeSettings,
    torrent::{Info, Profile, Torrent},
};

const KEY_ERROR: &str = "parsing dict key in torrent failed";
const META_ERROR: &str = "parsing torrent meta entry failed";

impl<'a> Torrent<'a> {
    /// Load a document with the default [`SanitizeSettings`].
    pub fn load(source: &'a [u8], profile: Profile) -> Result<Self, Error> {
        Self::load_with(source, profile, &SanitizeSettings::new())
    }

    /// Load a document from `source`.
    ///
    /// The document must start with the `announce` entry. The strict profile
    /// walks every top level entry and runs unknown ones through the meta key
    /// classifier of `settings`, then adds the injected entries of `settings`.
    /// The other profiles seek to the entries they need and keep everything in
    /// between verbatim.
    pub fn load_with(source: &'a [u8], profile: Profile, settings: &SanitizeSettings) -> Result<Self, Error> {
        let mut decoder = Decoder::new(source);
        if !decoder.try_consume(b"d8:announce") {
            return Err(decoder.error(ErrorKind::Semantic(
                "doesn't look like a valid torrent, expected 'd8:announce'",
            )));
        }

        let mut torrent = Torrent::empty(profile);
        torrent.announce = decoder
            .read_utf8()
            .context("parsing torrent announce failed")?
            .to_owned();

        if profile.seeks() {
            torrent.seek_entries(&mut decoder, settings)?;
        } else {
            torrent.walk_entries(&mut decoder, settings)?;
        }
        Ok(torrent)
    }

    /// Remaining entries for the lighter profiles.
    fn seek_entries(&mut self, decoder: &mut Decoder<'a>, settings: &SanitizeSettings) -> Result<(), Error> {
        let mut dict = DictScanner::resume(decoder, Some(&b"announce"[..]));

        let seek = dict.seek(b"announce-list").context(KEY_ERROR)?;
        store_run(&mut self.raw_parts, seek.skipped())?;
        if seek.is_found() {
            let start = dict.decoder().offset() - b"13:announce-list".len();
            self.announce_list =
                parse_announce_list(dict.decoder()).context("parsing torrent announce-list failed")?;
            self.raw_announce_list = Some(dict.decoder().span_from(start));
        }

        if self.profile.stop_after_announce_list {
            self.tail = Some(dict.decoder().rest());
            return Ok(());
        }

        let seek = dict.seek(b"info").context(KEY_ERROR)?;
        store_run(&mut self.raw_parts, seek.skipped())?;
        if !seek.is_found() {
            return Err(dict
                .decoder()
                .error(ErrorKind::Semantic("no info key in torrent")));
        }
        self.read_info(dict.decoder(), settings)?;

        let rest = dict.finish().context(META_ERROR)?;
        store_run(&mut self.raw_parts, rest)?;
        if !decoder.is_eof() {
            return Err(decoder.error(ErrorKind::TrailingGarbage));
        }
        Ok(())
    }

    /// Remaining entries for the strict profile.
    fn walk_entries(&mut self, decoder: &mut Decoder<'a>, settings: &SanitizeSettings) -> Result<(), Error> {
        let mut dict = DictScanner::resume(decoder, Some(&b"announce"[..]));
        loop {
            if dict.decoder().is_eof() {
                return Err(dict.decoder().error(ErrorKind::Truncated));
            }
            let start = dict.decoder().offset();
            let key = match dict.next_key().context(KEY_ERROR)? {
                Some(key) => key,
                None => break,
            };

            match key {
                "announce-list" => {
                    self.announce_list =
                        parse_announce_list(dict.decoder()).context("parsing torrent announce-list failed")?;
                    self.raw_announce_list = Some(dict.decoder().span_from(start));
                },
                "info" => self.read_info(dict.decoder(), settings)?,
                "encoding" => {
                    let encoding = dict
                        .decoder()
                        .read_utf8()
                        .context("parsing torrent encoding failed")?;
                    self.encoding = Some(encoding.to_owned());
                },
                _ => {
                    if classify_meta_entry(dict.decoder(), key, settings)? {
                        let raw = dict.decoder().span_from(start);
                        self.raw_parts.insert(key.to_owned(), Cow::Borrowed(raw));
                    }
                },
            }
        }

        if self.raw_info.is_none() {
            return Err(decoder.error(ErrorKind::Semantic("no info key in torrent")));
        }

        for (key, entry) in settings.meta_entries() {
            self.raw_parts.insert(key.clone(), Cow::Owned(entry.clone()));
        }

        // the closing 'e' has to be the last byte
        if decoder.offset() + 1 != decoder.len() {
            let offset = decoder.offset() + 1;
            return Err(decoder.error_at(ErrorKind::TrailingGarbage, offset));
        }
        decoder.advance();
        Ok(())
    }

    fn read_info(&mut self, decoder: &mut Decoder<'a>, settings: &SanitizeSettings) -> Result<(), Error> {
        let start = decoder.offset();
        if self.profile.validate_info {
            let info = Info::parse(decoder, settings.check_info_utf8).context("parsing torrent info failed")?;
            self.info = Some(info);
        } else {
            decoder.skip_value().context("parsing torrent info failed")?;
        }
        self.raw_info = Some(decoder.span_from(start));
        Ok(())
    }
}

/// Keep a run of consecutive raw entries under the key of its first entry.
fn store_run<'a>(parts: &mut BTreeMap<String, Cow<'a, [u8]>>, run: &'a [u8]) -> Result<(), Error> {
    if run.is_empty() {
        return Ok(());
    }
    let key = Decoder::new(run).read_utf8()?;
    parts.insert(key.to_owned(), Cow::Borrowed(run));
    Ok(())
}

/// Consume the value of an unknown top level entry and decide whether the
/// entry is kept.
fn classify_meta_entry(decoder: &mut Decoder, key: &str, settings: &SanitizeSettings) -> Result<bool, Error> {
    let filter = &settings.meta_filter;

    if !settings.valid_meta_key(key) {
        decoder.skip_value().context(META_ERROR)?;
        debug!("Skipped entry {:?}", key);
        return Ok(false);
    }

    if filter.text.is_match(key) {
        if let Ok(text) = decoder.read_text() {
            debug!("Additional text entry {:?}: {:?}", key, text);
            return Ok(true);
        }
    }
    if filter.number.is_match(key) {
        if let Ok(number) = decoder.read_integer() {
            debug!("Additional numeric entry {:?}: {}", key, number);
            return Ok(true);
        }
    }

    decoder.skip_value().context(META_ERROR)?;
    if filter.other.is_match(key) {
        debug!("Additional raw entry {:?}", key);
        Ok(true)
    } else {
        debug!("Skipped entry {:?}", key);
        Ok(false)
    }
}

/// Read an `announce-list` value.
///
/// Besides the proper list of lists this accepts a single string, which
/// becomes a tier of its own, and strings directly in the outer list, which
/// join the last tier read so far.
fn parse_announce_list(decoder: &mut Decoder) -> Result<Vec<Vec<String>>, Error> {
    match decoder.peek() {
        None => {
            return Err(decoder.error(ErrorKind::Structure("expected announce-list, found eof")));
        },
        Some(b'0'..=b'9') => {
            let url = decoder.read_utf8()?;
            warn!("broken announce-list, found single string");
            return Ok(vec![vec![url.to_owned()]]);
        },
        Some(b'l') => decoder.advance(),
        Some(_) => {
            return Err(decoder.error(ErrorKind::Semantic(
                "expected announce-list, neither list nor string found",
            )));
        },
    }

    let mut tiers: Vec<Vec<String>> = Vec::new();
    let mut warned = false;
    loop {
        match decoder.peek() {
            None => {
                return Err(decoder.error(ErrorKind::Structure("expected announce-list lists, found eof")));
            },
            Some(b'e') => break,
            Some(b'0'..=b'9') => {
                let url = decoder.read_utf8()?;
                if !warned {
                    warn!("broken announce-list, found string in list, should be in separate list");
                    warned = true;
                }
                match tiers.last_mut() {
                    Some(tier) => tier.push(url.to_owned()),
                    None => tiers.push(vec![url.to_owned()]),
                }
            },
            Some(b'l') => tiers.push(parse_tier(decoder)?),
            Some(_) => {
                return Err(decoder.error(ErrorKind::Semantic(
                    "expected announce-list list, neither list nor string found",
                )));
            },
        }
    }
    decoder.advance();
    Ok(tiers)
}

fn parse_tier(decoder: &mut Decoder) -> Result<Vec<String>, Error> {
    decoder.advance();
    let mut tier = Vec::new();
    loop {
        match decoder.peek() {
            None => {
                return Err(decoder.error(ErrorKind::Structure("expected announce-list list, found eof")));
            },
            Some(b'e') => break,
            Some(_) => {
                let url = decoder.read_utf8().context("expected announce-list list entry")?;
                tier.push(url.to_owned());
            },
        }
    }
    decoder.advance();
    Ok(tier)
}
