use std::collections::BTreeMap;

use crate::{
    decoding::{Decoder, Error, ErrorKind},
    encoding::Encoder,
    sanitize::{ConfigError, Matcher, UrlFilter},
};

/// Top level keys a document interprets itself; they cannot be injected.
pub const RESERVED_KEYS: [&str; 4] = ["announce", "announce-list", "encoding", "info"];

/// Decides which unknown top level entries of a document are kept.
///
/// An entry is kept as text if its key matches `text` and its value is a
/// UTF-8 text string, as a number if its key matches `number` and its value is
/// an integer, and as is if its key matches `other`. By default text and
/// numbers are kept for every key and nothing else is.
#[derive(Debug, Clone)]
pub struct MetaKeyFilter {
    pub text: Matcher,
    pub number: Matcher,
    pub other: Matcher,
}

impl Default for MetaKeyFilter {
    fn default() -> Self {
        MetaKeyFilter {
            text: Matcher::Everything,
            number: Matcher::Everything,
            other: Matcher::Nothing,
        }
    }
}

/// Everything that controls how documents are sanitized.
///
/// Built once before processing and shared by reference afterwards.
#[derive(Debug, Clone, Default)]
pub struct SanitizeSettings {
    /// Require `info` names and file paths to be valid UTF-8.
    pub check_info_utf8: bool,
    pub meta_filter: MetaKeyFilter,
    pub url_filter: UrlFilter,
    meta_entries: BTreeMap<String, Vec<u8>>,
}

impl SanitizeSettings {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Add a top level string entry to every sanitized document. The first
    /// entry added for a key wins.
    pub fn add_meta_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut encoder = Encoder::new();
        encoder.emit_str(value);
        self.add_meta_entry(key, &encoder.get_output())
    }

    /// Add a top level entry with an already bencoded value to every
    /// sanitized document. The first entry added for a key wins.
    pub fn add_meta_raw(&mut self, key: &str, value: &[u8]) -> Result<(), ConfigError> {
        let mut decoder = Decoder::new(value);
        let checked = decoder.skip_value().and_then(|()| {
            if decoder.is_eof() {
                Ok(())
            } else {
                Err(Error::at(ErrorKind::TrailingGarbage, value, decoder.offset()))
            }
        });
        checked.map_err(|source| ConfigError::InvalidRawMeta {
            key: key.to_owned(),
            source,
        })?;

        self.add_meta_entry(key, value)
    }

    fn add_meta_entry(&mut self, key: &str, value: &[u8]) -> Result<(), ConfigError> {
        if RESERVED_KEYS.contains(&key) {
            return Err(ConfigError::ReservedMetaKey(key.to_owned()));
        }
        // documents start with "announce", nothing may be placed before it
        if !valid_key_syntax(key) || key < "announce" {
            return Err(ConfigError::InvalidMetaKey(key.to_owned()));
        }

        let mut encoder = Encoder::new();
        encoder.emit_str(key);
        encoder.emit_raw(value);
        self.meta_entries
            .entry(key.to_owned())
            .or_insert_with(|| encoder.get_output());
        Ok(())
    }

    /// Injected entries, keyed by their key, with the encoded key and value as
    /// value.
    pub fn meta_entries(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.meta_entries
    }

    /// Whether an unknown top level key of a document may be kept at all.
    /// Keys of injected entries are not, the injected entry replaces them.
    pub fn valid_meta_key(&self, key: &str) -> bool {
        valid_key_syntax(key) && !self.meta_entries.contains_key(key)
    }
}

fn valid_key_syntax(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|c| c.is_ascii() && !c.is_ascii_control())
}
