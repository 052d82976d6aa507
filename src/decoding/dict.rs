use crate::decoding::{Decoder, Error, ErrorKind, ResultExt};

/// Outcome of [`DictScanner::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seek<'a> {
    /// The key exists. The decoder is positioned at its value; `skipped` holds
    /// the entries before the key, excluding the key itself.
    Found { skipped: &'a [u8] },
    /// The key does not exist. The decoder is positioned at the first larger
    /// key or at the closing `e`, which are not consumed.
    NotFound { skipped: &'a [u8] },
}

impl<'a> Seek<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Seek::Found { .. })
    }

    /// The raw entries stepped over while looking for the key.
    pub fn skipped(&self) -> &'a [u8] {
        match *self {
            Seek::Found { skipped } | Seek::NotFound { skipped } => skipped,
        }
    }
}

/// Walks the entries of a dictionary in a single forward pass.
///
/// Keys must be UTF-8 and strictly increasing byte-wise; any violation is
/// reported as [`ErrorKind::UnsortedKeys`] at the offset of the offending key.
/// Because of the ordering the scanner can tell that a key is absent as soon
/// as it sees a larger one, without reading the rest of the dictionary.
#[derive(Debug)]
pub struct DictScanner<'d, 'a> {
    decoder: &'d mut Decoder<'a>,
    last_key: Option<&'a [u8]>,
}

impl<'d, 'a> DictScanner<'d, 'a> {
    /// Continue scanning a dictionary whose opening `d` (and possibly some
    /// entries, the last having key `last_key`) were already consumed.
    pub fn resume(decoder: &'d mut Decoder<'a>, last_key: Option<&'a [u8]>) -> Self {
        DictScanner { decoder, last_key }
    }

    /// Consume the opening `d` of a dictionary and start scanning it.
    pub fn open(decoder: &'d mut Decoder<'a>) -> Result<Self, Error> {
        match decoder.peek() {
            None => Err(decoder.error(ErrorKind::Structure("expected dict, found eof"))),
            Some(b'd') => {
                decoder.advance();
                Ok(Self::resume(decoder, None))
            },
            Some(_) => Err(decoder.error(ErrorKind::Structure("expected 'd' for dict"))),
        }
    }

    /// The underlying decoder, used to read the value of a key.
    pub fn decoder(&mut self) -> &mut Decoder<'a> {
        self.decoder
    }

    pub fn last_key(&self) -> Option<&'a [u8]> {
        self.last_key
    }

    /// Read the next key without recording it. Returns its offset and bytes,
    /// or `None` when the closing `e` (left unconsumed) is reached.
    fn peek_key(&mut self) -> Result<Option<(usize, &'a str)>, Error> {
        match self.decoder.peek() {
            None => {
                return Err(self
                    .decoder
                    .error(ErrorKind::Structure("expected dict entry or 'e', found eof")));
            },
            Some(b'e') => return Ok(None),
            Some(_) => {},
        }

        let start = self.decoder.offset();
        let key = self.decoder.read_utf8().context("parsing dict key failed")?;
        if let Some(prev) = self.last_key {
            if key.as_bytes() <= prev {
                return Err(self.decoder.error_at(ErrorKind::UnsortedKeys, start));
            }
        }
        Ok(Some((start, key)))
    }

    fn skip_entry_value(&mut self) -> Result<(), Error> {
        self.decoder.skip_value().context("parsing dict value failed")
    }

    /// Read the next key. The caller is responsible for consuming its value
    /// before calling into the scanner again. Returns `None` at the closing `e`,
    /// which is not consumed.
    pub fn next_key(&mut self) -> Result<Option<&'a str>, Error> {
        let key = self.peek_key()?.map(|(_, key)| key);
        if let Some(key) = key {
            self.last_key = Some(key.as_bytes());
        }
        Ok(key)
    }

    /// Skip entries until `search` is found or proven absent.
    pub fn seek(&mut self, search: &[u8]) -> Result<Seek<'a>, Error> {
        let start = self.decoder.offset();
        loop {
            let (key_start, key) = match self.peek_key()? {
                Some(entry) => entry,
                None => {
                    return Ok(Seek::NotFound {
                        skipped: self.decoder.span_from(start),
                    });
                },
            };

            let key = key.as_bytes();
            if key == search {
                self.last_key = Some(key);
                let skipped = &self.decoder.source()[start..key_start];
                return Ok(Seek::Found { skipped });
            }
            if key > search {
                self.decoder.rewind(key_start);
                return Ok(Seek::NotFound {
                    skipped: self.decoder.span_from(start),
                });
            }

            self.last_key = Some(key);
            self.skip_entry_value()?;
        }
    }

    /// Skip the remaining entries and the closing `e`. Returns the raw
    /// entries, without the closing `e`.
    pub fn finish(mut self) -> Result<&'a [u8], Error> {
        let start = self.decoder.offset();
        while self.next_key()?.is_some() {
            self.skip_entry_value()?;
        }
        let skipped = self.decoder.span_from(start);
        self.decoder.advance();
        Ok(skipped)
    }
}
