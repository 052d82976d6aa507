use std::{
    io::{self, Write},
    ops::Bound::{self, Excluded, Unbounded},
};

use crate::{encoding::Encoder, torrent::Torrent};

impl Torrent<'_> {
    /// Encode the document.
    ///
    /// The announce fields are encoded from their current values, except for
    /// an `announce-list` that is still as read, which is copied. All other
    /// entries are copied from the input in key order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.emit_raw(b"d");
        encoder.emit_pair("announce", &self.announce);

        self.emit_raw_parts(&mut encoder, Excluded("announce"), Excluded("announce-list"));
        match self.raw_announce_list {
            Some(raw) => encoder.emit_raw(raw),
            None if !self.announce_list.is_empty() => encoder.emit_pair("announce-list", &self.announce_list),
            None => {},
        }

        if let Some(tail) = self.tail {
            encoder.emit_raw(tail);
            return encoder.get_output();
        }

        self.emit_raw_parts(&mut encoder, Excluded("announce-list"), Excluded("encoding"));
        if let Some(encoding) = &self.encoding {
            encoder.emit_pair("encoding", encoding);
        }
        self.emit_raw_parts(&mut encoder, Excluded("encoding"), Excluded("info"));
        if let Some(raw) = self.raw_info {
            encoder.emit_str("info");
            encoder.emit_raw(raw);
        }
        self.emit_raw_parts(&mut encoder, Excluded("info"), Unbounded);

        encoder.emit_raw(b"e");
        encoder.get_output()
    }

    /// Write the encoded document to `out`.
    pub fn write<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(&self.to_bytes())
    }

    fn emit_raw_parts(&self, encoder: &mut Encoder, from: Bound<&str>, to: Bound<&str>) {
        for raw in self.raw_parts.range::<str, _>((from, to)).map(|(_, raw)| raw) {
            encoder.emit_raw(raw);
        }
    }
}

#[cfg(test)]
mod test {
    use std::borrow::Cow;

    use crate::torrent::Profile;

    use super::*;

    const INFO: &str = "d6:lengthi1e12:piece lengthi1e6:pieces0:e";

    #[test]
    fn raw_parts_are_placed_around_fixed_keys() {
        let data = format!("d8:announce1:a4:info{}e", INFO).into_bytes();
        let mut torrent = Torrent::load(&data, Profile::ANNOUNCE_INFO).unwrap();
        for (key, raw) in [
            ("announce-abc", "12:announce-abci1e"),
            ("comment", "7:comment1:c"),
            ("zzz", "3:zzzi0e"),
        ] {
            torrent.raw_parts.insert(key.to_owned(), Cow::Owned(raw.as_bytes().to_vec()));
        }
        torrent.encoding = Some("UTF-8".to_owned());
        torrent.set_announce_urls("b".to_owned(), vec![vec!["b".to_owned(), "c".to_owned()]]);

        assert_eq!(
            String::from_utf8(torrent.to_bytes()).unwrap(),
            format!(
                "d8:announce1:b12:announce-abci1e13:announce-listl\
                 l1:b1:cee7:comment1:c8:encoding5:UTF-84:info{}3:zzzi0ee",
                INFO
            )
        );
    }

    #[test]
    fn write_matches_to_bytes() {
        let data = format!("d8:announce1:a7:comment1:x4:info{}e", INFO).into_bytes();
        let torrent = Torrent::load(&data, Profile::STRICT).unwrap();
        let mut out = Vec::new();
        torrent.write(&mut out).unwrap();
        assert_eq!(out, data);
    }
}
