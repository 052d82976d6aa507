use crate::{
    decoding::{DictScanner, Error, ErrorKind, ResultExt},
    utf8,
};

/// Default limit on nested lists and dicts.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A cursor over an immutable bencode buffer.
///
/// Every primitive comes in a `read_*` flavour that returns the (borrowed)
/// value and a `skip_*` flavour that only validates and advances. A failing
/// call leaves the cursor where it was, so callers may try an alternative
/// interpretation of the same value.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    source: &'a [u8],
    offset: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder positioned at the start of `source`
    pub fn new(source: &'a [u8]) -> Self {
        Decoder {
            source,
            offset: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth of lists and dicts that may be skipped.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.offset).copied()
    }

    pub fn is_next(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    /// Step over the current byte, if any.
    pub fn advance(&mut self) {
        if !self.is_eof() {
            self.offset += 1;
        }
    }

    /// Consume `literal` if the input continues with it.
    pub fn try_consume(&mut self, literal: &[u8]) -> bool {
        if self.source[self.offset..].starts_with(literal) {
            self.offset += literal.len();
            true
        } else {
            false
        }
    }

    /// Bytes from `start` up to the current position.
    pub fn span_from(&self, start: usize) -> &'a [u8] {
        &self.source[start..self.offset]
    }

    /// Everything from the current position to the end of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.source[self.offset..]
    }

    pub(crate) fn rewind(&mut self, offset: usize) {
        debug_assert!(offset <= self.source.len());
        self.offset = offset;
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.source, self.offset)
    }

    pub(crate) fn error_at(&self, kind: ErrorKind, offset: usize) -> Error {
        Error::at(kind, self.source, offset)
    }

    fn structure_at(&self, msg: &'static str, offset: usize) -> Error {
        self.error_at(ErrorKind::Structure(msg), offset)
    }

    /// Read a byte string (`<len>:<bytes>`).
    pub fn read_bytes(&mut self) -> Result<&'a [u8], Error> {
        let len = self.source.len();
        let mut pos = self.offset;

        let first = match self.source.get(pos) {
            None => return Err(self.structure_at("expected string length, found eof", pos)),
            Some(c) if c.is_ascii_digit() => *c,
            Some(_) => return Err(self.structure_at("expected digit for string length", pos)),
        };
        pos += 1;
        if first == b'0' && self.source.get(pos).is_some_and(|&c| c != b':') {
            return Err(self.structure_at(
                "expected string length, found leading zero of non zero length",
                pos,
            ));
        }

        let mut slen = usize::from(first - b'0');
        loop {
            let c = match self.source.get(pos) {
                None => return Err(self.structure_at("expected string length, found eof", pos)),
                Some(&c) => c,
            };
            pos += 1;
            if c == b':' {
                break;
            }
            if !c.is_ascii_digit() {
                return Err(self.structure_at("expected digit or colon for string length", pos - 1));
            }
            // the length can never exceed the buffer, so stop before it could overflow
            slen = match slen
                .checked_mul(10)
                .and_then(|n| n.checked_add(usize::from(c - b'0')))
            {
                Some(n) if n <= len => n,
                _ => {
                    return Err(self.structure_at("file not large enough for string length", pos - 1));
                },
            };
        }

        if slen > len - pos {
            return Err(self.structure_at("file not large enough for string length", self.offset));
        }

        let bytes = &self.source[pos..pos + slen];
        self.offset = pos + slen;
        Ok(bytes)
    }

    pub fn skip_bytes(&mut self) -> Result<(), Error> {
        self.read_bytes().map(|_| ())
    }

    /// Read a byte string that must be well-formed UTF-8.
    pub fn read_utf8(&mut self) -> Result<&'a str, Error> {
        self.read_checked(utf8::utf8)
    }

    /// Read a byte string that must be UTF-8 text without control or format characters.
    pub fn read_text(&mut self) -> Result<&'a str, Error> {
        self.read_checked(utf8::text)
    }

    fn read_checked(&mut self, check: fn(&[u8]) -> Option<&str>) -> Result<&'a str, Error> {
        let start = self.offset;
        let bytes = self.read_bytes()?;
        match check(bytes) {
            Some(s) => Ok(s),
            None => {
                self.offset = start;
                Err(self.error(ErrorKind::InvalidUtf8))
            },
        }
    }

    /// Validate an integer token and return whether it is negative together with its digits.
    fn take_integer(&mut self) -> Result<(bool, &'a [u8]), Error> {
        let mut pos = self.offset;

        match self.source.get(pos) {
            None => return Err(self.structure_at("expected number, found eof", pos)),
            Some(b'i') => pos += 1,
            Some(_) => return Err(self.structure_at("expected 'i' for number", pos)),
        }

        let negative = self.source.get(pos) == Some(&b'-');
        if negative {
            pos += 1;
        }

        let digits_start = pos;
        match self.source.get(pos) {
            None => return Err(self.structure_at("expected digit for number, found eof", pos)),
            Some(b'0') if negative => {
                return Err(self.structure_at("found leading zero in negative number", pos));
            },
            Some(b'0') => {
                if self.source.get(pos + 1).is_some_and(|&c| c != b'e') {
                    return Err(self.structure_at("found leading zero for non zero number", pos));
                }
            },
            Some(c) if c.is_ascii_digit() => {},
            Some(_) => return Err(self.structure_at("expected leading digit for number", pos)),
        }
        pos += 1;

        loop {
            match self.source.get(pos) {
                None => return Err(self.structure_at("expected digit or 'e' for number, found eof", pos)),
                Some(b'e') => break,
                Some(c) if c.is_ascii_digit() => pos += 1,
                Some(_) => return Err(self.structure_at("expected digit or 'e' for number", pos)),
            }
        }

        let digits = &self.source[digits_start..pos];
        self.offset = pos + 1;
        Ok((negative, digits))
    }

    /// Read a signed 64 bit integer (`i<n>e`).
    pub fn read_integer(&mut self) -> Result<i64, Error> {
        let start = self.offset;
        let (negative, digits) = self.take_integer()?;

        let mut number: i64 = 0;
        for (i, &c) in digits.iter().enumerate() {
            let digit = i64::from(c - b'0');
            // accumulate towards the sign so that i64::MIN is representable
            let next = number.checked_mul(10).and_then(|n| {
                if negative {
                    n.checked_sub(digit)
                } else {
                    n.checked_add(digit)
                }
            });
            number = match next {
                Some(n) => n,
                None => {
                    self.offset = start;
                    let msg = if negative {
                        "number too small for int64_t"
                    } else {
                        "number too large for int64_t"
                    };
                    let digits_start = start + 1 + usize::from(negative);
                    return Err(self.structure_at(msg, digits_start + i));
                },
            };
        }

        Ok(number)
    }

    pub fn skip_integer(&mut self) -> Result<(), Error> {
        self.take_integer().map(|_| ())
    }

    fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= self.max_depth {
            return Err(self.error(ErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    pub fn skip_list(&mut self) -> Result<(), Error> {
        match self.peek() {
            None => return Err(self.error(ErrorKind::Structure("expected list, found eof"))),
            Some(b'l') => {},
            Some(_) => return Err(self.error(ErrorKind::Structure("expected 'l' for list"))),
        }
        self.enter()?;
        let start = self.offset;
        self.advance();

        let result = loop {
            match self.peek() {
                None => {
                    break Err(self.error(ErrorKind::Structure("expected list entry or 'e', found eof")));
                },
                Some(b'e') => {
                    self.advance();
                    break Ok(());
                },
                Some(_) => {
                    if let Err(err) = self.skip_value().context("parsing list entry failed") {
                        break Err(err);
                    }
                },
            }
        };

        self.leave();
        if result.is_err() {
            self.offset = start;
        }
        result
    }

    pub fn skip_dict(&mut self) -> Result<(), Error> {
        self.enter()?;
        let start = self.offset;
        let result = DictScanner::open(self).and_then(DictScanner::finish).map(|_| ());
        self.leave();
        if result.is_err() {
            self.offset = start;
        }
        result
    }

    pub fn skip_value(&mut self) -> Result<(), Error> {
        match self.peek() {
            None => Err(self.error(ErrorKind::Structure("expected value, found eof"))),
            Some(b'0'..=b'9') => self.skip_bytes(),
            Some(b'i') => self.skip_integer(),
            Some(b'l') => self.skip_list(),
            Some(b'd') => self.skip_dict(),
            Some(_) => Err(self.error(ErrorKind::Structure("expected value"))),
        }
    }

    /// Skip a value of any type and return its exact encoding.
    pub fn read_raw_value(&mut self) -> Result<&'a [u8], Error> {
        let start = self.offset;
        self.skip_value()?;
        Ok(self.span_from(start))
    }
}

#[cfg(test)]
mod test {
    use std::iter;

    use super::*;

    fn decode_err<'a, T: std::fmt::Debug>(
        msg: &'a [u8],
        op: impl FnOnce(&mut Decoder<'a>) -> Result<T, Error>,
        err_regex: &str,
    ) -> Error {
        let mut decoder = Decoder::new(msg);
        match op(&mut decoder) {
            Ok(value) => panic!("Unexpected parse success: {:?}", value),
            Err(err) => {
                let err_regex = regex::Regex::new(err_regex).expect("Test regexes should be valid");
                if !err_regex.is_match(&err.to_string()) {
                    panic!("Unexpected error: {}", err);
                }
                assert_eq!(decoder.offset(), 0, "failed reads must not advance");
                err
            },
        }
    }

    #[test]
    fn integers_should_parse() {
        let cases: &[(&[u8], i64)] = &[
            (b"i0e", 0),
            (b"i42e", 42),
            (b"i-5e", -5),
            (b"i9223372036854775807e", i64::MAX),
            (b"i-9223372036854775808e", i64::MIN),
        ];
        for (input, expected) in cases {
            let mut decoder = Decoder::new(input);
            assert_eq!(decoder.read_integer().unwrap(), *expected);
            assert!(decoder.is_eof());
        }
    }

    #[test]
    fn negative_zero_is_illegal() {
        decode_err(b"i-0e", Decoder::read_integer, "leading zero in negative number");
    }

    #[test]
    fn leading_zeros_are_illegal() {
        decode_err(b"i03e", Decoder::read_integer, "leading zero for non zero number");
        decode_err(b"i-03e", Decoder::read_integer, "leading zero in negative number");
        decode_err(b"i03e", Decoder::skip_integer, "leading zero");
    }

    #[test]
    fn integer_overflow_is_detected() {
        let err = decode_err(b"i9223372036854775808e", Decoder::read_integer, "too large");
        assert_eq!(err.offset(), 19);
        decode_err(b"i-9223372036854775809e", Decoder::read_integer, "too small");
        // skipping does not care about the value
        let mut decoder = Decoder::new(b"i9223372036854775808e");
        decoder.skip_integer().unwrap();
        assert!(decoder.is_eof());
    }

    #[test]
    fn integers_must_have_bodies() {
        decode_err(b"ie", Decoder::read_integer, "expected leading digit");
        decode_err(b"i-e", Decoder::read_integer, "expected leading digit");
        decode_err(b"i12", Decoder::read_integer, "found eof");
        decode_err(b"i1x2e", Decoder::read_integer, "expected digit or 'e'");
    }

    #[test]
    fn strings_should_parse() {
        let mut decoder = Decoder::new(b"0:5:hello");
        assert_eq!(decoder.read_bytes().unwrap(), b"");
        assert_eq!(decoder.read_bytes().unwrap(), b"hello");
        assert!(decoder.is_eof());
    }

    #[test]
    fn truncated_strings_are_rejected() {
        decode_err(b"5:ab", Decoder::read_bytes, "not large enough");
        decode_err(b"3:", Decoder::read_bytes, "not large enough");
        decode_err(b"1", Decoder::read_bytes, "found eof");
    }

    #[test]
    fn huge_string_lengths_are_rejected_early() {
        let err = decode_err(
            b"18446744073709551615:overflow",
            Decoder::read_bytes,
            "not large enough",
        );
        // rejected while reading the digits, long before the colon
        assert!(err.offset() < 20);
        decode_err(
            b"99999999999999999999999999999999:x",
            Decoder::read_bytes,
            "not large enough",
        );
    }

    #[test]
    fn string_lengths_must_be_canonical() {
        decode_err(b"02:hi", Decoder::read_bytes, "leading zero");
        decode_err(b"x:hi", Decoder::read_bytes, "expected digit");
        decode_err(b"2x:hi", Decoder::read_bytes, "digit or colon");
    }

    #[test]
    fn utf8_failures_rewind() {
        let mut decoder = Decoder::new(b"2:\xC0\x80");
        let err = decoder.read_utf8().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
        assert_eq!(decoder.offset(), 0);
        assert_eq!(decoder.read_bytes().unwrap(), b"\xC0\x80");
    }

    #[test]
    fn text_rejects_format_characters() {
        let mut decoder = Decoder::new("4:A\u{200B}".as_bytes());
        assert_eq!(decoder.read_text().unwrap_err().kind(), ErrorKind::InvalidUtf8);
        assert_eq!(decoder.read_utf8().unwrap(), "A\u{200B}");
    }

    #[test]
    fn raw_values_cover_whole_structures() {
        let mut decoder = Decoder::new(b"d3:bari1e3:fooli2ei3eee4:tail");
        assert_eq!(decoder.read_raw_value().unwrap(), b"d3:bari1e3:fooli2ei3eee");
        assert_eq!(decoder.read_bytes().unwrap(), b"tail");
    }

    #[test]
    fn nested_dict_keys_must_ascend() {
        let mut decoder = Decoder::new(b"ld3:fooi1e3:bari1eee");
        let err = decoder.skip_value().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsortedKeys);
        assert_eq!(err.offset(), 10);
    }

    #[test]
    fn unterminated_containers_are_rejected() {
        decode_err(b"l", Decoder::skip_value, "found eof");
        decode_err(b"d", Decoder::skip_value, "found eof");
        decode_err(b"d3:foo", Decoder::skip_value, "expected value, found eof");
        decode_err(b"x", Decoder::skip_value, "expected value");
    }

    #[test]
    fn recursion_should_be_limited() {
        let mut msg = Vec::new();
        msg.extend(iter::repeat(b'l').take(4096));
        msg.extend(iter::repeat(b'e').take(4096));
        let err = Decoder::new(&msg).skip_value().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
    }

    #[test]
    fn recursion_bounds_should_be_tight() {
        let msg = b"lllleeee";
        assert!(Decoder::new(msg).with_max_depth(4).skip_value().is_ok());
        assert!(Decoder::new(msg).with_max_depth(3).skip_value().is_err());
    }

    #[test]
    fn literal_prefixes_are_matched() {
        let mut decoder = Decoder::new(b"d8:announce3:url");
        assert!(!decoder.try_consume(b"d4:info"));
        assert!(decoder.try_consume(b"d8:announce"));
        assert_eq!(decoder.rest(), b"3:url");
    }
}
