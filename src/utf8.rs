//! UTF-8 validation for byte strings taken from torrent files.
//!
//! Two independent checks are provided:
//!
//! * [`valid_utf8`] accepts any well-formed UTF-8 sequence. Overlong encodings,
//!   surrogate code points and code points beyond U+10FFFF are rejected, control
//!   characters are fine.
//! * [`valid_text`] additionally rejects characters that have no business in
//!   human readable text: C0/C1 controls (except tab, newline and carriage
//!   return), DEL, noncharacters and the bidirectional / zero-width formatting
//!   characters that are commonly abused to disguise content.

use std::str;

/// Decode `bytes` as strict UTF-8.
pub fn utf8(bytes: &[u8]) -> Option<&str> {
    str::from_utf8(bytes).ok()
}

/// Decode `bytes` as UTF-8 text, see [`valid_text`].
pub fn text(bytes: &[u8]) -> Option<&str> {
    let s = utf8(bytes)?;
    s.chars().all(is_text_char).then_some(s)
}

/// Whether `bytes` is well-formed UTF-8.
pub fn valid_utf8(bytes: &[u8]) -> bool {
    utf8(bytes).is_some()
}

/// Whether `bytes` is well-formed UTF-8 free of control, format and
/// noncharacter code points.
pub fn valid_text(bytes: &[u8]) -> bool {
    text(bytes).is_some()
}

fn is_text_char(c: char) -> bool {
    let cp = u32::from(c);
    match cp {
        0x09 | 0x0A | 0x0D => true,
        // C0, DEL and C1
        0x00..=0x1F | 0x7F..=0x9F => false,
        0xFDD0..=0xFDEF => false,
        // zero width space, joiners, LRM/RLM
        0x200B..=0x200F => false,
        // bidi embeddings and overrides
        0x202A..=0x202E => false,
        // U+xFFFE and U+xFFFF in every plane
        _ => cp & 0xFFFE != 0xFFFE,
    }
}
