#![allow(dead_code)]

use torrent_sanitize::encoding::Encoder;

pub const INFO_HASH: &str = "ACF7EB4B5D5CF9528BD82D75A23FBF0201AFD86E";

/// A multi-file `info` dictionary with an extra key.
pub fn info() -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.emit_raw(b"d");
    encoder.emit_str("files");
    encoder.emit_list(|e| {
        for (length, path) in [(1024, &["video", "part.mkv"][..]), (42, &["readme.txt"][..])] {
            e.emit_raw(b"d");
            e.emit_pair("length", &length);
            e.emit_pair("path", path);
            e.emit_raw(b"e");
        }
    });
    encoder.emit_pair("name", "example");
    encoder.emit_pair("piece length", &262_144);
    encoder.emit_str("pieces");
    encoder.emit_bytes(&[[0u8; 20], [0xFF; 20]].concat());
    encoder.emit_pair("private", &1);
    encoder.emit_pair("source", "abc");
    encoder.emit_raw(b"e");
    encoder.get_output()
}

/// A document as produced by common torrent creators.
pub fn document() -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.emit_raw(b"d");
    encoder.emit_pair("announce", "http://tracker.example.com:8080/announce");
    encoder.emit_pair(
        "announce-list",
        &vec![
            vec!["http://tracker.example.com:8080/announce", "udp://tracker.example.com:6969"],
            vec!["udp://tracker.opentracker.org:80"],
        ],
    );
    encoder.emit_pair("comment", "example torrent");
    encoder.emit_pair("created by", "mktorrent 1.1");
    encoder.emit_pair("creation date", &1_700_000_000i64);
    encoder.emit_pair("encoding", "UTF-8");
    encoder.emit_str("info");
    encoder.emit_raw(&info());
    encoder.emit_pair("url-list", &vec!["http://mirror.example.org/files/"]);
    encoder.emit_raw(b"e");
    encoder.get_output()
}
