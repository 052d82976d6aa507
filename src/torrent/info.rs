use log::warn;

use crate::decoding::{Decoder, DictScanner, Error, ErrorKind, ResultExt};

/// A file listed in a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path components joined with `/`.
    pub path: String,
    pub length: i64,
}

/// Summary of a validated `info` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub name: Option<String>,
    pub piece_length: i64,
    /// Number of 20 byte piece hashes.
    pub pieces: usize,
    /// Sum of all file lengths, or the length of a single-file torrent.
    pub total_length: i64,
    /// Empty for single-file torrents.
    pub files: Vec<File>,
    pub private: Option<bool>,
}

fn semantic(decoder: &Decoder, msg: &'static str) -> Error {
    decoder.error(ErrorKind::Semantic(msg))
}

/// Read a name or path component. Without `check_utf8` invalid sequences are
/// accepted and replaced for display.
fn read_name(decoder: &mut Decoder, check_utf8: bool) -> Result<String, Error> {
    if check_utf8 {
        decoder.read_utf8().map(str::to_owned)
    } else {
        decoder
            .read_bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Info {
    /// Validate the `info` dictionary at the cursor.
    ///
    /// Keys are visited in the order they have to appear in: `files` or
    /// `length`, then the optional `name`, `piece length`, `pieces` and the
    /// optional `private`. Other keys are checked for well-formedness only.
    pub(crate) fn parse(decoder: &mut Decoder, check_utf8: bool) -> Result<Info, Error> {
        if decoder.is_eof() {
            return Err(decoder.error(ErrorKind::Structure("expected torrent info, found eof")));
        }
        let mut dict = DictScanner::open(decoder)?;
        const KEY_ERROR: &str = "couldn't find torrent info key";

        let (files, total_length) = if dict.seek(b"files").context(KEY_ERROR)?.is_found() {
            let files = parse_files(dict.decoder(), check_utf8).context("couldn't parse files in torrent info")?;
            let total = files
                .iter()
                .try_fold(0i64, |total, file| total.checked_add(file.length))
                .ok_or_else(|| semantic(dict.decoder(), "total length of files too large"))?;
            (files, total)
        } else if dict.seek(b"length").context(KEY_ERROR)?.is_found() {
            let start = dict.decoder().offset();
            let length = dict
                .decoder()
                .read_integer()
                .context("couldn't parse length in torrent info")?;
            if length < 0 {
                return Err(dict
                    .decoder()
                    .error_at(ErrorKind::Semantic("negative length in torrent info"), start));
            }
            (Vec::new(), length)
        } else {
            return Err(semantic(dict.decoder(), "expected files or length in torrent info"));
        };

        let name = if dict.seek(b"name").context(KEY_ERROR)?.is_found() {
            Some(read_name(dict.decoder(), check_utf8).context("couldn't parse name in torrent info")?)
        } else {
            warn!("torrent info has no name entry");
            None
        };

        if !dict.seek(b"piece length").context(KEY_ERROR)?.is_found() {
            return Err(semantic(dict.decoder(), "expected piece length in torrent info"));
        }
        let piece_length = dict
            .decoder()
            .read_integer()
            .context("couldn't parse piece length in torrent info")?;

        if !dict.seek(b"pieces").context(KEY_ERROR)?.is_found() {
            return Err(semantic(dict.decoder(), "expected pieces in torrent info"));
        }
        let start = dict.decoder().offset();
        let pieces = dict
            .decoder()
            .read_bytes()
            .context("couldn't parse pieces in torrent info")?;
        if pieces.len() % 20 != 0 {
            return Err(dict.decoder().error_at(
                ErrorKind::Semantic("pieces in torrent info has wrong length (not a multiple of 20)"),
                start,
            ));
        }

        let private = if dict.seek(b"private").context(KEY_ERROR)?.is_found() {
            let start = dict.decoder().offset();
            match dict
                .decoder()
                .read_integer()
                .context("couldn't parse torrent info private flag")?
            {
                0 => Some(false),
                1 => Some(true),
                _ => {
                    return Err(dict.decoder().error_at(
                        ErrorKind::Semantic("torrent info private flag is neither 0 nor 1"),
                        start,
                    ));
                },
            }
        } else {
            None
        };

        dict.finish().context(KEY_ERROR)?;

        Ok(Info {
            name,
            piece_length,
            pieces: pieces.len() / 20,
            total_length,
            files,
            private,
        })
    }
}

fn parse_files(decoder: &mut Decoder, check_utf8: bool) -> Result<Vec<File>, Error> {
    if !decoder.is_next(b'l') {
        return Err(decoder.error(ErrorKind::Structure("expected 'l' for list")));
    }
    let start = decoder.offset();
    decoder.advance();

    let mut files = Vec::new();
    loop {
        match decoder.peek() {
            None => return Err(decoder.error(ErrorKind::Structure("expected info files entry, found eof"))),
            Some(b'e') => break,
            Some(_) => files.push(parse_file(decoder, check_utf8).context("couldn't parse files entry")?),
        }
    }
    decoder.advance();

    if files.is_empty() {
        return Err(decoder.error_at(ErrorKind::Semantic("empty files list"), start));
    }
    Ok(files)
}

fn parse_file(decoder: &mut Decoder, check_utf8: bool) -> Result<File, Error> {
    let mut dict = DictScanner::open(decoder)?;
    const KEY_ERROR: &str = "couldn't find info file entry key";

    if !dict.seek(b"length").context(KEY_ERROR)?.is_found() {
        return Err(semantic(dict.decoder(), "expected length in file entry"));
    }
    let start = dict.decoder().offset();
    let length = dict.decoder().read_integer().context("couldn't parse length")?;
    if length < 0 {
        return Err(dict
            .decoder()
            .error_at(ErrorKind::Semantic("negative file length"), start));
    }

    if !dict.seek(b"path").context(KEY_ERROR)?.is_found() {
        return Err(semantic(dict.decoder(), "expected path in file entry"));
    }
    let path = parse_path(dict.decoder(), check_utf8).context("couldn't parse path in file entry")?;

    dict.finish()
        .context("error while searching end of info files entry")?;

    Ok(File { path, length })
}

fn parse_path(decoder: &mut Decoder, check_utf8: bool) -> Result<String, Error> {
    if !decoder.is_next(b'l') {
        return Err(decoder.error(ErrorKind::Structure("expected 'l' for list")));
    }
    decoder.advance();

    let mut components = Vec::new();
    loop {
        match decoder.peek() {
            None => return Err(decoder.error(ErrorKind::Structure("expected path component, found eof"))),
            Some(b'e') => break,
            Some(_) => components.push(read_name(decoder, check_utf8).context("couldn't parse path component")?),
        }
    }
    decoder.advance();

    Ok(components.join("/"))
}
