//! Loading torrent files into memory.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// The complete contents of a torrent file.
///
/// Documents parsed from a buffer borrow from it, so it has to outlive them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    filename: PathBuf,
    data: Vec<u8>,
}

impl Buffer {
    /// Read a regular file into memory.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: '{}'", path.display()),
            ));
        }

        Ok(Buffer {
            filename: path.to_path_buf(),
            data: fs::read(path)?,
        })
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_regular_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"d8:announce0:e").unwrap();

        let buffer = Buffer::load(file.path()).unwrap();
        assert_eq!(buffer.bytes(), b"d8:announce0:e");
        assert_eq!(buffer.len(), 14);
        assert_eq!(buffer.filename(), file.path());
    }

    #[test]
    fn directories_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Buffer::load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Buffer::load(dir.path().join("missing.torrent")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
