//! Replacing files without leaving a half written file behind.

use std::{
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;

/// Replace the contents of `path` with `contents`.
///
/// The data is written to a temporary file in the same directory, which is
/// then renamed over `path`. Readers see either the old or the new file. On
/// unix the new file gets mode `0644`.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};
        file.as_file().set_permissions(Permissions::from_mode(0o644))?;
    }

    file.persist(path)?;
    Ok(())
}
