use std::path::Path;

use crate::scanner::{walk_files, ScanError};

#[derive(Debug)]
pub enum CopyError {
    Scan(ScanError),
    Io(std::io::Error),
}

impl From<ScanError> for CopyError {
    fn from(err: ScanError) -> Self {
        CopyError::Scan(err)
    }
}

impl From<std::io::Error> for CopyError {
    fn from(err: std::io::Error) -> Self {
        CopyError::Io(err)
    }
}

impl std::fmt::Display for CopyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyError::Scan(e) => write!(f, "Scan error: {}", e),
            CopyError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CopyError {}

/// Copy every regular file under `source` to the same relative path
/// under `dest`, creating parent directories as needed.
///
/// Bytes are copied verbatim and an existing destination file is
/// silently truncated. The first failing file aborts the whole copy;
/// a partial copy is not worth resuming mid-run. Returns the number of
/// files copied.
pub fn copy_dir(source: &Path, dest: &Path) -> Result<usize, CopyError> {
    let mut copied = 0;
    for entry in walk_files(source) {
        let entry = entry?;
        let dest_path = dest.join(&entry.rel);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        println!("copying {}", dest_path.display());
        std::fs::copy(&entry.path, &dest_path)?;
        copied += 1;
    }

    Ok(copied)
}
