use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug)]
pub enum ScanError {
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        ScanError::Walk(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Walk(e) => write!(f, "Walk error: {}", e),
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

/// One regular file found under a walked root: the full path plus the
/// path relative to that root. The relative part is reused verbatim as
/// the suffix of a destination path, which is how the output tree ends
/// up mirroring the input tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub rel: PathBuf,
}

/// Walk every regular file under `root`, depth first.
///
/// Directories are recursed into but never yielded. The first error
/// (unreadable root, unreadable subtree) surfaces as an `Err` item and
/// halts the walk once the caller propagates it. Symlinks are reported
/// the way the underlying stat sees them, nothing special.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
    WalkDir::new(root).into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return Some(Err(ScanError::Walk(e))),
        };
        if !entry.file_type().is_file() {
            return None;
        }
        let path = entry.into_path();
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => return Some(Err(ScanError::InvalidPath(path))),
        };
        Some(Ok(FileEntry { path, rel }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn yields_every_regular_file_with_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("index.html"));
        touch(&dir.path().join("a/b.html"));
        touch(&dir.path().join("a/c/d.html"));

        let mut rels: Vec<PathBuf> = walk_files(dir.path())
            .map(|e| e.unwrap().rel)
            .collect();
        rels.sort();

        assert_eq!(
            rels,
            vec![
                PathBuf::from("a/b.html"),
                PathBuf::from("a/c/d.html"),
                PathBuf::from("index.html"),
            ]
        );
    }

    #[test]
    fn directories_are_not_emitted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("only/dirs/here")).unwrap();

        assert_eq!(walk_files(dir.path()).count(), 0);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");

        let first = walk_files(&gone).next().unwrap();
        assert!(matches!(first, Err(ScanError::Walk(_))));
    }
}
