//! Filesystem abstraction for manifest reads.
//!
//! Production reads the build output from disk; development receives an
//! in-memory filesystem from the build collaborator.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of a filesystem.
pub trait ManifestReader: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl ManifestReader for DiskFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Files held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: HashMap<PathBuf, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.files.remove(path)
    }
}

impl ManifestReader for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in memory filesystem", path.display()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fs() {
        let mut fs = MemoryFs::new().with_file("/build/resources.json", "{}");
        assert!(fs.exists(Path::new("/build/resources.json")));
        assert_eq!(fs.read_to_string(Path::new("/build/resources.json")).unwrap(), "{}");

        fs.remove(Path::new("/build/resources.json"));
        let err = fs.read_to_string(Path::new("/build/resources.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_disk_fs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        assert!(!DiskFs.exists(&path));

        std::fs::write(&path, "{\"a\":[]}").unwrap();
        assert!(DiskFs.exists(&path));
        assert_eq!(DiskFs.read_to_string(&path).unwrap(), "{\"a\":[]}");
    }
}
