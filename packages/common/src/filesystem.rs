use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File system abstraction for component discovery, synthesis and testing
pub trait FileSystem {
    /// Check if a file (or directory) exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a directory exists
    fn is_dir(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error>;
}

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

/// Mock file system for testing
///
/// Directories are implied by the files added to it.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    pub files: HashMap<PathBuf, String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.add_file(path, contents);
        self
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }
}
