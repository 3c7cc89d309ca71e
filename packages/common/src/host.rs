//! Compiler host contract
//!
//! The declaration compiler never touches the disk directly: every existence
//! check, read and write goes through a [`CompilerHost`]. This is the seam the
//! virtual file overlay decorates.

use crate::filesystem::FileSystem;
use crate::options::CompilerOptions;
use crate::result::CommonResult;
use std::fmt;
use std::path::{Path, PathBuf};

/// File-system primitives the declaration compiler relies on
pub trait CompilerHost {
    /// Does `path` exist as a file?
    ///
    /// Takes `&mut self` because decorating hosts may materialize files on demand.
    fn file_exists(&mut self, path: &Path) -> CommonResult<bool>;

    /// Read a file, `None` when it does not exist
    fn read_file(&self, path: &Path) -> CommonResult<Option<String>>;

    /// Write emitted output
    fn write_file(&mut self, path: &Path, contents: &str) -> CommonResult<()>;

    /// Checked before probing `index` files of an import
    fn directory_exists(&self, path: &Path) -> bool;

    /// Base for relative root paths
    fn current_directory(&self) -> PathBuf;
}

/// Host backed by a [`FileSystem`]
///
/// Reads go through the file system abstraction; writes land on disk.
pub struct FsCompilerHost<'fs> {
    fs: &'fs dyn FileSystem,
    cwd: PathBuf,
}

impl<'fs> FsCompilerHost<'fs> {
    pub fn new(fs: &'fs dyn FileSystem) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self { fs, cwd }
    }
}

impl CompilerHost for FsCompilerHost<'_> {
    fn file_exists(&mut self, path: &Path) -> CommonResult<bool> {
        Ok(self.fs.exists(path) && !self.fs.is_dir(path))
    }

    fn read_file(&self, path: &Path) -> CommonResult<Option<String>> {
        if !self.fs.exists(path) || self.fs.is_dir(path) {
            return Ok(None);
        }
        Ok(Some(self.fs.read_to_string(path)?))
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> CommonResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.fs.is_dir(path)
    }

    fn current_directory(&self) -> PathBuf {
        self.cwd.clone()
    }
}

/// A non-fatal message reported by the declaration compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}: {}", file.display(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Result of one build-and-emit call
#[derive(Debug, Clone, Default)]
pub struct EmitOutput {
    /// Paths handed to [`CompilerHost::write_file`], in emission order
    pub emitted_files: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A compiler able to build a program from root files and emit declarations
pub trait DeclarationCompiler {
    /// Build the program for `roots` and emit it through `host` in one blocking call
    fn emit(
        &self,
        roots: &[PathBuf],
        options: &CompilerOptions,
        host: &mut dyn CompilerHost,
    ) -> CommonResult<EmitOutput>;
}
