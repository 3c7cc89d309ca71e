//! Path helpers shared by the overlay, the emitter and the CLI.
//!
//! Suffixes are appended textually (`Button.svelte` -> `Button.svelte.tsx`)
//! rather than through `Path::with_extension`, which would replace the
//! component extension.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Suffix of synthesized intermediate files
pub const INTERMEDIATE_SUFFIX: &str = ".tsx";

/// Suffix of hand-authored typed siblings
pub const TYPED_SUFFIX: &str = ".ts";

/// Suffix of declaration output
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// Append a textual suffix to a path
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Strip a textual suffix from a path, if present
///
/// Works on the raw bytes, so paths that are not valid UTF-8 still match.
#[cfg(unix)]
pub fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;

    path.as_os_str()
        .as_bytes()
        .strip_suffix(suffix.as_bytes())
        .map(|stem| PathBuf::from(std::ffi::OsStr::from_bytes(stem)))
}

#[cfg(not(unix))]
pub fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    path.to_str()?.strip_suffix(suffix).map(PathBuf::from)
}

pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.as_os_str().as_encoded_bytes().ends_with(suffix.as_bytes())
}

/// Re-root `path` from `from` onto `to`, keeping its relative location
pub fn remap_root(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    path.strip_prefix(from).ok().map(|relative| to.join(relative))
}

/// Lexically resolve `.` and `..` components without touching the disk
///
/// Overlay keys are compared by exact path, so resolved import targets must
/// be normalized the same way as caller-supplied component paths.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Display a path relative to the current directory when it lives below it
pub fn relative_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(Path::to_path_buf));

    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

/// Relative path rendered as a JSON string literal, for log and error messages
pub fn rel_path_json(path: &Path) -> String {
    let relative = relative_path(path);
    serde_json::to_string(&relative).unwrap_or_else(|_| format!("{:?}", relative))
}
