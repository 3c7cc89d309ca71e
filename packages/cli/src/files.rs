use std::path::{Path, PathBuf};
use sveltedts_common::paths::{has_suffix, DECLARATION_SUFFIX};
use walkdir::{DirEntry, WalkDir};

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx"];

/// Files found under one source directory
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SourceSet {
    pub components: Vec<PathBuf>,
    pub scripts: Vec<PathBuf>,
}

/// Walk `dir` for components and plain scripts
///
/// `node_modules` and dot-directories are never entered. Scripts exclude
/// declaration files; `.js`/`.jsx` are only picked up with `allow_js`.
pub fn collect_sources(dir: &Path, extensions: &[String], allow_js: bool) -> SourceSet {
    let mut sources = SourceSet::default();

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();

        if extensions.iter().any(|ext| has_suffix(&path, ext)) {
            sources.components.push(path);
        } else if is_script(&path, allow_js) {
            sources.scripts.push(path);
        }
    }

    sources
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name == "node_modules" || name.starts_with('.'))
            .unwrap_or(false)
}

fn is_script(path: &Path, allow_js: bool) -> bool {
    if has_suffix(path, DECLARATION_SUFFIX) {
        return false;
    }
    let matches = |exts: &[&str]| exts.iter().any(|ext| has_suffix(path, ext));
    matches(TS_EXTENSIONS) || (allow_js && matches(JS_EXTENSIONS))
}
