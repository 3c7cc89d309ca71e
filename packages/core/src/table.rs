//! Virtual mapping table
//!
//! Keys are synthetic intermediate paths (`<component>.tsx`). Stripping the
//! suffix from a key always yields the entry's component path; [`VirtualTable::insert`]
//! derives the key from the entry so the invariant cannot be broken.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use sveltedts_common::paths::{append_suffix, strip_suffix, DECLARATION_SUFFIX, INTERMEDIATE_SUFFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEntry {
    source_text: String,
    destination_path: PathBuf,
    component_path: PathBuf,
    captured_output: Option<String>,
    auto_generated: bool,
}

impl VirtualEntry {
    pub fn new(source_text: String, destination_path: PathBuf, component_path: PathBuf) -> Self {
        Self {
            source_text,
            destination_path,
            component_path,
            captured_output: None,
            auto_generated: false,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    pub fn component_path(&self) -> &Path {
        &self.component_path
    }

    /// Declaration text emitted for this entry, if any pass produced it
    pub fn captured_output(&self) -> Option<&str> {
        self.captured_output.as_deref()
    }

    pub fn is_auto_generated(&self) -> bool {
        self.auto_generated
    }

    pub fn is_complete(&self) -> bool {
        self.captured_output.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualTable {
    entries: BTreeMap<PathBuf, VirtualEntry>,
}

impl VirtualTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthetic key for a component path
    pub fn key_for(component: &Path) -> PathBuf {
        append_suffix(component, INTERMEDIATE_SUFFIX)
    }

    /// Insert a caller-supplied entry, returning its key
    pub fn insert(&mut self, entry: VirtualEntry) -> PathBuf {
        let key = Self::key_for(&entry.component_path);
        self.entries.insert(key.clone(), entry);
        key
    }

    /// Insert an entry materialized during a pass
    pub fn insert_discovered(&mut self, mut entry: VirtualEntry) -> PathBuf {
        entry.auto_generated = true;
        self.insert(entry)
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &Path) -> Option<&VirtualEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<PathBuf> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &VirtualEntry)> {
        self.entries.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = &VirtualEntry> {
        self.entries.values()
    }

    pub fn clear_auto_generated(&mut self) {
        for entry in self.entries.values_mut() {
            entry.auto_generated = false;
        }
    }

    /// Keys discovered since the last [`clear_auto_generated`](Self::clear_auto_generated)
    pub fn auto_generated_keys(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.auto_generated)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Entries still lacking declaration output
    pub fn incomplete(&self) -> impl Iterator<Item = &VirtualEntry> {
        self.entries.values().filter(|entry| !entry.is_complete())
    }

    /// Route emitted declaration text to the entry that owns `declaration_path`
    ///
    /// Returns `false`, leaving the table untouched, when no entry owns it.
    pub fn capture_output(&mut self, declaration_path: &Path, contents: &str) -> bool {
        let Some(component) = strip_suffix(declaration_path, DECLARATION_SUFFIX) else {
            return false;
        };
        match self.entries.get_mut(&Self::key_for(&component)) {
            Some(entry) if entry.component_path == component => {
                entry.captured_output = Some(contents.to_string());
                true
            }
            _ => false,
        }
    }
}

impl IntoIterator for VirtualTable {
    type Item = (PathBuf, VirtualEntry);
    type IntoIter = std::collections::btree_map::IntoIter<PathBuf, VirtualEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(component: &str) -> VirtualEntry {
        VirtualEntry::new(
            format!("// {}", component),
            PathBuf::from(format!("/proj/types/{}.d.ts", component.trim_start_matches("/proj/src/"))),
            PathBuf::from(component),
        )
    }

    #[test]
    fn test_insert_derives_intermediate_key() {
        let mut table = VirtualTable::new();
        let key = table.insert(entry("/proj/src/Button.svelte"));

        assert_eq!(key, PathBuf::from("/proj/src/Button.svelte.tsx"));
        assert!(table.contains(&key));
        assert!(!table.get(&key).unwrap().is_auto_generated());
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_on_non_utf8_component() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let component = PathBuf::from(OsStr::from_bytes(b"/proj/src/Caf\xe9.svelte"));
        let mut table = VirtualTable::new();
        let key = table.insert(VirtualEntry::new(
            String::new(),
            PathBuf::from("/proj/types/Cafe.svelte.d.ts"),
            component.clone(),
        ));

        let declaration = append_suffix(&component, DECLARATION_SUFFIX);
        assert!(table.capture_output(&declaration, "export {};"));
        assert_eq!(table.get(&key).unwrap().captured_output(), Some("export {};"));
    }

    #[test]
    fn test_capture_routes_by_component_path() {
        let mut table = VirtualTable::new();
        let key = table.insert(entry("/proj/src/Button.svelte"));

        assert!(table.capture_output(Path::new("/proj/src/Button.svelte.d.ts"), "export {};"));
        assert_eq!(table.get(&key).unwrap().captured_output(), Some("export {};"));
    }

    #[test]
    fn test_unowned_write_leaves_table_untouched() {
        let mut table = VirtualTable::new();
        table.insert(entry("/proj/src/Button.svelte"));
        let before = table.clone();

        assert!(!table.capture_output(Path::new("/proj/src/util.d.ts"), "export {};"));
        assert!(!table.capture_output(Path::new("/proj/src/Button.svelte.js"), "x"));
        assert_eq!(table, before);
    }

    #[test]
    fn test_auto_generated_marks() {
        let mut table = VirtualTable::new();
        table.insert(entry("/proj/src/App.svelte"));
        let discovered = table.insert_discovered(entry("/proj/src/Icon.svelte"));

        assert_eq!(table.auto_generated_keys(), vec![discovered]);
        table.clear_auto_generated();
        assert!(table.auto_generated_keys().is_empty());
        assert_eq!(table.incomplete().count(), 2);
    }
}
