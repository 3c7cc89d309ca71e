//! Compiler host decorator that serves virtual entries as real files

use crate::discovery::DiscoveryHook;
use crate::table::VirtualTable;
use std::path::{Path, PathBuf};
use sveltedts_common::{CommonResult, CompilerHost};
use tracing::trace;

pub struct OverlayHost<'a> {
    real: &'a mut dyn CompilerHost,
    table: &'a mut VirtualTable,
    discovery: &'a dyn DiscoveryHook,
}

impl<'a> OverlayHost<'a> {
    pub fn new(
        real: &'a mut dyn CompilerHost,
        table: &'a mut VirtualTable,
        discovery: &'a dyn DiscoveryHook,
    ) -> Self {
        Self {
            real,
            table,
            discovery,
        }
    }
}

impl CompilerHost for OverlayHost<'_> {
    fn file_exists(&mut self, path: &Path) -> CommonResult<bool> {
        if self.table.contains(path) {
            return Ok(true);
        }

        self.discovery.discover(path, &mut *self.real, &mut *self.table)?;
        if self.table.contains(path) {
            return Ok(true);
        }
        self.real.file_exists(path)
    }

    fn read_file(&self, path: &Path) -> CommonResult<Option<String>> {
        match self.table.get(path) {
            Some(entry) => Ok(Some(entry.source_text().to_string())),
            None => self.real.read_file(path),
        }
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> CommonResult<()> {
        if self.table.capture_output(path, contents) {
            trace!(path = %path.display(), "captured declaration output");
        } else {
            trace!(path = %path.display(), "dropped unowned write");
        }
        Ok(())
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.real.directory_exists(path)
    }

    fn current_directory(&self) -> PathBuf {
        self.real.current_directory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::NoDiscovery;
    use crate::table::VirtualEntry;
    use std::cell::RefCell;
    use sveltedts_common::{FsCompilerHost, MockFileSystem};

    fn table_with_button() -> VirtualTable {
        let mut table = VirtualTable::new();
        table.insert(VirtualEntry::new(
            "export default class Button {}".to_string(),
            PathBuf::from("/proj/types/Button.svelte.d.ts"),
            PathBuf::from("/proj/src/Button.svelte"),
        ));
        table
    }

    #[test]
    fn test_virtual_entries_look_real() {
        let fs = MockFileSystem::new().with_file("/proj/src/util.ts", "export const a = 1;");
        let mut real = FsCompilerHost::new(&fs);
        let mut table = table_with_button();
        let mut overlay = OverlayHost::new(&mut real, &mut table, &NoDiscovery);

        assert!(overlay.file_exists(Path::new("/proj/src/Button.svelte.tsx")).unwrap());
        assert_eq!(
            overlay.read_file(Path::new("/proj/src/Button.svelte.tsx")).unwrap().as_deref(),
            Some("export default class Button {}")
        );

        // Everything else falls through
        assert!(overlay.file_exists(Path::new("/proj/src/util.ts")).unwrap());
        assert!(!overlay.file_exists(Path::new("/proj/src/Other.svelte.tsx")).unwrap());
        assert_eq!(
            overlay.read_file(Path::new("/proj/src/util.ts")).unwrap().as_deref(),
            Some("export const a = 1;")
        );
        assert!(overlay.directory_exists(Path::new("/proj/src")));
    }

    #[test]
    fn test_writes_are_routed_or_dropped() {
        let fs = MockFileSystem::new();
        let mut real = FsCompilerHost::new(&fs);
        let mut table = table_with_button();

        {
            let mut overlay = OverlayHost::new(&mut real, &mut table, &NoDiscovery);
            overlay
                .write_file(Path::new("/proj/src/Button.svelte.d.ts"), "declare class Button {}")
                .unwrap();
            overlay
                .write_file(Path::new("/proj/node_modules/x/index.d.ts"), "export {};")
                .unwrap();
        }

        let entry = table.get(Path::new("/proj/src/Button.svelte.tsx")).unwrap();
        assert_eq!(entry.captured_output(), Some("declare class Button {}"));
        assert_eq!(table.len(), 1);
    }

    struct RecordingDiscovery {
        seen: RefCell<Vec<PathBuf>>,
    }

    impl DiscoveryHook for RecordingDiscovery {
        fn discover(
            &self,
            candidate: &Path,
            _real: &mut dyn CompilerHost,
            table: &mut VirtualTable,
        ) -> CommonResult<()> {
            self.seen.borrow_mut().push(candidate.to_path_buf());
            if candidate == Path::new("/proj/src/Icon.svelte.tsx") {
                table.insert_discovered(VirtualEntry::new(
                    String::new(),
                    PathBuf::from("/proj/types/Icon.svelte.d.ts"),
                    PathBuf::from("/proj/src/Icon.svelte"),
                ));
            }
            Ok(())
        }
    }

    #[test]
    fn test_discovery_runs_only_for_unknown_paths() {
        let fs = MockFileSystem::new();
        let mut real = FsCompilerHost::new(&fs);
        let mut table = table_with_button();
        let discovery = RecordingDiscovery {
            seen: RefCell::new(Vec::new()),
        };

        let mut overlay = OverlayHost::new(&mut real, &mut table, &discovery);
        assert!(overlay.file_exists(Path::new("/proj/src/Button.svelte.tsx")).unwrap());
        assert!(overlay.file_exists(Path::new("/proj/src/Icon.svelte.tsx")).unwrap());
        assert!(overlay.file_exists(Path::new("/proj/src/Icon.svelte.tsx")).unwrap());

        assert_eq!(
            *discovery.seen.borrow(),
            vec![PathBuf::from("/proj/src/Icon.svelte.tsx")]
        );
    }
}
