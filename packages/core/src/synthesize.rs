use crate::table::VirtualEntry;
use std::path::{Path, PathBuf};
use sveltedts_common::{CommonError, CommonResult, FileSystem, Transformer};
use tracing::trace;

/// Directives the compiler needs to resolve the shim types used by intermediates
pub const REFERENCE_DIRECTIVES: [&str; 2] = [
    "/// <reference types=\"svelte2tsx/svelte-shims\" />",
    "/// <reference types=\"svelte2tsx/svelte-jsx\" />",
];

/// Turns component files into intermediate source
pub struct Synthesizer<'a> {
    fs: &'a dyn FileSystem,
    transformer: &'a dyn Transformer,
}

impl<'a> Synthesizer<'a> {
    pub fn new(fs: &'a dyn FileSystem, transformer: &'a dyn Transformer) -> Self {
        Self { fs, transformer }
    }

    pub fn file_system(&self) -> &'a dyn FileSystem {
        self.fs
    }

    /// Read, transform and prefix one component
    pub fn synthesize(&self, component: &Path) -> CommonResult<String> {
        let raw = self
            .fs
            .read_to_string(component)
            .map_err(|source| CommonError::Read {
                path: component.to_path_buf(),
                source,
            })?;
        let transformed = self.transformer.transform(&raw, component)?;
        trace!(component = %component.display(), bytes = transformed.len(), "synthesized intermediate");

        let mut source_text = REFERENCE_DIRECTIVES.join("\n");
        source_text.push('\n');
        source_text.push_str(&transformed);
        Ok(source_text)
    }

    pub fn entry(&self, component: &Path, destination: PathBuf) -> CommonResult<VirtualEntry> {
        let source_text = self.synthesize(component)?;
        Ok(VirtualEntry::new(source_text, destination, component.to_path_buf()))
    }
}
