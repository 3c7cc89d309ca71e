use crate::driver::MAX_PASSES;
use std::fmt;
use std::path::{Path, PathBuf};
use sveltedts_common::paths::{append_suffix, normalize, remap_root, DECLARATION_SUFFIX};
use sveltedts_common::CompilerOptions;

/// Predicate deciding which discovered files get typings
pub type TypingsPredicate = Box<dyn Fn(&Path) -> bool>;

/// Everything a generation run needs, passed explicitly to the entry point
pub struct GenerationConfig {
    /// Initial candidates, absolute
    pub component_paths: Vec<PathBuf>,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub compiler_options: CompilerOptions,
    pub max_passes: usize,
    should_generate_typings: TypingsPredicate,
}

impl GenerationConfig {
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            component_paths: Vec::new(),
            source_root: normalize(&source_root.into()),
            output_root: normalize(&output_root.into()),
            compiler_options: CompilerOptions::default(),
            max_passes: MAX_PASSES,
            should_generate_typings: Box::new(|_| false),
        }
    }

    pub fn with_components(mut self, components: Vec<PathBuf>) -> Self {
        self.component_paths = components;
        self
    }

    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = options;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_typings_predicate(mut self, predicate: impl Fn(&Path) -> bool + 'static) -> Self {
        self.should_generate_typings = Box::new(predicate);
        self
    }

    /// Only files ending in one of `extensions` get typings
    pub fn with_extensions(self, extensions: Vec<String>) -> Self {
        self.with_typings_predicate(move |path| {
            let path = path.to_string_lossy();
            extensions.iter().any(|ext| path.ends_with(ext.as_str()))
        })
    }

    pub fn should_generate_typings(&self, path: &Path) -> bool {
        (self.should_generate_typings)(path)
    }

    /// Per-component prefix check, so `/proj/srcs` is not under `/proj/src`
    pub fn is_under_source_root(&self, path: &Path) -> bool {
        path.starts_with(&self.source_root)
    }

    /// `output_root / relative(component)` plus the declaration suffix
    pub fn destination_for(&self, component: &Path) -> Option<PathBuf> {
        remap_root(component, &self.source_root, &self.output_root)
            .map(|mapped| append_suffix(&mapped, DECLARATION_SUFFIX))
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("component_paths", &self.component_paths)
            .field("source_root", &self.source_root)
            .field("output_root", &self.output_root)
            .field("compiler_options", &self.compiler_options)
            .field("max_passes", &self.max_passes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_mapping() {
        let config = GenerationConfig::new("/proj/src", "/proj/types");
        assert_eq!(
            config.destination_for(Path::new("/proj/src/ui/Button.svelte")),
            Some(PathBuf::from("/proj/types/ui/Button.svelte.d.ts"))
        );
        assert_eq!(config.destination_for(Path::new("/elsewhere/Button.svelte")), None);
    }

    #[test]
    fn test_default_predicate_rejects_everything() {
        let config = GenerationConfig::new("/proj/src", "/proj/types");
        assert!(!config.should_generate_typings(Path::new("/proj/src/A.svelte")));
        assert_eq!(config.max_passes, 5);
    }

    #[test]
    fn test_extension_predicate() {
        let config = GenerationConfig::new("/proj/src", "/proj/types")
            .with_extensions(vec![".svelte".to_string()]);
        assert!(config.should_generate_typings(Path::new("/proj/src/A.svelte")));
        assert!(!config.should_generate_typings(Path::new("/proj/src/a.ts")));
    }

    #[test]
    fn test_source_root_is_component_wise() {
        let config = GenerationConfig::new("/proj/src", "/proj/types");
        assert!(config.is_under_source_root(Path::new("/proj/src/A.svelte.tsx")));
        assert!(!config.is_under_source_root(Path::new("/proj/srcs/A.svelte.tsx")));
    }
}
