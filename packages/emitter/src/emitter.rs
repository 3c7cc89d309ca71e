use crate::declarations::emit_declarations;
use crate::program::Program;
use std::path::{Component, Path, PathBuf};
use sveltedts_common::paths::{append_suffix, has_suffix, strip_suffix, DECLARATION_SUFFIX};
use sveltedts_common::{
    CommonError, CommonResult, CompilerHost, CompilerOptions, DeclarationCompiler, EmitOutput,
};
use tracing::{debug, info};

const SOURCE_SUFFIXES: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];

/// Declaration path for an emitted source (`A.svelte.tsx` -> `A.svelte.d.ts`)
///
/// Output is always written next to its source; mapping into an output
/// directory is the caller's concern.
pub fn declaration_path(source: &Path) -> PathBuf {
    let stem = SOURCE_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix(source, suffix))
        .unwrap_or_else(|| source.to_path_buf());
    append_suffix(&stem, DECLARATION_SUFFIX)
}

/// Syntactic `.d.ts` emitter
#[derive(Debug, Default, Clone, Copy)]
pub struct DtsEmitter;

impl DtsEmitter {
    pub fn new() -> Self {
        Self
    }

    fn should_emit(path: &Path, options: &CompilerOptions) -> bool {
        if has_suffix(path, DECLARATION_SUFFIX) {
            return false;
        }
        if path.components().any(|c| c == Component::Normal("node_modules".as_ref())) {
            return false;
        }
        if has_suffix(path, ".js") || has_suffix(path, ".jsx") {
            return options.allows_js();
        }
        true
    }
}

impl DeclarationCompiler for DtsEmitter {
    fn emit(
        &self,
        roots: &[PathBuf],
        options: &CompilerOptions,
        host: &mut dyn CompilerHost,
    ) -> CommonResult<EmitOutput> {
        let mut output = EmitOutput::default();

        if !options.declaration {
            return Err(CommonError::Compile(
                "Option 'emitDeclarationOnly' cannot be specified without specifying option 'declaration'"
                    .to_string(),
            ));
        }

        let program = Program::build(roots, host)?;
        output.diagnostics.extend(program.diagnostics.iter().cloned());
        debug!(files = program.files.len(), "built program");

        for file in program.source_files() {
            if !Self::should_emit(&file.path, options) {
                continue;
            }
            let destination = declaration_path(&file.path);
            let declarations = emit_declarations(&file.text, options);
            host.write_file(&destination, &declarations)?;
            output.emitted_files.push(destination);
        }

        info!(
            emitted = output.emitted_files.len(),
            diagnostics = output.diagnostics.len(),
            "emitted declarations"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryHost {
        files: BTreeMap<PathBuf, String>,
        written: Vec<PathBuf>,
    }

    impl MemoryHost {
        fn with_file(mut self, path: &str, contents: &str) -> Self {
            self.files.insert(PathBuf::from(path), contents.to_string());
            self
        }
    }

    impl CompilerHost for MemoryHost {
        fn file_exists(&mut self, path: &Path) -> CommonResult<bool> {
            Ok(self.files.contains_key(path))
        }

        fn read_file(&self, path: &Path) -> CommonResult<Option<String>> {
            Ok(self.files.get(path).cloned())
        }

        fn write_file(&mut self, path: &Path, contents: &str) -> CommonResult<()> {
            self.written.push(path.to_path_buf());
            self.files.insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }

        fn directory_exists(&self, _path: &Path) -> bool {
            true
        }

        fn current_directory(&self) -> PathBuf {
            PathBuf::from("/proj")
        }
    }

    #[test]
    fn test_declaration_path() {
        assert_eq!(
            declaration_path(Path::new("/proj/src/A.svelte.tsx")),
            PathBuf::from("/proj/src/A.svelte.d.ts")
        );
        assert_eq!(
            declaration_path(Path::new("/proj/src/util.ts")),
            PathBuf::from("/proj/src/util.d.ts")
        );
        assert_eq!(
            declaration_path(Path::new("/proj/src/legacy.js")),
            PathBuf::from("/proj/src/legacy.d.ts")
        );
    }

    #[test]
    fn test_emits_reachable_files() {
        let mut host = MemoryHost::default()
            .with_file(
                "/proj/src/App.svelte.tsx",
                "import Icon from './Icon.svelte';\nexport const title = 'app';",
            )
            .with_file("/proj/src/Icon.svelte.tsx", "export let size = 16;")
            .with_file("/proj/src/types.d.ts", "export type Unused = string;");

        let options = CompilerOptions::default().declaration_only();
        let output = DtsEmitter::new()
            .emit(&[PathBuf::from("/proj/src/App.svelte.tsx")], &options, &mut host)
            .unwrap();

        assert_eq!(
            output.emitted_files,
            vec![
                PathBuf::from("/proj/src/App.svelte.d.ts"),
                PathBuf::from("/proj/src/Icon.svelte.d.ts"),
            ]
        );
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            host.files[Path::new("/proj/src/App.svelte.d.ts")],
            "import Icon from './Icon.svelte';\nexport declare const title = 'app';\n"
        );
        assert_eq!(
            host.files[Path::new("/proj/src/Icon.svelte.d.ts")],
            "export declare let size: number;\n"
        );
    }

    #[test]
    fn test_declaration_inputs_are_not_reemitted() {
        let mut host = MemoryHost::default()
            .with_file("/proj/src/A.ts", "import type { T } from './types';\nexport let t: T;")
            .with_file("/proj/src/types.d.ts", "export type T = string;");

        let options = CompilerOptions::default().declaration_only();
        let output = DtsEmitter::new()
            .emit(&[PathBuf::from("/proj/src/A.ts")], &options, &mut host)
            .unwrap();

        assert_eq!(output.emitted_files, vec![PathBuf::from("/proj/src/A.d.ts")]);
    }

    #[test]
    fn test_js_requires_allow_js() {
        let roots = [PathBuf::from("/proj/src/legacy.js")];
        let mut options = CompilerOptions::default().declaration_only();

        let mut host = MemoryHost::default().with_file("/proj/src/legacy.js", "export const a = 1;");
        let output = DtsEmitter::new().emit(&roots, &options, &mut host).unwrap();
        assert!(output.emitted_files.is_empty());

        options.allow_js = Some(true);
        let output = DtsEmitter::new().emit(&roots, &options, &mut host).unwrap();
        assert_eq!(output.emitted_files, vec![PathBuf::from("/proj/src/legacy.d.ts")]);
    }

    #[test]
    fn test_requires_declaration_option() {
        let mut host = MemoryHost::default().with_file("/proj/src/A.ts", "export const a = 1;");
        let err = DtsEmitter::new()
            .emit(&[PathBuf::from("/proj/src/A.ts")], &CompilerOptions::default(), &mut host)
            .unwrap_err();

        assert!(matches!(err, CommonError::Compile(_)));
        assert!(err.to_string().contains("'declaration'"));
        assert!(host.written.is_empty());
    }
}
