//! Declarations for plain script files
//!
//! Scripts are real files, so no overlay or discovery is involved: the
//! compiler runs once over them and every write is captured in memory.

use crate::config::GenerationConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use sveltedts_common::paths::{append_suffix, strip_suffix, DECLARATION_SUFFIX};
use sveltedts_common::{
    CommonResult, CompilerHost, DeclarationCompiler, FileSystem, FsCompilerHost,
};
use tracing::{debug, warn};

const SCRIPT_SUFFIXES: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];

/// Host decorator recording writes instead of performing them
pub struct CapturingHost<'a> {
    real: &'a mut dyn CompilerHost,
    writes: BTreeMap<PathBuf, String>,
}

impl<'a> CapturingHost<'a> {
    pub fn new(real: &'a mut dyn CompilerHost) -> Self {
        Self {
            real,
            writes: BTreeMap::new(),
        }
    }

    pub fn into_writes(self) -> BTreeMap<PathBuf, String> {
        self.writes
    }
}

impl CompilerHost for CapturingHost<'_> {
    fn file_exists(&mut self, path: &Path) -> CommonResult<bool> {
        self.real.file_exists(path)
    }

    fn read_file(&self, path: &Path) -> CommonResult<Option<String>> {
        self.real.read_file(path)
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> CommonResult<()> {
        self.writes.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.real.directory_exists(path)
    }

    fn current_directory(&self) -> PathBuf {
        self.real.current_directory()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDeclaration {
    pub destination_path: PathBuf,
    pub captured_output: Option<String>,
}

fn script_stem(script: &Path) -> PathBuf {
    SCRIPT_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix(script, suffix))
        .unwrap_or_else(|| script.to_path_buf())
}

/// Emit declarations for `scripts` without touching the disk
///
/// Scripts outside the source root are skipped. A script the compiler wrote
/// nothing for keeps `captured_output: None`.
pub fn emit_script_declarations(
    scripts: &[PathBuf],
    config: &GenerationConfig,
    compiler: &dyn DeclarationCompiler,
    fs: &dyn FileSystem,
) -> CommonResult<BTreeMap<PathBuf, ScriptDeclaration>> {
    let scripts: Vec<PathBuf> = scripts
        .iter()
        .filter(|script| {
            let inside = config.is_under_source_root(script);
            if !inside {
                warn!(script = %script.display(), "skipping script outside the source root");
            }
            inside
        })
        .cloned()
        .collect();
    if scripts.is_empty() {
        return Ok(BTreeMap::new());
    }

    let options = config.compiler_options.clone().declaration_only();
    let mut real = FsCompilerHost::new(fs);
    let mut capturing = CapturingHost::new(&mut real);
    let output = compiler.emit(&scripts, &options, &mut capturing)?;
    for diagnostic in &output.diagnostics {
        warn!("{}", diagnostic);
    }
    let mut writes = capturing.into_writes();

    let mut declarations = BTreeMap::new();
    for script in scripts {
        let stem = script_stem(&script);
        let Some(destination) = config.destination_for(&stem) else {
            continue;
        };
        let emitted = append_suffix(&stem, DECLARATION_SUFFIX);
        let captured_output = writes.remove(&emitted);
        debug!(script = %script.display(), captured = captured_output.is_some(), "script declarations");
        declarations.insert(
            script,
            ScriptDeclaration {
                destination_path: destination,
                captured_output,
            },
        );
    }

    Ok(declarations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sveltedts_common::{CompilerOptions, EmitOutput, MockFileSystem};

    /// Writes `// <root>` next to every root, in declaration form
    struct EchoCompiler;

    impl DeclarationCompiler for EchoCompiler {
        fn emit(
            &self,
            roots: &[PathBuf],
            options: &CompilerOptions,
            host: &mut dyn CompilerHost,
        ) -> CommonResult<EmitOutput> {
            assert!(options.declaration && options.emit_declaration_only);
            let mut output = EmitOutput::default();
            for root in roots {
                let text = host.read_file(root)?.unwrap_or_default();
                let destination = append_suffix(&script_stem(root), DECLARATION_SUFFIX);
                host.write_file(&destination, &format!("// {}", text))?;
                output.emitted_files.push(destination);
            }
            Ok(output)
        }
    }

    #[test]
    fn test_script_declarations_are_captured_and_remapped() {
        let fs = MockFileSystem::new()
            .with_file("/proj/src/lib/util.ts", "export const a = 1;")
            .with_file("/outside/x.ts", "export {};");
        let config = GenerationConfig::new("/proj/src", "/proj/types");

        let declarations = emit_script_declarations(
            &[PathBuf::from("/proj/src/lib/util.ts"), PathBuf::from("/outside/x.ts")],
            &config,
            &EchoCompiler,
            &fs,
        )
        .unwrap();

        assert_eq!(declarations.len(), 1);
        let util = &declarations[Path::new("/proj/src/lib/util.ts")];
        assert_eq!(util.destination_path, PathBuf::from("/proj/types/lib/util.d.ts"));
        assert_eq!(util.captured_output.as_deref(), Some("// export const a = 1;"));
        // Nothing reached the real disk
        assert!(!Path::new("/proj/src/lib/util.d.ts").exists());
    }

    #[test]
    fn test_no_scripts_skips_the_compiler() {
        struct PanicCompiler;
        impl DeclarationCompiler for PanicCompiler {
            fn emit(
                &self,
                _roots: &[PathBuf],
                _options: &CompilerOptions,
                _host: &mut dyn CompilerHost,
            ) -> CommonResult<EmitOutput> {
                panic!("compiler should not run");
            }
        }

        let fs = MockFileSystem::new();
        let config = GenerationConfig::new("/proj/src", "/proj/types");
        let declarations = emit_script_declarations(&[], &config, &PanicCompiler, &fs).unwrap();
        assert!(declarations.is_empty());
    }
}
