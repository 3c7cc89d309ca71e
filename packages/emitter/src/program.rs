use crate::resolver::{is_relative, module_specifiers, ModuleResolver};
use crate::scanner::scan;
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use sveltedts_common::paths::normalize;
use sveltedts_common::{CommonResult, CompilerHost, Diagnostic};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    /// Resolved relative imports
    pub imports: Vec<PathBuf>,
}

/// Every file reachable from the roots through relative imports
#[derive(Debug, Default)]
pub struct Program {
    pub files: BTreeMap<PathBuf, SourceFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    /// Load the roots and follow their imports breadth-first
    ///
    /// Relative roots are taken from the host's current directory. Existence probes for imports go through `host.file_exists`, which is
    /// where an overlaying host gets its chance to materialize files.
    pub fn build(roots: &[PathBuf], host: &mut dyn CompilerHost) -> CommonResult<Self> {
        let resolver = ModuleResolver::new();
        let mut program = Program::default();
        let cwd = host.current_directory();
        let mut queue: VecDeque<PathBuf> = roots.iter().map(|root| normalize(&cwd.join(root))).collect();

        while let Some(path) = queue.pop_front() {
            if program.files.contains_key(&path) {
                continue;
            }
            let Some(text) = host.read_file(&path)? else {
                program
                    .diagnostics
                    .push(Diagnostic::new(Some(path.clone()), "File not found"));
                continue;
            };

            let statements = scan(&text);
            let mut imports = Vec::new();
            for specifier in module_specifiers(&statements) {
                if !is_relative(&specifier) {
                    continue;
                }
                match resolver.resolve(&specifier, &path, host)? {
                    Some(resolved) => {
                        if !program.files.contains_key(&resolved) {
                            queue.push_back(resolved.clone());
                        }
                        imports.push(resolved);
                    }
                    None => program.diagnostics.push(Diagnostic::new(
                        Some(path.clone()),
                        format!("Cannot find module '{}'", specifier),
                    )),
                }
            }

            debug!(file = %path.display(), imports = imports.len(), "loaded source file");
            program.files.insert(
                path.clone(),
                SourceFile {
                    path,
                    text,
                    imports,
                },
            );
        }

        Ok(program)
    }

    pub fn source_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }
}
