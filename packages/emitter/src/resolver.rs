//! Relative module resolution
//!
//! Only relative specifiers are followed. Package imports are left to the
//! consumer's own resolution and never pulled into the program.

use crate::lexer::Token;
use crate::scanner::Statement;
use std::path::{Path, PathBuf};
use sveltedts_common::paths::{append_suffix, has_suffix, normalize, strip_suffix};
use sveltedts_common::{CommonResult, CompilerHost};
use tracing::trace;

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];

/// Specifiers named by `import ... from`, `export ... from` and side-effect imports
pub fn module_specifiers(statements: &[Statement<'_>]) -> Vec<String> {
    let mut specifiers = Vec::new();

    for statement in statements {
        let sig = statement.significant();
        let Some(first) = sig.first() else { continue };
        if !first.is_word("import") && !first.is_word("export") {
            continue;
        }

        let specifier = match sig.get(1) {
            // import './styles';
            Some(tok) if first.is_word("import") && tok.kind == Token::Str => Some(*tok),
            _ => sig
                .windows(2)
                .find(|pair| pair[0].is_word("from") && pair[1].kind == Token::Str)
                .map(|pair| pair[1]),
        };

        if let Some(tok) = specifier {
            specifiers.push(unquote(tok.text).to_string());
        }
    }

    specifiers
}

fn unquote(text: &str) -> &str {
    text.get(1..text.len().saturating_sub(1)).unwrap_or(text)
}

/// Files probed for an extension-less import base, in priority order
pub fn resolution_candidates(base: &Path) -> Vec<PathBuf> {
    if TS_EXTENSIONS.iter().any(|ext| has_suffix(base, ext)) {
        return vec![base.to_path_buf()];
    }
    if let Some(stem) = strip_suffix(base, ".js") {
        return TS_EXTENSIONS.iter().map(|ext| append_suffix(&stem, ext)).collect();
    }
    if let Some(stem) = strip_suffix(base, ".jsx") {
        return vec![append_suffix(&stem, ".tsx")];
    }

    let mut candidates: Vec<PathBuf> = TS_EXTENSIONS
        .iter()
        .map(|ext| append_suffix(base, ext))
        .collect();
    candidates.extend(TS_EXTENSIONS.iter().map(|ext| base.join(format!("index{}", ext))));
    candidates
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleResolver;

impl ModuleResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `specifier` imported from `importer`
    ///
    /// `Ok(None)` means the module could not be found; errors raised by the
    /// host while probing are propagated.
    pub fn resolve(
        &self,
        specifier: &str,
        importer: &Path,
        host: &mut dyn CompilerHost,
    ) -> CommonResult<Option<PathBuf>> {
        if !is_relative(specifier) {
            return Ok(None);
        }
        let directory = importer.parent().unwrap_or_else(|| Path::new(""));
        let base = normalize(&directory.join(specifier));

        let mut base_is_dir = None;
        for candidate in resolution_candidates(&base) {
            let is_index = candidate.parent() == Some(base.as_path());
            if is_index && !*base_is_dir.get_or_insert_with(|| host.directory_exists(&base)) {
                continue;
            }
            if host.file_exists(&candidate)? {
                trace!(specifier, resolved = %candidate.display(), "resolved module");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".."
}
