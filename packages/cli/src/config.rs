use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use sveltedts_common::paths::normalize;
use sveltedts_common::CompilerOptions;

pub const TSCONFIG_NAME: &str = "tsconfig.json";

/// On-disk shape of a single tsconfig file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfigFile {
    #[serde(default)]
    extends: Option<String>,

    #[serde(default)]
    compiler_options: Map<String, Value>,
}

/// A tsconfig with its `extends` chain applied
#[derive(Debug, Clone, Default)]
pub struct TsConfig {
    pub path: Option<PathBuf>,
    pub compiler_options: CompilerOptions,
}

impl TsConfig {
    /// Search `start` and its ancestors for a tsconfig.json
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(TSCONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load a tsconfig; `declarationDir` comes back absolute
    pub fn load(path: &Path) -> Result<Self> {
        let mut visited = HashSet::new();
        let options = load_compiler_options(path, &mut visited)?;
        let compiler_options = serde_json::from_value(Value::Object(options))
            .with_context(|| format!("Invalid compilerOptions in {}", path.display()))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            compiler_options,
        })
    }
}

fn load_compiler_options(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Map<String, Value>> {
    if !visited.insert(normalize(path)) {
        bail!("tsconfig extends cycle detected at {}", path.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: TsConfigFile =
        parse_jsonc(&source).with_context(|| format!("Failed to parse {}", path.display()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut options = match &file.extends {
        Some(base) => load_compiler_options(&resolve_extends(dir, base), visited)?,
        None => Map::new(),
    };

    for (key, mut value) in file.compiler_options {
        // Paths in a config are relative to the file that declares them
        if key == "declarationDir" {
            if let Some(relative) = value.as_str() {
                value = Value::String(normalize(&dir.join(relative)).display().to_string());
            }
        }
        options.insert(key, value);
    }

    Ok(options)
}

fn resolve_extends(dir: &Path, specifier: &str) -> PathBuf {
    let with_extension = |path: PathBuf| {
        if path.extension().is_none() {
            path.with_extension("json")
        } else {
            path
        }
    };

    if specifier.starts_with('.') || Path::new(specifier).is_absolute() {
        return with_extension(dir.join(specifier));
    }

    // Package configs, e.g. "@tsconfig/svelte/tsconfig.json"
    let candidates: Vec<PathBuf> = dir
        .ancestors()
        .map(|ancestor| with_extension(ancestor.join("node_modules").join(specifier)))
        .collect();
    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .cloned()
        .unwrap_or_else(|| with_extension(dir.join("node_modules").join(specifier)))
}

/// Parse JSON that may contain comments and trailing commas
pub fn parse_jsonc<T: DeserializeOwned>(source: &str) -> Result<T> {
    let stripped = remove_trailing_commas(&strip_comments(source));
    Ok(serde_json::from_str(&stripped)?)
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            match ch {
                '\\' => out.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                while chars.peek().map(|next| *next != '\n').unwrap_or(false) {
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut in_string = false;
    let mut escaped = false;

    for (index, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[index + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}
