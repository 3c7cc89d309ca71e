use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declaration compiler options, in tsconfig `compilerOptions` shape
///
/// Keys the tool does not interpret are kept in `other` and passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub declaration: bool,

    #[serde(default)]
    pub emit_declaration_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_js: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_comments: Option<bool>,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl CompilerOptions {
    /// Force declaration-only emission
    pub fn declaration_only(mut self) -> Self {
        self.declaration = true;
        self.emit_declaration_only = true;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    pub fn allows_js(&self) -> bool {
        self.allow_js.unwrap_or(false)
    }

    pub fn removes_comments(&self) -> bool {
        self.remove_comments.unwrap_or(false)
    }
}
