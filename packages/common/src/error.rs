use crate::paths::rel_path_json;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of hand-authored typed file that can shadow a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedKind {
    Ts,
    Tsx,
}

impl fmt::Display for TypedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedKind::Ts => write!(f, "Ts"),
            TypedKind::Tsx => write!(f, "Tsx"),
        }
    }
}

/// Common error type shared by every svelte2dts crate
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("{kind} file {} conflicts with {}.", rel_path_json(.typed_path), rel_path_json(.component_path))]
    Conflict {
        kind: TypedKind,
        typed_path: PathBuf,
        component_path: PathBuf,
    },

    #[error("Failed to read {}: {source}", rel_path_json(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to transform {}: {message}", rel_path_json(.path))]
    Transform { path: PathBuf, message: String },

    #[error("Declaration compiler failed: {0}")]
    Compile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl CommonError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, CommonError::Conflict { .. })
    }
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_both_paths() {
        let err = CommonError::Conflict {
            kind: TypedKind::Tsx,
            typed_path: PathBuf::from("/proj/src/Button.svelte.tsx"),
            component_path: PathBuf::from("/proj/src/Button.svelte"),
        };

        let message = err.to_string();
        assert!(message.starts_with("Tsx file "));
        assert!(message.contains("Button.svelte.tsx\""));
        assert!(message.contains("conflicts with"));
        assert!(message.ends_with("Button.svelte\"."));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_generic_from_str() {
        let err: CommonError = "boom".into();
        assert_eq!(err.to_string(), "Generic error: boom");
        assert!(!err.is_conflict());
    }
}
