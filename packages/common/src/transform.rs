use crate::result::CommonResult;
use std::path::Path;

/// Turns component source text into compiler-understood intermediate text
pub trait Transformer {
    /// `path` is only used for naming and diagnostics; implementations must not read it.
    fn transform(&self, source: &str, path: &Path) -> CommonResult<String>;
}

impl<F> Transformer for F
where
    F: Fn(&str, &Path) -> CommonResult<String>,
{
    fn transform(&self, source: &str, path: &Path) -> CommonResult<String> {
        self(source, path)
    }
}
