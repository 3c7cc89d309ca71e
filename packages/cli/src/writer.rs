use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// How captured declarations reach the disk
#[derive(Debug, Clone, Copy, Default)]
pub struct WritePolicy {
    pub dry_run: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Would have been written, but this is a dry run
    DryRun,
    /// Destination exists and overwriting is off
    Exists,
    /// The compiler produced nothing for this file
    NoOutput,
}

impl WritePolicy {
    pub fn persist(&self, destination: &Path, contents: Option<&str>) -> Result<WriteOutcome> {
        let Some(contents) = contents else {
            return Ok(WriteOutcome::NoOutput);
        };

        if !self.overwrite && destination.exists() {
            return Ok(WriteOutcome::Exists);
        }
        if self.dry_run {
            return Ok(WriteOutcome::DryRun);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(destination, contents)
            .with_context(|| format!("Failed to write {}", destination.display()))?;

        Ok(WriteOutcome::Written)
    }
}
