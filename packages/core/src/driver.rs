//! Iterative declaration driver
//!
//! Each pass compiles the current worklist through the overlay. Components the
//! compiler asked about during a pass become the next worklist, until a pass
//! discovers nothing or the pass cap is reached.

use crate::discovery::DiscoveryHook;
use crate::overlay::OverlayHost;
use crate::table::VirtualTable;
use std::path::PathBuf;
use sveltedts_common::paths::relative_path;
use sveltedts_common::{CommonResult, CompilerHost, CompilerOptions, DeclarationCompiler};
use tracing::{info, warn};

/// Maximum number of compilation passes per run
pub const MAX_PASSES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Initial,
    Running,
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleReason {
    /// The last pass discovered nothing new
    FixedPoint,
    /// The pass cap was hit with discoveries still waiting for a pass
    AttemptCap { pending: Vec<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverReport {
    pub passes: usize,
    pub reason: SettleReason,
}

/// Worklist and pass counter, independent of any compiler
#[derive(Debug, Clone)]
pub struct PassSchedule {
    max_passes: usize,
    pass: usize,
    worklist: Vec<PathBuf>,
    state: DriverState,
}

impl PassSchedule {
    pub fn new(max_passes: usize) -> Self {
        Self {
            max_passes,
            pass: 0,
            worklist: Vec::new(),
            state: DriverState::Initial,
        }
    }

    /// Seed the first pass with every known key
    pub fn start(&mut self, initial: Vec<PathBuf>) {
        self.pass = 1;
        self.worklist = initial;
        self.state = if self.worklist.is_empty() || self.max_passes == 0 {
            DriverState::Settled
        } else {
            DriverState::Running
        };
    }

    /// Number and roots of the next pass, `None` once settled
    pub fn next_pass(&mut self) -> Option<(usize, Vec<PathBuf>)> {
        match self.state {
            DriverState::Running => Some((self.pass, std::mem::take(&mut self.worklist))),
            _ => None,
        }
    }

    /// Record what the finished pass discovered
    pub fn complete_pass(&mut self, discovered: Vec<PathBuf>) {
        self.pass += 1;
        self.worklist = discovered;
        if self.worklist.is_empty() || self.pass > self.max_passes {
            self.state = DriverState::Settled;
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn passes_run(&self) -> usize {
        self.pass.saturating_sub(1)
    }

    pub fn report(&self) -> DriverReport {
        let reason = if self.worklist.is_empty() {
            SettleReason::FixedPoint
        } else {
            SettleReason::AttemptCap {
                pending: self.worklist.clone(),
            }
        };
        DriverReport {
            passes: self.passes_run(),
            reason,
        }
    }
}

pub struct Driver<'a> {
    compiler: &'a dyn DeclarationCompiler,
    options: &'a CompilerOptions,
    discovery: &'a dyn DiscoveryHook,
    max_passes: usize,
}

impl<'a> Driver<'a> {
    pub fn new(
        compiler: &'a dyn DeclarationCompiler,
        options: &'a CompilerOptions,
        discovery: &'a dyn DiscoveryHook,
    ) -> Self {
        Self {
            compiler,
            options,
            discovery,
            max_passes: MAX_PASSES,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Run passes until settled
    ///
    /// Conflict, read and compiler errors abort the run. Entries left without
    /// output at the cap are only reported.
    pub fn run(
        &self,
        table: &mut VirtualTable,
        real: &mut dyn CompilerHost,
    ) -> CommonResult<DriverReport> {
        let mut schedule = PassSchedule::new(self.max_passes);
        schedule.start(table.keys());

        while let Some((pass, roots)) = schedule.next_pass() {
            if pass == 1 {
                info!("--- Running declarations (attempt: {}) ---", pass);
            } else {
                info!("--- Re-Running declarations (attempt: {}) ---", pass);
                let missed: Vec<String> = roots.iter().map(|root| relative_path(root)).collect();
                info!("Covering missed files {:?}", missed);
            }

            table.clear_auto_generated();
            let output = {
                let mut overlay = OverlayHost::new(&mut *real, &mut *table, self.discovery);
                self.compiler.emit(&roots, self.options, &mut overlay)?
            };
            for diagnostic in &output.diagnostics {
                warn!("{}", diagnostic);
            }

            schedule.complete_pass(table.auto_generated_keys());
        }

        let report = schedule.report();
        if let SettleReason::AttemptCap { pending } = &report.reason {
            warn!(
                passes = report.passes,
                pending = pending.len(),
                "stopped after the pass limit with components still pending"
            );
        }
        for entry in table.incomplete() {
            warn!(
                "No declarations were emitted for {}",
                relative_path(entry.component_path())
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_empty_start_settles_without_passes() {
        let mut schedule = PassSchedule::new(MAX_PASSES);
        schedule.start(Vec::new());

        assert_eq!(schedule.state(), DriverState::Settled);
        assert_eq!(schedule.next_pass(), None);
        assert_eq!(
            schedule.report(),
            DriverReport {
                passes: 0,
                reason: SettleReason::FixedPoint
            }
        );
    }

    #[test]
    fn test_single_pass_at_fixed_point() {
        let mut schedule = PassSchedule::new(MAX_PASSES);
        assert_eq!(schedule.state(), DriverState::Initial);
        schedule.start(paths(&["/a.svelte.tsx", "/b.svelte.tsx"]));

        let (pass, roots) = schedule.next_pass().unwrap();
        assert_eq!(pass, 1);
        assert_eq!(roots.len(), 2);
        schedule.complete_pass(Vec::new());

        assert_eq!(schedule.next_pass(), None);
        assert_eq!(schedule.report().passes, 1);
        assert_eq!(schedule.report().reason, SettleReason::FixedPoint);
    }

    #[test]
    fn test_cap_leaves_pending_work() {
        let mut schedule = PassSchedule::new(MAX_PASSES);
        schedule.start(paths(&["/0.svelte.tsx"]));

        let mut passes = Vec::new();
        while let Some((pass, _)) = schedule.next_pass() {
            passes.push(pass);
            schedule.complete_pass(paths(&[format!("/{}.svelte.tsx", pass).as_str()]));
        }

        assert_eq!(passes, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            schedule.report(),
            DriverReport {
                passes: 5,
                reason: SettleReason::AttemptCap {
                    pending: paths(&["/5.svelte.tsx"])
                }
            }
        );
    }

    #[test]
    fn test_later_passes_only_cover_discoveries() {
        let mut schedule = PassSchedule::new(MAX_PASSES);
        schedule.start(paths(&["/a.svelte.tsx", "/b.svelte.tsx"]));

        schedule.next_pass();
        schedule.complete_pass(paths(&["/c.svelte.tsx"]));

        let (pass, roots) = schedule.next_pass().unwrap();
        assert_eq!(pass, 2);
        assert_eq!(roots, paths(&["/c.svelte.tsx"]));
    }
}
