//! Transitive auto-discovery of components

use crate::config::GenerationConfig;
use crate::guard::should_create_virtual;
use crate::synthesize::Synthesizer;
use crate::table::VirtualTable;
use std::path::Path;
use sveltedts_common::paths::{strip_suffix, INTERMEDIATE_SUFFIX};
use sveltedts_common::{CommonResult, CompilerHost};
use tracing::{debug, trace};

/// Called by the overlay for every existence check on a path the table does not know
///
/// `real` answers existence against the underlying host without going back
/// through the overlay.
pub trait DiscoveryHook {
    fn discover(
        &self,
        candidate: &Path,
        real: &mut dyn CompilerHost,
        table: &mut VirtualTable,
    ) -> CommonResult<()>;
}

/// Discovery that never materializes anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDiscovery;

impl DiscoveryHook for NoDiscovery {
    fn discover(
        &self,
        _candidate: &Path,
        _real: &mut dyn CompilerHost,
        _table: &mut VirtualTable,
    ) -> CommonResult<()> {
        Ok(())
    }
}

/// Materializes intermediates for components the compiler asks about
pub struct ComponentDiscovery<'a> {
    config: &'a GenerationConfig,
    synthesizer: &'a Synthesizer<'a>,
}

impl<'a> ComponentDiscovery<'a> {
    pub fn new(config: &'a GenerationConfig, synthesizer: &'a Synthesizer<'a>) -> Self {
        Self {
            config,
            synthesizer,
        }
    }
}

impl DiscoveryHook for ComponentDiscovery<'_> {
    fn discover(
        &self,
        candidate: &Path,
        real: &mut dyn CompilerHost,
        table: &mut VirtualTable,
    ) -> CommonResult<()> {
        // Ancillary compiler lookups (.ts, .d.ts, package.json, ...) never synthesize
        let Some(component) = strip_suffix(candidate, INTERMEDIATE_SUFFIX) else {
            return Ok(());
        };

        if !real.file_exists(&component)? {
            trace!(candidate = %candidate.display(), "no component behind intermediate");
            return Ok(());
        }
        if !self.config.should_generate_typings(&component) {
            debug!(component = %component.display(), "not a component kind we type");
            return Ok(());
        }
        if !should_create_virtual(&component, self.synthesizer.file_system())? {
            debug!(component = %component.display(), "declaration already exists");
            return Ok(());
        }
        if !self.config.is_under_source_root(candidate) {
            debug!(component = %component.display(), "outside source root");
            return Ok(());
        }
        let Some(destination) = self.config.destination_for(&component) else {
            return Ok(());
        };

        let entry = self.synthesizer.entry(&component, destination)?;
        table.insert_discovered(entry);
        debug!(component = %component.display(), "discovered component");
        Ok(())
    }
}
