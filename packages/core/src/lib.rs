//! Virtual file overlay and iterative declaration driver
//!
//! Components are synthesized into in-memory intermediates, served to a
//! declaration compiler through [`OverlayHost`], and re-compiled as long as
//! the compiler keeps asking about components nobody listed.

pub mod capture;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod guard;
pub mod overlay;
pub mod synthesize;
pub mod table;

pub use capture::{emit_script_declarations, CapturingHost, ScriptDeclaration};
pub use config::{GenerationConfig, TypingsPredicate};
pub use discovery::{ComponentDiscovery, DiscoveryHook, NoDiscovery};
pub use driver::{Driver, DriverReport, DriverState, PassSchedule, SettleReason, MAX_PASSES};
pub use guard::should_create_virtual;
pub use overlay::OverlayHost;
pub use synthesize::{Synthesizer, REFERENCE_DIRECTIVES};
pub use table::{VirtualEntry, VirtualTable};

use sveltedts_common::paths::{normalize, relative_path};
use sveltedts_common::{
    CommonResult, DeclarationCompiler, FileSystem, FsCompilerHost, Transformer,
};
use tracing::{debug, info, warn};

/// Generate declarations for `config.component_paths` and everything they pull in
///
/// The returned table carries one entry per processed component; persisting
/// `captured_output` to `destination_path` is left to the caller.
pub fn generate_component_declarations(
    config: &GenerationConfig,
    transformer: &dyn Transformer,
    compiler: &dyn DeclarationCompiler,
    fs: &dyn FileSystem,
) -> CommonResult<VirtualTable> {
    let synthesizer = Synthesizer::new(fs, transformer);
    let mut table = VirtualTable::new();

    for component in &config.component_paths {
        // Keys must match the normalized paths the compiler asks for
        let component = normalize(component);
        if !should_create_virtual(&component, fs)? {
            debug!("Skipping {}, declarations already exist", relative_path(&component));
            continue;
        }
        let Some(destination) = config.destination_for(&component) else {
            warn!("Skipping {}, it is outside the source root", relative_path(&component));
            continue;
        };
        table.insert(synthesizer.entry(&component, destination)?);
    }

    let options = config.compiler_options.clone().declaration_only();
    let discovery = ComponentDiscovery::new(config, &synthesizer);
    let mut real = FsCompilerHost::new(fs);

    let report = Driver::new(compiler, &options, &discovery)
        .with_max_passes(config.max_passes)
        .run(&mut table, &mut real)?;
    info!(
        passes = report.passes,
        components = table.len(),
        "declaration generation settled"
    );

    Ok(table)
}
