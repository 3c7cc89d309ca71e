//! Svelte component -> TypeScript transformer
//!
//! Produces the intermediate text the declaration emitter understands: the
//! component's scripts plus `Props`, `Events` and `Slots` interfaces and a
//! default-exported `SvelteComponentTyped` class.

mod context;
mod extract;
mod transformer;

pub use context::CodeWriter;
pub use extract::{ComponentParts, PropDecl, ScriptBlocks};
pub use transformer::{component_name, SvelteTransformer};
