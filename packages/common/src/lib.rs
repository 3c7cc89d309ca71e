pub mod error;
pub mod filesystem;
pub mod host;
pub mod options;
pub mod paths;
pub mod result;
pub mod transform;

pub use error::*;
pub use filesystem::*;
pub use host::*;
pub use options::*;
pub use paths::*;
pub use result::*;
pub use transform::*;
