//! Namespace listings used to discover which registered modi are available.

pub mod archive;
pub mod loader;

pub use archive::*;
pub use loader::*;
