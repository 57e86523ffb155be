//! tyshape_core: Core utilities shared by every tyshape crate.
//!
//! Provides name interning and source locations.

pub mod intern;
pub mod text;

pub use intern::{Name, NameTable};
pub use text::SourceLocation;
