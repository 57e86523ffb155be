//! tyshape_ast: Abstract syntax tree consumed by the checker.
//!
//! The tree is produced by an external front-end. It is owned (no arena
//! lifetimes) so that it can be deserialized straight from the JSON the
//! front-end writes, and built by hand through [`factory`] in tests.

pub mod factory;
pub mod node;

pub use node::*;
