//! tyshape_checker: The structural type checker.
//!
//! Builds the type table from declarations, decides assignability between
//! types, instantiates generic signatures at call sites and reports type
//! errors as diagnostics.

mod checker;
mod error;
pub mod instantiate;
pub mod relation;
pub mod types;

pub use checker::{check, Checker, Phase};
pub use error::{CheckError, ConstructionError};
pub use instantiate::{instantiate, InferenceError, InstantiatedSignature};
pub use relation::{Mismatch, Relation};
pub use types::{Type, TypeFlags, TypeId, TypeKind, TypeTable};
