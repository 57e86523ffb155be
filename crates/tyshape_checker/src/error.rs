//! Fatal errors.
//!
//! These are not type errors in user code; they mean the input tree itself is
//! malformed (or the checker was misused) and the run is aborted.

use crate::types::TypeId;
use thiserror::Error;
use tyshape_core::text::SourceLocation;

/// Type table construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("duplicate property '{0}'")]
    DuplicateProperty(String),
    #[error("'{origin}' declares {expected} type parameter(s) but {found} binding(s) were supplied")]
    BindingCount {
        origin: String,
        expected: usize,
        found: usize,
    },
    #[error("'{origin}' has no type parameter named '{name}'")]
    UnknownBinding { origin: String, name: String },
    #[error("type {0:?} is not a generic declaration")]
    NotGeneric(TypeId),
    #[error("type {0:?} was already defined")]
    AlreadyDefined(TypeId),
}

/// Errors that abort a checking run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("malformed declaration at {location}: {source}")]
    Construction {
        #[source]
        source: ConstructionError,
        location: SourceLocation,
    },
    #[error("cannot declare '{name}' after checking has begun")]
    DeclarationAfterDeclaring { name: String },
    #[error("checker has already run; create a new checker for each source file")]
    AlreadyChecked,
}

impl CheckError {
    pub(crate) fn construction(source: ConstructionError, location: SourceLocation) -> Self {
        CheckError::Construction { source, location }
    }
}
