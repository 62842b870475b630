//! Catalog errors.
//!
//! Construction errors abort a language's build and name the offending
//! declaration. Query errors (`NotFound`, `AmbiguousOverload`) are ordinary
//! results handed back to the caller.

use crate::arena::MemberId;
use symcat_loader::LoaderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error("duplicate declaration '{name}' in {scope}")]
    DuplicateName { scope: String, name: String },

    #[error("cyclic inheritance: {}", .cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String> },

    #[error("'{declaration}' expects {expected} type argument(s), got {supplied}")]
    ArityMismatch {
        declaration: String,
        expected: usize,
        supplied: usize,
    },

    #[error("ambiguous reference to '{member}' on '{declaration}': {} candidates remain", .candidates.len())]
    AmbiguousOverload {
        declaration: String,
        member: String,
        candidates: Vec<MemberId>,
    },

    #[error("generic parameter '{parameter}' of '{declaration}' is bound to a type that refers to itself")]
    RecursiveGeneric {
        declaration: String,
        parameter: String,
    },

    #[error("'{name}' not found in {scope}")]
    NotFound { scope: String, name: String },

    #[error("catalog has more {what} than can be indexed")]
    TooLarge { what: &'static str },

    #[error("invalid type '{text}' at offset {offset}: {message}")]
    TypeSyntax {
        text: String,
        offset: usize,
        message: &'static str,
    },
}

impl CatalogError {
    /// Errors that only catalog construction produces.
    ///
    /// `NotFound` and `ArityMismatch` come from both phases: a dangling base
    /// reference or a base applied to the wrong number of type arguments is
    /// reported with the same variants as a failed query.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            CatalogError::Loader(_)
                | CatalogError::DuplicateName { .. }
                | CatalogError::CyclicInheritance { .. }
                | CatalogError::TooLarge { .. }
        )
    }

    /// Errors a resolver is expected to handle as part of normal lookup.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound { .. } | CatalogError::AmbiguousOverload { .. }
        )
    }

    pub(crate) fn not_found(scope: impl Into<String>, name: impl Into<String>) -> Self {
        CatalogError::NotFound {
            scope: scope.into(),
            name: name.into(),
        }
    }
}
