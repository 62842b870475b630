//! Loader errors.
//!
//! Every error names the offending record by its record path: the names of
//! the enclosing records joined with `.`, or `#<index>` for a record without
//! a usable name.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    /// The fixture is not valid JSON or does not match the record schema.
    #[error("malformed fixture: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("record '{record}' is missing required field '{field}'")]
    MissingField { record: String, field: &'static str },

    #[error("record '{record}' has invalid field '{field}': {reason}")]
    InvalidField {
        record: String,
        field: &'static str,
        reason: String,
    },

    #[error("record '{record}' declares {kind} '{member}' twice with the same signature")]
    DuplicateMember {
        record: String,
        member: String,
        kind: &'static str,
    },

    #[error("record '{record}' field '{field}': invalid type '{text}' at offset {offset}: {message}")]
    TypeSyntax {
        record: String,
        field: &'static str,
        text: String,
        offset: usize,
        message: &'static str,
    },
}

impl LoaderError {
    /// Path of the record the error refers to, when there is one.
    pub fn record(&self) -> Option<&str> {
        match self {
            LoaderError::Malformed(_) => None,
            LoaderError::MissingField { record, .. }
            | LoaderError::InvalidField { record, .. }
            | LoaderError::DuplicateMember { record, .. }
            | LoaderError::TypeSyntax { record, .. } => Some(record),
        }
    }

    pub(crate) fn invalid(record: &str, field: &'static str, reason: impl Into<String>) -> Self {
        LoaderError::InvalidField {
            record: record.to_string(),
            field,
            reason: reason.into(),
        }
    }
}
