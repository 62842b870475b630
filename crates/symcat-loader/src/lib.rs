//! Declaration Loader for symcat.
//!
//! Ingests one ordered sequence of declaration records per language and
//! validates each record's shape against its kind. The output is an
//! in-memory list of [`DeclarationDef`]s; no name or type is interpreted
//! here.
//!
//! - [`records`]: the raw JSON schema (serde)
//! - [`type_expr`]: the type-string syntax used inside records
//! - [`loader`]: validation
//! - [`embedded`]: builtin fixtures shipped with the crate

pub mod embedded;
pub mod error;
pub mod loader;
pub mod records;
pub mod type_expr;

pub use error::LoaderError;
pub use loader::{
    BaseDef, DeclarationDef, LoadedFixture, MemberDef, ParamDef, load_fixture, load_records,
    parse_fixture, validate_fixture,
};
pub use records::{
    BaseRecord, BaseRelation, DeclKind, DeclarationRecord, FixtureRecord, MemberKind, Modifier,
    Modifiers,
};
pub use type_expr::{TypeExpr, TypeSyntaxError};
