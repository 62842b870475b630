//! Builtin symbol catalog construction and queries.
//!
//! Turns a validated fixture (see `symcat-loader`) into an immutable
//! [`SymbolGraph`]:
//!
//! - `qualify`: qualified names, namespace merging, scope lookup, type
//!   resolution, extension attachment
//! - [`linearize`]: cycle detection and per-declaration lookup orders
//! - [`overload`]: overload sets and call disambiguation
//! - [`generics`]: non-destructive generic binding
//! - [`graph`]: the query surface
//!
//! ```rust
//! use symcat_catalog::{ArgumentHint, SymbolGraph};
//! use symcat_common::Language;
//!
//! let graph = SymbolGraph::embedded(Language::CSharp)
//!     .expect("C# fixture is embedded")
//!     .expect("C# fixture builds");
//! let console = graph.resolve(&["System", "Console"]).unwrap();
//! let int32 = graph.resolve_type("System.Int32").unwrap();
//! let resolution = graph
//!     .lookup_member(console, "WriteLine", &ArgumentHint::Types(vec![int32]))
//!     .unwrap();
//! assert!(resolution.member().is_some());
//! ```

pub mod arena;
pub mod error;
pub mod generics;
pub mod graph;
pub mod linearize;
pub mod overload;
pub(crate) mod qualify;
pub mod types;

pub use arena::{Arity, BaseRef, DeclId, Declaration, Member, MemberId, Param};
pub use error::CatalogError;
pub use generics::{BoundView, Signature, Substitution};
pub use graph::SymbolGraph;
pub use linearize::{LinearEntry, Via};
pub use overload::{ArgumentHint, Candidates, OverloadSet, Resolution};
pub use types::{GenericParam, ParamOwner, TypeHead, TypeRef};
