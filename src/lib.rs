//! symcat: builtin symbol catalogs for cross-language name resolution.
//!
//! A catalog answers, for one language, the questions a name resolver asks
//! about builtin declarations: what `System.Console` is, which `WriteLine`
//! a call with an `Int32` argument binds to, what `Vec<i32>::get` returns,
//! and in which order Ruby searches `String`'s ancestors.
//!
//! This crate ties the pipeline crates together:
//!
//! - [`symcat_loader`]: fixture records and validation
//! - [`symcat_catalog`]: the [`SymbolGraph`] and its queries
//! - [`catalog_set`]: one graph per language, built in parallel
//! - [`output`]: JSON and DOT renderings of a graph
//! - [`tracing_config`]: subscriber setup for binaries
//!
//! ```rust
//! use symcat::{ArgumentHint, CatalogSet, Language};
//!
//! let set = CatalogSet::embedded([Language::Ruby]);
//! let graph = set.graph(Language::Ruby).expect("ruby catalog builds");
//! let string = set.resolve(Language::Ruby, &["String"]).unwrap();
//! let puts = graph
//!     .lookup_member(string, "puts", &ArgumentHint::Arity(1))
//!     .unwrap();
//! let owner = graph.member(puts.member().unwrap()).owner;
//! assert_eq!(graph.display_path(owner), "Kernel");
//! ```

pub mod catalog_set;
pub mod output;
pub mod tracing_config;

pub use catalog_set::{BuildFailure, CatalogSet, FixtureSource};
pub use symcat_catalog::{
    ArgumentHint, BoundView, CatalogError, DeclId, Declaration, LinearEntry, Member, MemberId,
    OverloadSet, Resolution, SymbolGraph, TypeRef, Via,
};
pub use symcat_common::{Language, LanguagePolicy};
pub use symcat_loader::LoaderError;
