//! Common types and utilities for the symcat builtin symbol catalogs.
//!
//! This crate provides foundational types used across all symcat crates:
//! - String interning (`Atom`, `Interner`)
//! - Source languages and their resolution policies (`Language`, `LanguagePolicy`)
//! - Catalog construction limits and thresholds

// String interning for declaration and member names
pub mod interner;
pub use interner::{Atom, Interner};

// Languages - one catalog is built per language
pub mod language;
pub use language::{Language, LanguagePolicy, Typing, UnknownLanguage};

// Centralized limits and thresholds
pub mod limits;
