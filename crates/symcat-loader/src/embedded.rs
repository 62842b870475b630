//! Embedded Builtin Fixtures
//!
//! The builtin declaration fixtures for each supported language are embedded
//! into the binary with `include_str!`, so a catalog can be built without any
//! files on disk. Each fixture is the record form of that language's standard
//! library stubs (core value types, collections, I/O, errors).
//!
//! # Usage
//!
//! ```rust
//! use symcat_common::Language;
//! use symcat_loader::embedded::{get_fixture, load_embedded};
//!
//! let fixture = get_fixture(Language::Ruby).expect("ruby fixture is embedded");
//! assert_eq!(fixture.file_name, "ruby.json");
//!
//! let loaded = load_embedded(Language::Ruby).expect("ruby fixture is embedded");
//! assert!(loaded.is_ok());
//! ```

use crate::error::LoaderError;
use crate::loader::{LoadedFixture, load_fixture};
use symcat_common::Language;

/// An embedded fixture file.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFixture {
    pub language: Language,
    /// The file name (e.g., "swift.json")
    pub file_name: &'static str,
    /// The file content
    pub content: &'static str,
}

/// C#: `System` namespaces, nominal classes, generic interfaces, overloads.
pub const FIXTURE_CSHARP: EmbeddedFixture = EmbeddedFixture {
    language: Language::CSharp,
    file_name: "csharp.json",
    content: include_str!("../fixtures/csharp.json"),
};

/// Go: universe types, packages, receiver methods attached as extensions.
pub const FIXTURE_GO: EmbeddedFixture = EmbeddedFixture {
    language: Language::Go,
    file_name: "go.json",
    content: include_str!("../fixtures/go.json"),
};

/// PHP: interfaces, exception hierarchy, global functions.
pub const FIXTURE_PHP: EmbeddedFixture = EmbeddedFixture {
    language: Language::Php,
    file_name: "php.json",
    content: include_str!("../fixtures/php.json"),
};

/// Ruby: classes composed through `include`d modules.
pub const FIXTURE_RUBY: EmbeddedFixture = EmbeddedFixture {
    language: Language::Ruby,
    file_name: "ruby.json",
    content: include_str!("../fixtures/ruby.json"),
};

/// Rust: std structs and enums, traits, `impl` blocks as extensions.
pub const FIXTURE_RUST: EmbeddedFixture = EmbeddedFixture {
    language: Language::Rust,
    file_name: "rust.json",
    content: include_str!("../fixtures/rust.json"),
};

/// Swift: protocol-oriented value types and protocol extensions.
pub const FIXTURE_SWIFT: EmbeddedFixture = EmbeddedFixture {
    language: Language::Swift,
    file_name: "swift.json",
    content: include_str!("../fixtures/swift.json"),
};

/// TypeScript: global interfaces and generic collections.
pub const FIXTURE_TYPESCRIPT: EmbeddedFixture = EmbeddedFixture {
    language: Language::TypeScript,
    file_name: "typescript.json",
    content: include_str!("../fixtures/typescript.json"),
};

/// All embedded fixtures, in `Language` order.
pub const ALL_FIXTURES: &[EmbeddedFixture] = &[
    FIXTURE_CSHARP,
    FIXTURE_GO,
    FIXTURE_PHP,
    FIXTURE_RUBY,
    FIXTURE_RUST,
    FIXTURE_SWIFT,
    FIXTURE_TYPESCRIPT,
];

/// Get the embedded fixture for a language, if one ships with the crate.
pub fn get_fixture(language: Language) -> Option<&'static EmbeddedFixture> {
    ALL_FIXTURES.iter().find(|f| f.language == language)
}

/// Languages that have an embedded fixture.
pub fn embedded_languages() -> impl Iterator<Item = Language> {
    ALL_FIXTURES.iter().map(|f| f.language)
}

/// Parse and validate the embedded fixture for a language.
///
/// Returns `None` when no fixture is embedded for `language`.
pub fn load_embedded(language: Language) -> Option<Result<LoadedFixture, LoaderError>> {
    get_fixture(language).map(|fixture| load_fixture(fixture.content))
}
