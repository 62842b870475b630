//! Source languages and their name-resolution policies.
//!
//! A catalog is built per language. The four object models the catalogs
//! reconcile differ in a handful of switches, collected in [`LanguagePolicy`]
//! so that one pipeline serves all of them:
//!
//! | Language | Typing | Partial generic inference | Separator |
//! |----------|--------|---------------------------|-----------|
//! | C#       | static | no                        | `.`       |
//! | Go       | static | yes                       | `.`       |
//! | Rust     | static | yes                       | `::`      |
//! | Swift    | static | yes                       | `.`       |
//! | TypeScript | static | yes                     | `.`       |
//! | PHP      | dynamic | yes                      | `\`       |
//! | Ruby     | dynamic | yes                      | `::`      |
//! | JavaScript | dynamic | yes                    | `.`       |
//! | Python   | dynamic | yes                      | `.`       |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported source languages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Go,
    Php,
    Ruby,
    Rust,
    Swift,
    TypeScript,
    JavaScript,
    Python,
}

/// Whether argument types are statically known at call sites.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Typing {
    /// Nominal or structural static types; overloads are chosen by type.
    Static,
    /// Duck typing; overloads can only be narrowed by arity.
    Dynamic,
}

/// Per-language switches consulted by the catalog pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LanguagePolicy {
    pub typing: Typing,
    /// Whether a generic declaration may be bound with fewer type arguments
    /// than it declares, leaving the rest to call-site inference.
    pub partial_inference: bool,
    /// Separator used when displaying qualified names.
    pub path_separator: &'static str,
}

impl LanguagePolicy {
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.typing == Typing::Dynamic
    }
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::CSharp,
        Language::Go,
        Language::Php,
        Language::Ruby,
        Language::Rust,
        Language::Swift,
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
    ];

    /// Determine language from a source file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "cs" => Some(Self::CSharp),
            "go" => Some(Self::Go),
            "php" => Some(Self::Php),
            "rb" => Some(Self::Ruby),
            "rs" => Some(Self::Rust),
            "swift" => Some(Self::Swift),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "py" | "pyi" => Some(Self::Python),
            _ => None,
        }
    }

    /// Get the canonical lowercase name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::Go => "go",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Rust => "rust",
            Self::Swift => "swift",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
        }
    }

    pub fn policy(&self) -> LanguagePolicy {
        match self {
            Self::CSharp => LanguagePolicy {
                typing: Typing::Static,
                partial_inference: false,
                path_separator: ".",
            },
            Self::Go | Self::Swift | Self::TypeScript => LanguagePolicy {
                typing: Typing::Static,
                partial_inference: true,
                path_separator: ".",
            },
            Self::Rust => LanguagePolicy {
                typing: Typing::Static,
                partial_inference: true,
                path_separator: "::",
            },
            Self::Php => LanguagePolicy {
                typing: Typing::Dynamic,
                partial_inference: true,
                path_separator: "\\",
            },
            Self::Ruby => LanguagePolicy {
                typing: Typing::Dynamic,
                partial_inference: true,
                path_separator: "::",
            },
            Self::JavaScript | Self::Python => LanguagePolicy {
                typing: Typing::Dynamic,
                partial_inference: true,
                path_separator: ".",
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a language name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(Self::CSharp),
            "go" | "golang" => Ok(Self::Go),
            "php" => Ok(Self::Php),
            "ruby" | "rb" => Ok(Self::Ruby),
            "rust" | "rs" => Ok(Self::Rust),
            "swift" => Ok(Self::Swift),
            "typescript" | "ts" => Ok(Self::TypeScript),
            "javascript" | "js" => Ok(Self::JavaScript),
            "python" | "py" => Ok(Self::Python),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "tests/language_tests.rs"]
mod tests;
