//! Centralized limits and thresholds for catalog construction and queries.
//!
//! Builtin fixtures are small, so these limits exist to turn malformed or
//! adversarial input into a typed error instead of a stack overflow. They
//! are never expected to trigger on real standard-library stubs.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of lexically nested declarations.
///
/// Namespaces such as `System.Text.RegularExpressions` nest three or four
/// levels deep; anything beyond this is rejected by the loader.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Maximum nesting depth of generic arguments inside one type expression.
///
/// ```text
/// Dictionary<String, List<Task<Int32>>>   // depth 3
/// ```
pub const MAX_TYPE_EXPR_DEPTH: usize = 32;

/// Maximum depth of transitive generic substitution.
///
/// A parameter bound to a type that mentions another parameter of the same
/// declaration is expanded transitively. Self reference is reported as
/// `RecursiveGenericError`; this bound caps legitimate expansion.
pub const MAX_SUBSTITUTION_DEPTH: usize = 64;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Inline capacity for overload candidate lists.
///
/// Most builtin members have one to three overloads (`init` on Swift's
/// `String` has four).
pub const OVERLOAD_INLINE_CAPACITY: usize = 4;
