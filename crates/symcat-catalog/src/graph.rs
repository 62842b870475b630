//! Symbol Graph
//!
//! The immutable result of catalog construction for one language, and the
//! query surface a resolver uses:
//!
//! - [`SymbolGraph::resolve`]: qualified path to declaration
//! - [`SymbolGraph::lookup_member`]: member lookup with overload
//!   disambiguation (see [`crate::overload`])
//! - [`SymbolGraph::bind`]: generic binding (see [`crate::generics`])
//! - [`SymbolGraph::list_top_level`]: seeds for unqualified global lookup
//!
//! A graph is built in one pass and either fully succeeds or returns the
//! first construction error; nothing is published half-built. All queries
//! take `&self`, and the graph is `Send + Sync`.

use crate::arena::{DeclId, Declaration, Member, MemberId};
use crate::error::CatalogError;
use crate::linearize::{LinearEntry, Linearizer, check_acyclic};
use crate::qualify::{Qualified, Qualifier, ScopeView, TypeContext};
use crate::types::{TypeHead, TypeRef};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use symcat_common::limits::OVERLOAD_INLINE_CAPACITY;
use symcat_common::{Atom, Interner, Language, LanguagePolicy};
use symcat_loader::{DeclKind, LoadedFixture, MemberKind, TypeExpr, embedded, load_fixture};
use tracing::{debug, info, info_span};

type MemberIndex = FxHashMap<Atom, SmallVec<[MemberId; OVERLOAD_INLINE_CAPACITY]>>;

pub struct SymbolGraph {
    language: Language,
    policy: LanguagePolicy,
    interner: Interner,
    decls: Vec<Declaration>,
    members: Vec<Member>,
    imports: Vec<DeclId>,
    extensions: FxHashMap<DeclId, SmallVec<[DeclId; 2]>>,
    conversions: FxHashMap<TypeHead, SmallVec<[TypeHead; 2]>>,
    linearizations: Vec<Vec<LinearEntry>>,
    /// Member table of each declaration by name, including members that
    /// nested functions and constants contribute.
    own_members: Vec<MemberIndex>,
}

impl std::fmt::Debug for SymbolGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolGraph")
            .field("language", &self.language)
            .field("declarations", &self.decls.len())
            .field("members", &self.members.len())
            .finish()
    }
}

impl SymbolGraph {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Build the catalog for a validated fixture.
    pub fn build(fixture: &LoadedFixture) -> Result<Self, CatalogError> {
        let _span = info_span!("build_catalog", language = %fixture.language).entered();

        let Qualified {
            interner,
            decls,
            members,
            imports,
            extensions,
            conversions,
        } = Qualifier::new(fixture).run(fixture)?;

        let separator = fixture.language.policy().path_separator;
        check_acyclic(&decls, &extensions, |id| {
            let decl = &decls[id.index()];
            let view = ScopeView {
                decls: &decls,
                interner: &interner,
                imports: &imports,
                self_name: None,
            };
            if decl.is_extension() {
                format!("extension record '{}'", decl.record)
            } else {
                view.join_path(&decl.path, separator)
            }
        })?;

        let linearizer = Linearizer::new(&decls, &extensions);
        let linearizations: Vec<Vec<LinearEntry>> = decls
            .iter()
            .map(|decl| linearizer.linearize(decl.id))
            .collect();
        debug!(
            entries = linearizations.iter().map(Vec::len).sum::<usize>(),
            "linearized"
        );

        let own_members = decls
            .iter()
            .map(|decl| {
                let mut index = MemberIndex::default();
                for &id in &decl.members {
                    index.entry(members[id.index()].name).or_default().push(id);
                }
                index
            })
            .collect();

        let graph = SymbolGraph {
            language: fixture.language,
            policy: fixture.language.policy(),
            interner,
            decls,
            members,
            imports,
            extensions,
            conversions,
            linearizations,
            own_members,
        };
        info!(
            declarations = graph.decls.len(),
            members = graph.members.len(),
            "catalog built"
        );
        Ok(graph)
    }

    /// Load, validate and build from fixture JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let fixture = load_fixture(json)?;
        Self::build(&fixture)
    }

    /// Build the catalog from a language's embedded fixture.
    ///
    /// Returns `None` when no fixture ships for `language`.
    pub fn embedded(language: Language) -> Option<Result<Self, CatalogError>> {
        embedded::get_fixture(language).map(|fixture| Self::from_json(fixture.content))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn policy(&self) -> LanguagePolicy {
        self.policy
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn name(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    /// # Panics
    /// If `id` does not come from this graph.
    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    pub fn get_declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.index())
    }

    /// `id` as a declaration of this graph. An id taken from another graph
    /// that falls outside this one is `NotFound`.
    pub(crate) fn checked_declaration(&self, id: DeclId) -> Result<&Declaration, CatalogError> {
        self.get_declaration(id).ok_or_else(|| {
            CatalogError::not_found("this catalog", format!("declaration #{}", id.0))
        })
    }

    /// # Panics
    /// If `id` does not come from this graph.
    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    pub fn get_member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.index())
    }

    /// All declarations, the global scope first.
    pub fn declarations(&self) -> &[Declaration] {
        &self.decls
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn imports(&self) -> &[DeclId] {
        &self.imports
    }

    /// Extensions attached to `target`, in declaration order.
    pub fn extensions_of(&self, target: DeclId) -> &[DeclId] {
        self.extensions
            .get(&target)
            .map(|e| e.as_slice())
            .unwrap_or(&[])
    }

    /// Implicit conversion targets of a type head.
    pub fn conversions_from(&self, from: &TypeHead) -> &[TypeHead] {
        self.conversions
            .get(from)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Lookup order of `decl`, nearest first. Empty for an id outside this
    /// graph.
    pub fn linearization(&self, decl: DeclId) -> &[LinearEntry] {
        self.linearizations
            .get(decl.index())
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn own_members_named(&self, decl: DeclId, name: Atom) -> Option<&[MemberId]> {
        self.own_members[decl.index()]
            .get(&name)
            .map(|members| members.as_slice())
    }

    fn scope_view(&self) -> ScopeView<'_> {
        ScopeView {
            decls: &self.decls,
            interner: &self.interner,
            imports: &self.imports,
            self_name: self.interner.get("Self"),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Resolve a qualified path from the global scope.
    ///
    /// Every segment must be lexically nested in the previous one; imports
    /// are not consulted.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Result<DeclId, CatalogError> {
        let mut current = DeclId::ROOT;
        for segment in path {
            let segment = segment.as_ref();
            let next = self
                .interner
                .get(segment)
                .and_then(|atom| self.declaration(current).children.get(&atom).copied());
            current = next.ok_or_else(|| CatalogError::not_found(self.scope_name(current), segment))?;
        }
        if current == DeclId::ROOT {
            return Err(CatalogError::not_found("the global scope", ""));
        }
        Ok(current)
    }

    /// Resolve a qualified name written with any separator
    /// (`System.Console`, `std::vec::Vec`, `\Random\Randomizer`).
    pub fn resolve_qualified(&self, text: &str) -> Result<DeclId, CatalogError> {
        match self.parse_type(text)? {
            TypeExpr::Named { path, args } if args.is_empty() => self.resolve(&path),
            _ => Err(CatalogError::not_found("the global scope", text)),
        }
    }

    /// Resolve a type written as text, as it would be seen from the global
    /// scope with the catalog's imports. Unknown names that never occur in
    /// the catalog are `NotFound`.
    pub fn resolve_type(&self, text: &str) -> Result<TypeRef, CatalogError> {
        let expr = self.parse_type(text)?;
        self.scope_view()
            .resolve_type(&expr, &TypeContext::at(DeclId::ROOT))
    }

    fn parse_type(&self, text: &str) -> Result<TypeExpr, CatalogError> {
        TypeExpr::parse(text).map_err(|err| CatalogError::TypeSyntax {
            text: text.to_string(),
            offset: err.offset,
            message: err.message,
        })
    }

    /// Top-level declarations in declaration order. Extensions are not
    /// listed; they have no name of their own.
    pub fn list_top_level(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.declaration(DeclId::ROOT).children.values().copied()
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// The qualified name joined with the language's separator.
    pub fn display_path(&self, decl: DeclId) -> String {
        let declaration = self.declaration(decl);
        match &declaration.extends {
            Some(target) if declaration.is_extension() => {
                format!("extension {}", self.display_type(target))
            }
            _ => self
                .scope_view()
                .join_path(&declaration.path, self.policy.path_separator),
        }
    }

    pub(crate) fn scope_name(&self, decl: DeclId) -> String {
        if decl == DeclId::ROOT {
            "the global scope".to_string()
        } else {
            format!("'{}'", self.display_path(decl))
        }
    }

    pub fn display_type(&self, ty: &TypeRef) -> String {
        let mut out = String::new();
        self.write_type(ty, &mut out);
        out
    }

    fn write_type(&self, ty: &TypeRef, out: &mut String) {
        let args = match ty {
            TypeRef::Decl { id, args } => {
                out.push_str(&self.display_path(*id));
                args
            }
            TypeRef::Opaque { path, args } => {
                out.push_str(
                    &self
                        .scope_view()
                        .join_path(path, self.policy.path_separator),
                );
                args
            }
            TypeRef::Param(param) => {
                out.push_str(self.name(param.name));
                return;
            }
            TypeRef::Dynamic => {
                out.push('?');
                return;
            }
            TypeRef::Void => {
                out.push_str("void");
                return;
            }
        };
        if !args.is_empty() {
            out.push('<');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_type(arg, out);
            }
            out.push('>');
        }
    }

    /// `Owner.name(param, param...) -> returns`
    pub fn display_member(&self, id: MemberId) -> String {
        let member = self.member(id);
        let owner = self.declaration(member.owner);
        let mut out = if matches!(owner.kind, DeclKind::Function | DeclKind::Constant) {
            self.display_path(member.owner)
        } else {
            format!(
                "{}{}{}",
                self.display_path(member.owner),
                self.policy.path_separator,
                self.name(member.name)
            )
        };
        if !matches!(member.kind, MemberKind::Field | MemberKind::Property) {
            out.push('(');
        }
        for (i, param) in member.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(label) = param.label {
                out.push_str(self.name(label));
                out.push_str(": ");
            }
            self.write_type(&param.ty, &mut out);
            if param.variadic {
                out.push_str("...");
            } else if param.optional {
                out.push('?');
            }
        }
        let is_value = matches!(member.kind, MemberKind::Field | MemberKind::Property);
        if !is_value {
            out.push(')');
        }
        if member.returns != TypeRef::Void {
            out.push_str(if is_value { ": " } else { " -> " });
            self.write_type(&member.returns, &mut out);
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/graph_tests.rs"]
mod tests;
