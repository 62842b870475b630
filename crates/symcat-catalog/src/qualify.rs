//! Qualifier Resolver
//!
//! Assigns every declaration its canonical qualified name and resolves the
//! names used inside records:
//!
//! - **Declaring**: records are placed into the scope tree in declaration
//!   order. Sibling namespaces with the same name merge, dotted namespace
//!   names expand into nested namespaces, and any other sibling collision is
//!   a `DuplicateName` error. Extension records get no name; they are kept
//!   aside and attached to their target later.
//! - **Scope lookup**: a path is searched in the enclosing scope chain
//!   (innermost first, an extension's target scope right after the
//!   extension), then from the root, then in each import. When the final
//!   segment must denote a type, namespaces, functions and constants are
//!   skipped and the search continues outward, so `str` inside Rust's `std`
//!   still finds the primitive `str` rather than the `std::str` module.
//! - **Type resolution**: single-segment names are tried as generic
//!   parameters first (member generics, then enclosing declarations, then an
//!   extension's target, then the implicit `Self`). Names that denote no
//!   declaration become opaque references; only base references and
//!   extension targets are required to resolve.

use crate::arena::{Arity, BaseRef, DeclId, Declaration, Member, MemberId, Param};
use crate::error::CatalogError;
use crate::types::{GenericParam, ParamOwner, TypeHead, TypeRef};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use symcat_common::{Atom, Interner, Language};
use symcat_loader::{DeclKind, DeclarationDef, LoadedFixture, LoaderError, MemberDef, MemberKind, TypeExpr};
use tracing::{debug, trace};

/// Where a type expression is being resolved.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TypeContext<'a> {
    /// The innermost declaration; lookup starts in its scope.
    pub decl: DeclId,
    /// The member being resolved and its own generic parameters.
    pub member: Option<(MemberId, &'a [Atom])>,
}

impl TypeContext<'_> {
    pub(crate) fn at(decl: DeclId) -> Self {
        TypeContext { decl, member: None }
    }
}

/// Read-only name lookup over a (possibly partially built) declaration arena.
pub(crate) struct ScopeView<'a> {
    pub decls: &'a [Declaration],
    pub interner: &'a Interner,
    pub imports: &'a [DeclId],
    pub self_name: Option<Atom>,
}

impl<'a> ScopeView<'a> {
    fn decl(&self, id: DeclId) -> &'a Declaration {
        &self.decls[id.index()]
    }

    /// Enclosing scopes of `from`, innermost first, ending at the root.
    pub(crate) fn scope_chain(&self, from: DeclId) -> SmallVec<[DeclId; 8]> {
        let mut chain = SmallVec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            chain.push(id);
            let decl = self.decl(id);
            if let Some(target) = decl.extension_target() {
                chain.push(target);
            }
            current = decl.parent;
        }
        chain
    }

    /// Follow `path` strictly through nested scopes starting at `scope`.
    fn descend(&self, scope: DeclId, path: &[Atom], want_type: bool) -> Option<DeclId> {
        let mut current = scope;
        for segment in path {
            current = *self.decl(current).children.get(segment)?;
        }
        (!want_type || self.decl(current).is_type()).then_some(current)
    }

    /// Look up a (possibly qualified) name as seen from `from`.
    pub(crate) fn lookup_path(
        &self,
        from: DeclId,
        path: &[String],
        want_type: bool,
    ) -> Option<DeclId> {
        let atoms: SmallVec<[Atom; 4]> = path
            .iter()
            .map(|segment| self.interner.get(segment))
            .collect::<Option<_>>()?;
        if atoms.is_empty() {
            return None;
        }
        self.scope_chain(from)
            .into_iter()
            .chain(self.imports.iter().copied())
            .find_map(|scope| self.descend(scope, &atoms, want_type))
    }

    /// The declaration `Self` denotes inside `decl`, if any.
    pub(crate) fn self_owner(&self, decl: DeclId) -> Option<DeclId> {
        let mut current = Some(decl);
        while let Some(id) = current {
            let d = self.decl(id);
            if let Some(target) = d.extension_target() {
                return Some(target);
            }
            if d.is_type() {
                return Some(id);
            }
            current = d.parent;
        }
        None
    }

    fn generic_param(&self, name: Atom, ctx: &TypeContext<'_>) -> Option<GenericParam> {
        if let Some((member, generics)) = ctx.member {
            if generics.contains(&name) {
                return Some(GenericParam {
                    owner: ParamOwner::Member(member),
                    name,
                });
            }
        }
        let mut current = Some(ctx.decl);
        while let Some(id) = current {
            let decl = self.decl(id);
            if decl.generics.contains(&name) {
                return Some(GenericParam {
                    owner: ParamOwner::Decl(id),
                    name,
                });
            }
            if let Some(target) = decl.extension_target() {
                if self.decl(target).generics.contains(&name) {
                    return Some(GenericParam {
                        owner: ParamOwner::Decl(target),
                        name,
                    });
                }
            }
            current = decl.parent;
        }
        if Some(name) == self.self_name {
            return self.self_owner(ctx.decl).map(|owner| GenericParam {
                owner: ParamOwner::Decl(owner),
                name,
            });
        }
        None
    }

    /// Resolve a type expression.
    ///
    /// Fails only when a name was never interned, which cannot happen for
    /// names taken from the fixture the catalog was built from.
    pub(crate) fn resolve_type(
        &self,
        expr: &TypeExpr,
        ctx: &TypeContext<'_>,
    ) -> Result<TypeRef, CatalogError> {
        let (path, args) = match expr {
            TypeExpr::Dynamic => return Ok(TypeRef::Dynamic),
            TypeExpr::Named { path, args } => (path, args),
        };
        let args = args
            .iter()
            .map(|arg| self.resolve_type(arg, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        if let [single] = path.as_slice() {
            if args.is_empty() {
                if let Some(param) = self
                    .interner
                    .get(single)
                    .and_then(|name| self.generic_param(name, ctx))
                {
                    return Ok(TypeRef::Param(param));
                }
            }
        }

        if let Some(id) = self.lookup_path(ctx.decl, path, true) {
            return Ok(TypeRef::Decl { id, args });
        }
        let path = path
            .iter()
            .map(|segment| {
                self.interner
                    .get(segment)
                    .ok_or_else(|| CatalogError::not_found("this catalog", segment.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypeRef::Opaque { path, args })
    }

    /// Human-readable name of a scope for error messages.
    pub(crate) fn scope_name(&self, id: DeclId, separator: &str) -> String {
        let decl = self.decl(id);
        if id == DeclId::ROOT {
            "the global scope".to_string()
        } else if decl.is_extension() {
            format!("extension record '{}'", decl.record)
        } else {
            format!("'{}'", self.join_path(&decl.path, separator))
        }
    }

    pub(crate) fn join_path(&self, path: &[Atom], separator: &str) -> String {
        let mut out = String::new();
        for (i, &atom) in path.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(self.interner.resolve(atom));
        }
        out
    }
}

/// Intern every identifier a fixture mentions, so that resolution can run
/// over an immutable interner.
fn intern_fixture(interner: &mut Interner, fixture: &LoadedFixture) {
    fn intern_type(interner: &mut Interner, expr: &TypeExpr) {
        if let TypeExpr::Named { path, args } = expr {
            for segment in path {
                interner.intern(segment);
            }
            for arg in args {
                intern_type(interner, arg);
            }
        }
    }
    fn intern_member(interner: &mut Interner, member: &MemberDef) {
        interner.intern(&member.name);
        for generic in &member.generics {
            interner.intern(generic);
        }
        for param in &member.params {
            if let Some(label) = &param.label {
                interner.intern(label);
            }
            intern_type(interner, &param.ty);
        }
        if let Some(returns) = &member.returns {
            intern_type(interner, returns);
        }
    }
    fn intern_decl(interner: &mut Interner, def: &DeclarationDef) {
        for segment in &def.name {
            interner.intern(segment);
        }
        for generic in &def.generics {
            interner.intern(generic);
        }
        for base in &def.bases {
            intern_type(interner, &base.target);
        }
        if let Some(target) = &def.extension_target {
            intern_type(interner, target);
        }
        for member in &def.members {
            intern_member(interner, member);
        }
        for nested in &def.nested {
            intern_decl(interner, nested);
        }
    }

    interner.intern_common();
    for import in &fixture.imports {
        for segment in import {
            interner.intern(segment);
        }
    }
    for (from, to) in &fixture.conversions {
        intern_type(interner, from);
        intern_type(interner, to);
    }
    for def in &fixture.declarations {
        intern_decl(interner, def);
    }
}

/// Output of qualifier resolution, consumed by the linearizer.
pub(crate) struct Qualified {
    pub interner: Interner,
    pub decls: Vec<Declaration>,
    pub members: Vec<Member>,
    pub imports: Vec<DeclId>,
    /// Extension declarations attached to each target, in declaration order.
    pub extensions: FxHashMap<DeclId, SmallVec<[DeclId; 2]>>,
    pub conversions: FxHashMap<TypeHead, SmallVec<[TypeHead; 2]>>,
}

pub(crate) struct Qualifier<'f> {
    language: Language,
    interner: Interner,
    decls: Vec<Declaration>,
    members: Vec<Member>,
    /// Record each declaration came from; `None` for namespaces and the root.
    defs: Vec<Option<&'f DeclarationDef>>,
    extensions: Vec<DeclId>,
    imports: Vec<DeclId>,
}

impl<'f> Qualifier<'f> {
    pub(crate) fn new(fixture: &LoadedFixture) -> Self {
        let mut interner = Interner::new();
        intern_fixture(&mut interner, fixture);
        let root = Declaration {
            id: DeclId::ROOT,
            kind: DeclKind::Namespace,
            name: Atom::NONE,
            path: Vec::new(),
            parent: None,
            generics: Vec::new(),
            members: Vec::new(),
            bases: Vec::new(),
            extends: None,
            children: IndexMap::new(),
            record: String::new(),
        };
        Qualifier {
            language: fixture.language,
            interner,
            decls: vec![root],
            members: Vec::new(),
            defs: vec![None],
            extensions: Vec::new(),
            imports: Vec::new(),
        }
    }

    fn view(&self) -> ScopeView<'_> {
        ScopeView {
            decls: &self.decls,
            interner: &self.interner,
            imports: &self.imports,
            self_name: self.interner.get("Self"),
        }
    }

    fn separator(&self) -> &'static str {
        self.language.policy().path_separator
    }

    /// Run every resolution phase over `fixture`.
    pub(crate) fn run(mut self, fixture: &'f LoadedFixture) -> Result<Qualified, CatalogError> {
        for def in &fixture.declarations {
            self.declare(def, DeclId::ROOT)?;
        }
        debug!(
            declarations = self.decls.len(),
            extensions = self.extensions.len(),
            "declared"
        );

        self.resolve_imports(&fixture.imports)?;
        self.resolve_extension_targets()?;
        self.resolve_bases()?;
        self.resolve_members()?;
        let conversions = self.resolve_conversions(&fixture.conversions)?;
        debug!(
            members = self.members.len(),
            imports = self.imports.len(),
            "resolved names"
        );

        let mut extensions: FxHashMap<DeclId, SmallVec<[DeclId; 2]>> = FxHashMap::default();
        for &ext in &self.extensions {
            if let Some(target) = self.decls[ext.index()].extension_target() {
                extensions.entry(target).or_default().push(ext);
            }
        }

        Ok(Qualified {
            interner: self.interner,
            decls: self.decls,
            members: self.members,
            imports: self.imports,
            extensions,
            conversions,
        })
    }

    // =========================================================================
    // Declaring
    // =========================================================================

    fn alloc(
        &mut self,
        kind: DeclKind,
        name: Atom,
        parent: DeclId,
        def: Option<&'f DeclarationDef>,
        record: &str,
    ) -> Result<DeclId, CatalogError> {
        let id = DeclId::from_index(self.decls.len())?;
        let parent_decl = &mut self.decls[parent.index()];
        let mut path = parent_decl.path.clone();
        if !name.is_none() {
            path.push(name);
            parent_decl.children.insert(name, id);
        }
        let generics = def
            .map(|def| def.generics.iter().map(|g| self.interner.intern(g)).collect())
            .unwrap_or_default();
        self.decls.push(Declaration {
            id,
            kind,
            name,
            path,
            parent: Some(parent),
            generics,
            members: Vec::new(),
            bases: Vec::new(),
            extends: None,
            children: IndexMap::new(),
            record: record.to_string(),
        });
        self.defs.push(def);
        Ok(id)
    }

    fn duplicate(&self, scope: DeclId, name: Atom) -> CatalogError {
        CatalogError::DuplicateName {
            scope: self.view().scope_name(scope, self.separator()),
            name: self.interner.resolve(name).to_string(),
        }
    }

    fn declare(&mut self, def: &'f DeclarationDef, parent: DeclId) -> Result<(), CatalogError> {
        match def.kind {
            DeclKind::Namespace => {
                let mut scope = parent;
                for segment in &def.name {
                    let name = self.interner.intern(segment);
                    scope = match self.decls[scope.index()].children.get(&name).copied() {
                        Some(existing)
                            if self.decls[existing.index()].kind == DeclKind::Namespace =>
                        {
                            existing
                        }
                        Some(_) => return Err(self.duplicate(scope, name)),
                        None => self.alloc(DeclKind::Namespace, name, scope, None, &def.record)?,
                    };
                }
                for nested in &def.nested {
                    self.declare(nested, scope)?;
                }
            }
            DeclKind::Extension => {
                let id = self.alloc(DeclKind::Extension, Atom::NONE, parent, Some(def), &def.record)?;
                self.extensions.push(id);
            }
            kind => {
                let Some(local) = def.name.first() else {
                    return Err(LoaderError::MissingField {
                        record: def.record.clone(),
                        field: "name",
                    }
                    .into());
                };
                let name = self.interner.intern(local);
                if self.decls[parent.index()].children.contains_key(&name) {
                    return Err(self.duplicate(parent, name));
                }
                let id = self.alloc(kind, name, parent, Some(def), &def.record)?;
                for nested in &def.nested {
                    self.declare(nested, id)?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Imports, extension targets, bases
    // =========================================================================

    fn resolve_imports(&mut self, imports: &[Vec<String>]) -> Result<(), CatalogError> {
        let mut resolved = Vec::with_capacity(imports.len());
        for path in imports {
            let view = self.view();
            let atoms: Option<Vec<Atom>> = path.iter().map(|s| self.interner.get(s)).collect();
            let found = atoms.and_then(|atoms| {
                let mut current = DeclId::ROOT;
                for atom in &atoms {
                    current = *view.decls[current.index()].children.get(atom)?;
                }
                Some(current)
            });
            match found {
                Some(id) => resolved.push(id),
                None => {
                    return Err(CatalogError::not_found(
                        "the imports",
                        path.join(self.separator()),
                    ));
                }
            }
        }
        self.imports = resolved;
        Ok(())
    }

    /// Resolve a base or extension target: the head must name a type, the
    /// arguments must match its generic arity unless the reference is raw.
    fn resolve_applied(
        &self,
        expr: &TypeExpr,
        lookup_from: DeclId,
        ctx: DeclId,
        field: &str,
    ) -> Result<(DeclId, Vec<TypeRef>), CatalogError> {
        let view = self.view();
        let record = &self.decls[ctx.index()].record;
        let (path, args) = match expr {
            TypeExpr::Named { path, args } => (path, args),
            TypeExpr::Dynamic => {
                return Err(CatalogError::not_found(
                    format!("{field} of '{record}'"),
                    "?",
                ));
            }
        };
        let target = view
            .lookup_path(lookup_from, path, true)
            .ok_or_else(|| CatalogError::not_found(format!("{field} of '{record}'"), expr.to_string()))?;
        let args = args
            .iter()
            .map(|arg| view.resolve_type(arg, &TypeContext::at(ctx)))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = self.decls[target.index()].generics.len();
        if !args.is_empty() && args.len() != expected {
            return Err(CatalogError::ArityMismatch {
                declaration: view.join_path(&self.decls[target.index()].path, self.separator()),
                expected,
                supplied: args.len(),
            });
        }
        Ok((target, args))
    }

    fn resolve_extension_targets(&mut self) -> Result<(), CatalogError> {
        for i in 0..self.extensions.len() {
            let ext = self.extensions[i];
            let Some(def) = self.defs[ext.index()] else {
                continue;
            };
            let Some(expr) = &def.extension_target else {
                return Err(LoaderError::MissingField {
                    record: def.record.clone(),
                    field: "extends",
                }
                .into());
            };
            let parent = self.decls[ext.index()].parent.unwrap_or(DeclId::ROOT);
            let (id, args) = self.resolve_applied(expr, parent, ext, "extension target")?;
            trace!(record = %def.record, target = id.0, "attached extension");
            self.decls[ext.index()].extends = Some(TypeRef::Decl { id, args });
        }
        Ok(())
    }

    fn resolve_bases(&mut self) -> Result<(), CatalogError> {
        for index in 0..self.decls.len() {
            let Some(def) = self.defs[index] else {
                continue;
            };
            if def.bases.is_empty() {
                continue;
            }
            let id = DeclId::from_index(index)?;
            let parent = self.decls[index].parent.unwrap_or(DeclId::ROOT);
            let mut bases = Vec::with_capacity(def.bases.len());
            for base in &def.bases {
                let (target, args) = self.resolve_applied(&base.target, parent, id, "bases")?;
                bases.push(BaseRef {
                    relation: base.relation,
                    target,
                    args,
                });
            }
            self.decls[index].bases = bases;
        }
        Ok(())
    }

    // =========================================================================
    // Members and conversions
    // =========================================================================

    fn resolve_member(&self, def: &MemberDef, owner: DeclId, id: MemberId) -> Result<Member, CatalogError> {
        let view = self.view();
        let generics: Vec<Atom> = def
            .generics
            .iter()
            .map(|g| self.interner.get(g).unwrap_or(Atom::NONE))
            .collect();
        let ctx = TypeContext {
            decl: owner,
            member: Some((id, generics.as_slice())),
        };
        let params = def
            .params
            .iter()
            .map(|param| {
                Ok(Param {
                    label: param.label.as_deref().and_then(|l| self.interner.get(l)),
                    ty: view.resolve_type(&param.ty, &ctx)?,
                    optional: param.optional,
                    variadic: param.variadic,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        let returns = match &def.returns {
            Some(expr) => view.resolve_type(expr, &ctx)?,
            None if def.kind == MemberKind::Constructor => match view.self_owner(owner) {
                Some(target) => {
                    let target_decl = &self.decls[target.index()];
                    TypeRef::Decl {
                        id: target,
                        args: target_decl
                            .generics
                            .iter()
                            .map(|&name| {
                                TypeRef::Param(GenericParam {
                                    owner: ParamOwner::Decl(target),
                                    name,
                                })
                            })
                            .collect(),
                    }
                }
                None => TypeRef::Void,
            },
            None => TypeRef::Void,
        };
        Ok(Member {
            id,
            owner,
            name: self.interner.get(&def.name).unwrap_or(Atom::NONE),
            kind: def.kind,
            params,
            returns,
            modifiers: def.modifiers,
            generics,
        })
    }

    fn resolve_members(&mut self) -> Result<(), CatalogError> {
        for index in 0..self.decls.len() {
            let Some(def) = self.defs[index] else {
                continue;
            };
            let owner = DeclId::from_index(index)?;
            let mut ids = Vec::with_capacity(def.members.len());
            for member_def in &def.members {
                let id = MemberId::from_index(self.members.len())?;
                let member = self.resolve_member(member_def, owner, id)?;
                self.members.push(member);
                ids.push(id);
            }
            let decl = &mut self.decls[index];
            decl.members.extend_from_slice(&ids);
            if matches!(decl.kind, DeclKind::Function | DeclKind::Constant) {
                if let Some(parent) = decl.parent {
                    self.decls[parent.index()].members.extend_from_slice(&ids);
                }
            }
        }
        self.check_duplicate_members()
    }

    /// Reject two members of one member table that share name, kind, arity
    /// and resolved parameter types. Spellings that resolve to the same
    /// declaration collide, and so do a member and a nested function.
    fn check_duplicate_members(&self) -> Result<(), CatalogError> {
        for decl in &self.decls {
            let mut seen: FxHashSet<(Atom, MemberKind, Arity, Vec<&TypeRef>)> =
                FxHashSet::default();
            for &id in &decl.members {
                let member = &self.members[id.index()];
                let key = (
                    member.name,
                    member.kind,
                    member.arity(),
                    member.params.iter().map(|p| &p.ty).collect::<Vec<_>>(),
                );
                if !seen.insert(key) {
                    return Err(LoaderError::DuplicateMember {
                        record: self.decls[member.owner.index()].record.clone(),
                        member: self.interner.resolve(member.name).to_string(),
                        kind: member.kind.as_str(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn resolve_conversions(
        &self,
        conversions: &[(TypeExpr, TypeExpr)],
    ) -> Result<FxHashMap<TypeHead, SmallVec<[TypeHead; 2]>>, CatalogError> {
        let view = self.view();
        let ctx = TypeContext::at(DeclId::ROOT);
        let mut table: FxHashMap<TypeHead, SmallVec<[TypeHead; 2]>> = FxHashMap::default();
        for (from, to) in conversions {
            let from_ty = view.resolve_type(from, &ctx)?;
            let to_ty = view.resolve_type(to, &ctx)?;
            match (from_ty.head(), to_ty.head()) {
                (Some(from_head), Some(to_head)) => {
                    let targets = table.entry(from_head).or_default();
                    if !targets.contains(&to_head) {
                        targets.push(to_head);
                    }
                }
                _ => trace!(%from, %to, "skipping conversion without a nominal type"),
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
#[path = "tests/qualify_tests.rs"]
mod tests;
