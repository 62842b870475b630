//! Overload Index
//!
//! Member lookup scans a declaration's lookup order front to back and stops
//! at the first entry that defines the name; that entry's same-named
//! members form the [`OverloadSet`]. When the entry is an interface, other
//! interfaces at the same inheritance distance that define the name join
//! the set (identical signatures collapse to the first).
//!
//! Disambiguation against an [`ArgumentHint`]:
//!
//! 1. candidates whose arity range covers the argument count;
//! 2. static languages with argument types: an exact parameter-type match
//!    wins outright, otherwise the unique candidate accepting every argument
//!    (same type, subtype, or implicit conversion) wins. A lone candidate
//!    that accepts none of the arguments is not found;
//! 3. without argument types, or in dynamic languages, a lone candidate of
//!    the right arity wins;
//! 4. more than one survivor is an `AmbiguousOverload` error, except in
//!    dynamic languages, where it is the [`Resolution::Dynamic`] marker.

use crate::arena::{Arity, DeclId, MemberId};
use crate::error::CatalogError;
use crate::generics::BoundView;
use crate::graph::SymbolGraph;
use crate::linearize::Via;
use crate::types::{TypeHead, TypeRef};
use smallvec::SmallVec;
use symcat_common::Atom;
use symcat_common::limits::OVERLOAD_INLINE_CAPACITY;
use symcat_loader::DeclKind;
use tracing::trace;

pub type Candidates = SmallVec<[MemberId; OVERLOAD_INLINE_CAPACITY]>;

/// Same-named members found at one lookup-order position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverloadSet {
    pub name: Atom,
    /// The lookup-order entry that defines the name.
    pub found_in: DeclId,
    pub distance: u32,
    pub members: Candidates,
}

impl OverloadSet {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn narrowed(&self, members: Candidates) -> OverloadSet {
        OverloadSet {
            name: self.name,
            found_in: self.found_in,
            distance: self.distance,
            members,
        }
    }
}

/// What the caller knows about the arguments of a reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ArgumentHint {
    /// Not a call, or nothing is known: return the whole set.
    #[default]
    None,
    /// Only the argument count is known.
    Arity(usize),
    /// The static type of every argument.
    Types(Vec<TypeRef>),
}

impl ArgumentHint {
    pub fn count(&self) -> Option<usize> {
        match self {
            ArgumentHint::None => None,
            ArgumentHint::Arity(count) => Some(*count),
            ArgumentHint::Types(types) => Some(types.len()),
        }
    }
}

/// Result of a member lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Several overloads and no hint to choose between them.
    Set(OverloadSet),
    /// Exactly one member.
    Member(MemberId),
    /// Dynamic language, several overloads with a matching arity: the
    /// binding is deferred to runtime. Holds the remaining candidates.
    Dynamic(OverloadSet),
}

impl Resolution {
    pub fn member(&self) -> Option<MemberId> {
        match self {
            Resolution::Member(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Resolution::Dynamic(_))
    }

    pub fn candidates(&self) -> &[MemberId] {
        match self {
            Resolution::Member(id) => std::slice::from_ref(id),
            Resolution::Set(set) | Resolution::Dynamic(set) => &set.members,
        }
    }
}

/// A member as disambiguation sees it, with signature types already
/// substituted when looking up through a bound view.
struct Candidate {
    id: MemberId,
    arity: Arity,
    params: Vec<TypeRef>,
    variadic: bool,
}

impl Candidate {
    fn param_at(&self, index: usize) -> Option<&TypeRef> {
        match self.params.get(index) {
            Some(ty) => Some(ty),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }
}

fn ids(candidates: &[&Candidate]) -> Candidates {
    candidates.iter().map(|c| c.id).collect()
}

impl SymbolGraph {
    /// The overload set for `name` as seen from `decl`, without any
    /// disambiguation.
    pub fn overload_set(&self, decl: DeclId, name: &str) -> Option<OverloadSet> {
        self.get_declaration(decl)?;
        let name = self.interner().get(name)?;
        self.find_overload_set(decl, name)
    }

    fn find_overload_set(&self, decl: DeclId, name: Atom) -> Option<OverloadSet> {
        let order = self.linearization(decl);
        let (position, first, found) = order.iter().enumerate().find_map(|(i, entry)| {
            self.own_members_named(entry.decl, name)
                .map(|members| (i, entry, members))
        })?;
        let mut set = OverloadSet {
            name,
            found_in: first.decl,
            distance: first.distance,
            members: found.iter().copied().collect(),
        };

        let is_interface = |id: DeclId| self.declaration(id).kind == DeclKind::Interface;
        if first.via != Via::Extension && is_interface(first.decl) {
            for entry in &order[position + 1..] {
                if entry.distance != first.distance
                    || entry.via == Via::Extension
                    || !is_interface(entry.decl)
                {
                    continue;
                }
                let Some(more) = self.own_members_named(entry.decl, name) else {
                    continue;
                };
                for &candidate in more {
                    let duplicate = set.members.iter().any(|&existing| {
                        self.member(existing).same_signature(self.member(candidate))
                    });
                    if !duplicate {
                        set.members.push(candidate);
                    }
                }
            }
        }
        Some(set)
    }

    /// Look up `name` on `decl` and disambiguate with `hint`.
    pub fn lookup_member(
        &self,
        decl: DeclId,
        name: &str,
        hint: &ArgumentHint,
    ) -> Result<Resolution, CatalogError> {
        self.checked_declaration(decl)?;
        let set = self
            .overload_set(decl, name)
            .ok_or_else(|| self.member_not_found(decl, name, None))?;
        let candidates = set
            .members
            .iter()
            .map(|&id| {
                let member = self.member(id);
                Candidate {
                    id,
                    arity: member.arity(),
                    params: member.params.iter().map(|p| p.ty.clone()).collect(),
                    variadic: member.params.last().is_some_and(|p| p.variadic),
                }
            })
            .collect();
        let resolution = self.disambiguate(decl, set, candidates, hint);
        trace!(decl = decl.0, name, ?resolution, "lookup_member");
        resolution
    }

    /// Look up `name` through a bound view: candidate signatures are
    /// substituted with the view's type arguments before disambiguation.
    pub fn lookup_bound_member(
        &self,
        view: &BoundView,
        name: &str,
        hint: &ArgumentHint,
    ) -> Result<Resolution, CatalogError> {
        self.checked_declaration(view.decl)?;
        let set = self
            .overload_set(view.decl, name)
            .ok_or_else(|| self.member_not_found(view.decl, name, None))?;
        let candidates = set
            .members
            .iter()
            .map(|&id| {
                let member = self.member(id);
                Candidate {
                    id,
                    arity: member.arity(),
                    params: self.substituted_signature(view, member).params,
                    variadic: member.params.last().is_some_and(|p| p.variadic),
                }
            })
            .collect();
        self.disambiguate(view.decl, set, candidates, hint)
    }

    fn member_not_found(&self, decl: DeclId, name: &str, arity: Option<usize>) -> CatalogError {
        let name = match arity {
            Some(count) => format!("{name}/{count}"),
            None => name.to_string(),
        };
        CatalogError::not_found(self.scope_name(decl), name)
    }

    fn ambiguous(&self, decl: DeclId, set: &OverloadSet, candidates: Candidates) -> CatalogError {
        CatalogError::AmbiguousOverload {
            declaration: self.display_path(decl),
            member: self.name(set.name).to_string(),
            candidates: candidates.into_vec(),
        }
    }

    fn disambiguate(
        &self,
        decl: DeclId,
        set: OverloadSet,
        candidates: Vec<Candidate>,
        hint: &ArgumentHint,
    ) -> Result<Resolution, CatalogError> {
        let Some(count) = hint.count() else {
            return Ok(match set.members.as_slice() {
                [single] => Resolution::Member(*single),
                _ => Resolution::Set(set),
            });
        };

        let by_arity: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.arity.accepts(count))
            .collect();
        if by_arity.is_empty() {
            return Err(self.member_not_found(decl, self.name(set.name), Some(count)));
        }
        let types = match hint {
            ArgumentHint::Types(types) if !self.policy().is_dynamic() => types,
            _ => {
                return match by_arity.as_slice() {
                    [single] => Ok(Resolution::Member(single.id)),
                    _ if self.policy().is_dynamic() => {
                        Ok(Resolution::Dynamic(set.narrowed(ids(&by_arity))))
                    }
                    _ => Err(self.ambiguous(decl, &set, ids(&by_arity))),
                };
            }
        };

        let exact: Vec<&Candidate> = by_arity
            .iter()
            .copied()
            .filter(|c| {
                types
                    .iter()
                    .enumerate()
                    .all(|(i, arg)| c.param_at(i) == Some(arg))
            })
            .collect();
        match exact.as_slice() {
            [single] => return Ok(Resolution::Member(single.id)),
            [] => {}
            _ => return Err(self.ambiguous(decl, &set, ids(&exact))),
        }

        let eligible: Vec<&Candidate> = by_arity
            .iter()
            .copied()
            .filter(|c| {
                types
                    .iter()
                    .enumerate()
                    .all(|(i, arg)| c.param_at(i).is_some_and(|param| self.accepts(param, arg)))
            })
            .collect();
        match eligible.as_slice() {
            [] => Err(self.member_not_found(decl, self.name(set.name), Some(count))),
            [single] => Ok(Resolution::Member(single.id)),
            _ => Err(self.ambiguous(decl, &set, ids(&eligible))),
        }
    }

    /// Whether an argument of type `arg` may be passed for a parameter of
    /// type `param`: same head, a subtype, or an implicit conversion (to the
    /// parameter type or one of its subtypes). Conversions do not chain.
    pub fn accepts(&self, param: &TypeRef, arg: &TypeRef) -> bool {
        match (param, arg) {
            (TypeRef::Dynamic, _)
            | (_, TypeRef::Dynamic)
            | (TypeRef::Param(_), _)
            | (_, TypeRef::Param(_)) => return true,
            (TypeRef::Void, _) | (_, TypeRef::Void) => return param == arg,
            _ => {}
        }
        let (Some(to), Some(from)) = (param.head(), arg.head()) else {
            return false;
        };
        if self.is_subtype(&from, &to) {
            return true;
        }
        self.conversions_from(&from)
            .iter()
            .any(|target| self.is_subtype(target, &to))
    }

    /// Whether `sub` is `sup` or has it in its lookup order.
    pub fn is_subtype(&self, sub: &TypeHead, sup: &TypeHead) -> bool {
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            (TypeHead::Decl(sub), TypeHead::Decl(sup)) => {
                self.linearization(*sub).iter().any(|entry| entry.decl == *sup)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/overload_tests.rs"]
mod tests;
