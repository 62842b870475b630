//! Generic Binder
//!
//! `bind(D, args)` produces a [`BoundView`]: the declaration plus a
//! substitution of its generic parameters. The declaration itself is never
//! touched, so one generic declaration can be bound to different argument
//! lists from any number of threads.
//!
//! A view also carries the substitution of every declaration in `D`'s
//! lookup order, composed through base references and extension targets:
//! binding `List<T>` to `[Int32]` maps `IList<T>`'s `T`, `IEnumerable<T>`'s
//! `T` and the `TSource` of an extension on `IEnumerable<TSource>` to
//! `Int32`, and maps every `Self` to `List<Int32>`.

use crate::arena::{DeclId, Member, MemberId};
use crate::error::CatalogError;
use crate::graph::SymbolGraph;
use crate::types::{GenericParam, ParamOwner, TypeRef};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use symcat_common::limits::MAX_SUBSTITUTION_DEPTH;
use tracing::trace;

/// A mapping from generic parameters to types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    map: FxHashMap<GenericParam, TypeRef>,
}

impl Substitution {
    pub fn get(&self, param: &GenericParam) -> Option<&TypeRef> {
        self.map.get(param)
    }

    pub fn insert(&mut self, param: GenericParam, ty: TypeRef) {
        self.map.insert(param, ty);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Replace every mapped parameter in `ty`. Unmapped parameters stay open.
    pub fn apply(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Param(param) => self.map.get(param).cloned().unwrap_or_else(|| ty.clone()),
            TypeRef::Decl { id, args } => TypeRef::Decl {
                id: *id,
                args: args.iter().map(|arg| self.apply(arg)).collect(),
            },
            TypeRef::Opaque { path, args } => TypeRef::Opaque {
                path: path.clone(),
                args: args.iter().map(|arg| self.apply(arg)).collect(),
            },
            TypeRef::Dynamic | TypeRef::Void => ty.clone(),
        }
    }
}

/// A generic declaration with (some of) its parameters bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundView {
    pub decl: DeclId,
    /// One entry per declared parameter; `None` when left open for
    /// call-site inference.
    pub args: Vec<Option<TypeRef>>,
    /// Substitution per declaration of the lookup order, keyed by the
    /// declaration that owns the parameters.
    lineage: FxHashMap<DeclId, Substitution>,
}

impl BoundView {
    pub fn is_fully_bound(&self) -> bool {
        self.args.iter().all(Option::is_some)
    }

    /// Substitution that applies to members declared by `owner`.
    pub fn substitution_for(&self, owner: DeclId) -> Option<&Substitution> {
        self.lineage.get(&owner)
    }

    /// The substitution of the bound declaration's own parameters.
    pub fn substitution(&self) -> Option<&Substitution> {
        self.lineage.get(&self.decl)
    }
}

/// A member signature after substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
}

impl SymbolGraph {
    /// Bind `decl`'s generic parameters to `args`.
    ///
    /// Supplying more arguments than declared is always an
    /// `ArityMismatch`; supplying fewer is one too unless the language
    /// allows partial inference, in which case the trailing parameters stay
    /// open. A parameter bound to itself stays open as well. A parameter
    /// bound, directly or through other parameters, to a type mentioning
    /// itself is a `RecursiveGeneric` error.
    pub fn bind(&self, decl: DeclId, args: Vec<TypeRef>) -> Result<BoundView, CatalogError> {
        let declaration = self.checked_declaration(decl)?;
        let expected = declaration.generics.len();
        let supplied = args.len();
        if supplied > expected || (supplied < expected && !self.policy().partial_inference) {
            return Err(CatalogError::ArityMismatch {
                declaration: self.display_path(decl),
                expected,
                supplied,
            });
        }

        let params: Vec<GenericParam> = declaration
            .generics
            .iter()
            .map(|&name| GenericParam {
                owner: ParamOwner::Decl(decl),
                name,
            })
            .collect();
        let raw: FxHashMap<GenericParam, TypeRef> = params
            .iter()
            .copied()
            .zip(args)
            .filter(|(param, arg)| *arg != TypeRef::Param(*param))
            .collect();

        let mut own = Substitution::default();
        let mut bound = Vec::with_capacity(expected);
        for param in &params {
            if raw.contains_key(param) {
                let mut visiting = Vec::new();
                let ty = self.expand(decl, &raw, &TypeRef::Param(*param), &mut visiting, 0)?;
                own.insert(*param, ty.clone());
                bound.push(Some(ty));
            } else {
                bound.push(None);
            }
        }

        let receiver = TypeRef::Decl {
            id: decl,
            args: params
                .iter()
                .zip(&bound)
                .map(|(param, ty)| ty.clone().unwrap_or(TypeRef::Param(*param)))
                .collect(),
        };
        let lineage = self.compose_lineage(decl, own, &receiver);
        trace!(
            decl = %self.display_path(decl),
            bound = bound.iter().flatten().count(),
            declarations = lineage.len(),
            "bound generic declaration"
        );
        Ok(BoundView {
            decl,
            args: bound,
            lineage,
        })
    }

    /// Expand `ty` under the raw argument mapping until no parameter of the
    /// bound declaration remains.
    fn expand(
        &self,
        decl: DeclId,
        raw: &FxHashMap<GenericParam, TypeRef>,
        ty: &TypeRef,
        visiting: &mut Vec<GenericParam>,
        depth: usize,
    ) -> Result<TypeRef, CatalogError> {
        let recursive = |param: Option<&GenericParam>| CatalogError::RecursiveGeneric {
            declaration: self.display_path(decl),
            parameter: param
                .map(|p| self.name(p.name))
                .unwrap_or_default()
                .to_string(),
        };
        if depth > MAX_SUBSTITUTION_DEPTH {
            return Err(recursive(visiting.last()));
        }
        match ty {
            TypeRef::Param(param) => match raw.get(param) {
                Some(bound) => {
                    if visiting.contains(param) {
                        return Err(recursive(Some(param)));
                    }
                    visiting.push(*param);
                    let expanded = self.expand(decl, raw, bound, visiting, depth + 1)?;
                    visiting.pop();
                    Ok(expanded)
                }
                None => Ok(ty.clone()),
            },
            TypeRef::Decl { id, args } => Ok(TypeRef::Decl {
                id: *id,
                args: args
                    .iter()
                    .map(|arg| self.expand(decl, raw, arg, visiting, depth + 1))
                    .collect::<Result<_, _>>()?,
            }),
            TypeRef::Opaque { path, args } => Ok(TypeRef::Opaque {
                path: path.clone(),
                args: args
                    .iter()
                    .map(|arg| self.expand(decl, raw, arg, visiting, depth + 1))
                    .collect::<Result<_, _>>()?,
            }),
            TypeRef::Dynamic | TypeRef::Void => Ok(ty.clone()),
        }
    }

    /// Substitutions for every declaration reachable from `decl` through
    /// bases and extensions. The nearest path to a declaration wins.
    fn compose_lineage(
        &self,
        decl: DeclId,
        own: Substitution,
        receiver: &TypeRef,
    ) -> FxHashMap<DeclId, Substitution> {
        let self_name = self.interner().get("Self");
        let with_self = |mut subst: Substitution, owner: DeclId| {
            if let Some(name) = self_name {
                subst.insert(
                    GenericParam {
                        owner: ParamOwner::Decl(owner),
                        name,
                    },
                    receiver.clone(),
                );
            }
            subst
        };

        let mut lineage: FxHashMap<DeclId, Substitution> = FxHashMap::default();
        let mut queue = VecDeque::new();
        queue.push_back((decl, with_self(own, decl)));
        while let Some((id, subst)) = queue.pop_front() {
            if lineage.contains_key(&id) {
                continue;
            }
            let declaration = self.declaration(id);
            for base in &declaration.bases {
                let target = self.declaration(base.target);
                let mut derived = Substitution::default();
                for (&name, arg) in target.generics.iter().zip(&base.args) {
                    derived.insert(
                        GenericParam {
                            owner: ParamOwner::Decl(base.target),
                            name,
                        },
                        subst.apply(arg),
                    );
                }
                queue.push_back((base.target, with_self(derived, base.target)));
            }
            for &ext in self.extensions_of(id) {
                let mut derived = subst.clone();
                if let Some(TypeRef::Decl { args, .. }) = &self.declaration(ext).extends {
                    for (&name, arg) in declaration.generics.iter().zip(args) {
                        if let TypeRef::Param(param) = arg {
                            if param.owner == ParamOwner::Decl(ext) {
                                let target_param = GenericParam {
                                    owner: ParamOwner::Decl(id),
                                    name,
                                };
                                if let Some(ty) = subst.get(&target_param) {
                                    derived.insert(*param, ty.clone());
                                }
                            }
                        }
                    }
                }
                queue.push_back((ext, derived));
            }
            lineage.insert(id, subst);
        }
        lineage
    }

    /// A member's parameter and return types as seen through `view`.
    ///
    /// Members outside the view's lookup order (and the member's own
    /// generic parameters) are returned unsubstituted. A member id outside
    /// this graph is `NotFound`.
    pub fn bound_signature(
        &self,
        view: &BoundView,
        member: MemberId,
    ) -> Result<Signature, CatalogError> {
        let member = self.get_member(member).ok_or_else(|| {
            CatalogError::not_found("this catalog", format!("member #{}", member.0))
        })?;
        Ok(self.substituted_signature(view, member))
    }

    pub(crate) fn substituted_signature(&self, view: &BoundView, member: &Member) -> Signature {
        match view.substitution_for(member.owner) {
            Some(subst) => Signature {
                params: member.params.iter().map(|p| subst.apply(&p.ty)).collect(),
                returns: subst.apply(&member.returns),
            },
            None => Signature {
                params: member.params.iter().map(|p| p.ty.clone()).collect(),
                returns: member.returns.clone(),
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/generics_tests.rs"]
mod tests;
