//! Resolved type references.
//!
//! The qualifier resolver turns every syntactic `TypeExpr` inside a member
//! signature into a [`TypeRef`]: a declaration of the same catalog, a generic
//! parameter of an enclosing declaration or member, the dynamic placeholder,
//! or an opaque name the catalog does not declare (TypeScript's `string`,
//! Swift's `Void`). Opaque names still take part in exact matching and
//! implicit conversions.

use crate::arena::{DeclId, MemberId};
use serde::Serialize;
use symcat_common::Atom;

/// Who declares a generic parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ParamOwner {
    Decl(DeclId),
    Member(MemberId),
}

/// A generic parameter, identified by its owner and name.
///
/// `Self` is an implicit parameter of every type-like declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GenericParam {
    pub owner: ParamOwner,
    pub name: Atom,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    /// A declaration of this catalog, with type arguments.
    Decl { id: DeclId, args: Vec<TypeRef> },
    /// A name that does not resolve to a declaration of this catalog.
    Opaque { path: Vec<Atom>, args: Vec<TypeRef> },
    /// An unbound generic parameter.
    Param(GenericParam),
    /// The dynamic placeholder: accepts and is accepted by anything.
    Dynamic,
    /// Absent return type.
    Void,
}

/// The head of a type, ignoring its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeHead {
    Decl(DeclId),
    Opaque(Vec<Atom>),
}

impl TypeRef {
    pub fn decl(id: DeclId) -> Self {
        TypeRef::Decl {
            id,
            args: Vec::new(),
        }
    }

    pub fn head(&self) -> Option<TypeHead> {
        match self {
            TypeRef::Decl { id, .. } => Some(TypeHead::Decl(*id)),
            TypeRef::Opaque { path, .. } => Some(TypeHead::Opaque(path.clone())),
            TypeRef::Param(_) | TypeRef::Dynamic | TypeRef::Void => None,
        }
    }

    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Decl { args, .. } | TypeRef::Opaque { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeRef::Dynamic)
    }

    /// Whether `param` occurs anywhere inside this type.
    pub fn mentions(&self, param: &GenericParam) -> bool {
        match self {
            TypeRef::Param(p) => p == param,
            TypeRef::Decl { args, .. } | TypeRef::Opaque { args, .. } => {
                args.iter().any(|arg| arg.mentions(param))
            }
            TypeRef::Dynamic | TypeRef::Void => false,
        }
    }

    /// Generic parameters occurring in this type, in first-occurrence order.
    pub fn params(&self) -> Vec<GenericParam> {
        fn collect(ty: &TypeRef, out: &mut Vec<GenericParam>) {
            match ty {
                TypeRef::Param(p) => {
                    if !out.contains(p) {
                        out.push(*p);
                    }
                }
                TypeRef::Decl { args, .. } | TypeRef::Opaque { args, .. } => {
                    for arg in args {
                        collect(arg, out);
                    }
                }
                TypeRef::Dynamic | TypeRef::Void => {}
            }
        }
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}
