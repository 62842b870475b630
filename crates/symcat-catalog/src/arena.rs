//! Declaration and member arenas.
//!
//! Every declaration and member of a catalog lives in a flat `Vec` and is
//! addressed by a stable index. Inheritance edges, lookup orders and
//! overload sets store indices only, so the whole graph is plain owned data
//! that can be shared across threads once built.

use crate::error::CatalogError;
use crate::types::TypeRef;
use indexmap::IndexMap;
use serde::Serialize;
use symcat_common::Atom;
use symcat_loader::{BaseRelation, DeclKind, MemberKind, Modifiers};

/// Index of a declaration in its catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub u32);

impl DeclId {
    /// The unnamed global scope.
    pub const ROOT: DeclId = DeclId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Result<Self, CatalogError> {
        u32::try_from(index)
            .map(DeclId)
            .map_err(|_| CatalogError::TooLarge { what: "declarations" })
    }
}

/// Index of a member in its catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(pub u32);

impl MemberId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Result<Self, CatalogError> {
        u32::try_from(index)
            .map(MemberId)
            .map_err(|_| CatalogError::TooLarge { what: "members" })
    }
}

/// A resolved base reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseRef {
    pub relation: BaseRelation,
    pub target: DeclId,
    /// Type arguments in terms of the declaring type's own parameters.
    /// Empty for a raw (unapplied) reference.
    pub args: Vec<TypeRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclId,
    pub kind: DeclKind,
    /// Local name; `Atom::NONE` for the global scope and for extensions.
    pub name: Atom,
    /// Qualified name. An extension carries the path of its enclosing scope.
    pub path: Vec<Atom>,
    pub parent: Option<DeclId>,
    pub generics: Vec<Atom>,
    pub members: Vec<MemberId>,
    pub bases: Vec<BaseRef>,
    /// Extension target, always a `TypeRef::Decl`.
    pub extends: Option<TypeRef>,
    /// Lexically nested declarations by name, in declaration order.
    pub children: IndexMap<Atom, DeclId>,
    /// Record path of the (first) fixture record, for error messages.
    pub record: String,
}

impl Declaration {
    pub fn is_extension(&self) -> bool {
        self.kind == DeclKind::Extension
    }

    /// Type-like declarations own a member table and take part in inheritance.
    pub fn is_type_like(&self) -> bool {
        self.kind.is_type_like()
    }

    /// Declarations a type reference may denote.
    pub fn is_type(&self) -> bool {
        self.kind.is_type_like() && self.kind != DeclKind::Extension
    }

    pub fn extension_target(&self) -> Option<DeclId> {
        match &self.extends {
            Some(TypeRef::Decl { id, .. }) => Some(*id),
            _ => None,
        }
    }

    pub fn superclass(&self) -> Option<&BaseRef> {
        self.bases
            .iter()
            .find(|base| base.relation == BaseRelation::Superclass)
    }

    pub fn bases_of(&self, relation: BaseRelation) -> impl Iterator<Item = &BaseRef> {
        self.bases
            .iter()
            .filter(move |base| base.relation == relation)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub label: Option<Atom>,
    pub ty: TypeRef,
    pub optional: bool,
    pub variadic: bool,
}

/// The range of argument counts a member accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Arity {
    pub min: usize,
    /// `None` when the last parameter is variadic.
    pub max: Option<usize>,
}

impl Arity {
    #[inline]
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    /// The declaration whose record declares this member. For functions and
    /// constants this is the function/constant declaration itself.
    pub owner: DeclId,
    pub name: Atom,
    pub kind: MemberKind,
    pub params: Vec<Param>,
    pub returns: TypeRef,
    pub modifiers: Modifiers,
    pub generics: Vec<Atom>,
}

impl Member {
    pub fn arity(&self) -> Arity {
        let required = self
            .params
            .iter()
            .filter(|p| !p.optional && !p.variadic)
            .count();
        let variadic = self.params.last().is_some_and(|p| p.variadic);
        Arity {
            min: required,
            max: if variadic {
                None
            } else {
                Some(self.params.len())
            },
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Parameter type for the argument at `index`; trailing arguments map
    /// onto a variadic last parameter.
    pub fn param_type_at(&self, index: usize) -> Option<&TypeRef> {
        match self.params.get(index) {
            Some(param) => Some(&param.ty),
            None => self.params.last().filter(|p| p.variadic).map(|p| &p.ty),
        }
    }

    /// Same kind, parameter types and return type.
    pub fn same_signature(&self, other: &Member) -> bool {
        self.kind == other.kind
            && self.returns == other.returns
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty && a.variadic == b.variadic)
    }
}
