//! Raw fixture records.
//!
//! These mirror the JSON fixture schema one to one. Every optional field is
//! kept as an `Option` so that validation can tell a missing field from an
//! empty one and reject fields that are not valid for a record's kind.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use symcat_common::Language;

/// One fixture set: the builtin declarations of a single language.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureRecord {
    pub language: Language,
    /// Namespace paths searched after lexical scopes (`using System;`).
    #[serde(default)]
    pub imports: Vec<String>,
    /// Implicit conversions `[from, to]` considered by overload disambiguation.
    #[serde(default)]
    pub conversions: Vec<(String, String)>,
    #[serde(default)]
    pub declarations: Vec<DeclarationRecord>,
}

/// Declaration kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Namespace,
    Class,
    Struct,
    #[serde(alias = "protocol", alias = "trait")]
    Interface,
    #[serde(alias = "mixin")]
    Module,
    Enum,
    Function,
    Constant,
    /// Attaches members (and conformances) to an already-declared type.
    Extension,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Namespace => "namespace",
            DeclKind::Class => "class",
            DeclKind::Struct => "struct",
            DeclKind::Interface => "interface",
            DeclKind::Module => "module",
            DeclKind::Enum => "enum",
            DeclKind::Function => "function",
            DeclKind::Constant => "constant",
            DeclKind::Extension => "extension",
        }
    }

    /// Kinds that own a member table and take part in inheritance.
    pub fn is_type_like(self) -> bool {
        matches!(
            self,
            DeclKind::Class
                | DeclKind::Struct
                | DeclKind::Interface
                | DeclKind::Module
                | DeclKind::Enum
                | DeclKind::Extension
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationRecord {
    pub kind: DeclKind,
    pub name: Option<String>,
    pub generics: Option<Vec<String>>,
    pub members: Option<Vec<MemberRecord>>,
    pub bases: Option<Vec<BaseRecord>>,
    /// Extension target.
    pub extends: Option<String>,
    /// Function signatures.
    pub signatures: Option<Vec<SignatureRecord>>,
    /// Constant type.
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub nested: Option<Vec<DeclarationRecord>>,
}

/// How a base reference composes into the declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseRelation {
    /// Single base-class inheritance.
    Superclass,
    /// Interface implementation, protocol conformance, interface extension.
    Interface,
    /// Mixin / module inclusion.
    Include,
}

impl BaseRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            BaseRelation::Superclass => "superclass",
            BaseRelation::Interface => "interface",
            BaseRelation::Include => "include",
        }
    }
}

/// A base reference, written `{ "superclass": "Object" }`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseRecord {
    Superclass(String),
    Interface(String),
    Include(String),
}

impl BaseRecord {
    pub fn relation(&self) -> BaseRelation {
        match self {
            BaseRecord::Superclass(_) => BaseRelation::Superclass,
            BaseRecord::Interface(_) => BaseRelation::Interface,
            BaseRecord::Include(_) => BaseRelation::Include,
        }
    }

    pub fn type_text(&self) -> &str {
        match self {
            BaseRecord::Superclass(ty) | BaseRecord::Interface(ty) | BaseRecord::Include(ty) => {
                ty
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Method,
    Property,
    Field,
    Operator,
    Constructor,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Field => "field",
            MemberKind::Operator => "operator",
            MemberKind::Constructor => "constructor",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Static,
    Instance,
    Abstract,
    Mutating,
}

bitflags! {
    /// Member modifiers. A member is either `STATIC` or `INSTANCE`, never both.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const STATIC = 1 << 0;
        const INSTANCE = 1 << 1;
        const ABSTRACT = 1 << 2;
        const MUTATING = 1 << 3;
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        match modifier {
            Modifier::Static => Modifiers::STATIC,
            Modifier::Instance => Modifiers::INSTANCE,
            Modifier::Abstract => Modifiers::ABSTRACT,
            Modifier::Mutating => Modifiers::MUTATING,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberRecord {
    pub name: Option<String>,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(default)]
    pub params: Vec<ParamRecord>,
    pub returns: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub generics: Vec<String>,
}

/// A free function signature.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureRecord {
    #[serde(default)]
    pub params: Vec<ParamRecord>,
    pub returns: Option<String>,
    #[serde(default)]
    pub generics: Vec<String>,
}

/// A parameter: either just its type, or a detailed record.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ParamRecord {
    Type(String),
    Detailed(DetailedParamRecord),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedParamRecord {
    pub name: Option<String>,
    /// Missing type means the dynamic placeholder.
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub variadic: bool,
}
