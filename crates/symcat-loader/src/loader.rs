//! Declaration Loader.
//!
//! Turns raw fixture records into validated declaration definitions. The
//! loader checks each record's field set against its declared kind, parses
//! type strings, and rejects duplicate member signatures. It interprets no
//! names: whether `T` is a generic parameter or `Comparable` resolves to a
//! module is decided later by the qualifier resolver.

use crate::error::LoaderError;
use crate::records::{
    BaseRelation, DeclKind, DeclarationRecord, FixtureRecord, MemberKind, MemberRecord,
    Modifiers, ParamRecord, SignatureRecord,
};
use crate::type_expr::TypeExpr;
use rustc_hash::FxHashSet;
use symcat_common::Language;
use symcat_common::limits::MAX_NESTING_DEPTH;
use tracing::{debug, trace};

/// A validated fixture set, ready for catalog construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedFixture {
    pub language: Language,
    pub imports: Vec<Vec<String>>,
    pub conversions: Vec<(TypeExpr, TypeExpr)>,
    pub declarations: Vec<DeclarationDef>,
}

impl LoadedFixture {
    /// Total number of declaration definitions, nested ones included.
    pub fn declaration_count(&self) -> usize {
        fn count(decls: &[DeclarationDef]) -> usize {
            decls.iter().map(|d| 1 + count(&d.nested)).sum()
        }
        count(&self.declarations)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeclarationDef {
    pub kind: DeclKind,
    /// Local name segments. Only namespaces may have more than one
    /// (`System.Collections.Generic`); extensions have none.
    pub name: Vec<String>,
    pub generics: Vec<String>,
    pub members: Vec<MemberDef>,
    pub bases: Vec<BaseDef>,
    pub extension_target: Option<TypeExpr>,
    pub nested: Vec<DeclarationDef>,
    /// Record path, used to name this declaration in errors.
    pub record: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseDef {
    pub relation: BaseRelation,
    pub target: TypeExpr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberDef {
    pub name: String,
    pub kind: MemberKind,
    pub params: Vec<ParamDef>,
    /// `None` when the record declares no return type.
    pub returns: Option<TypeExpr>,
    pub modifiers: Modifiers,
    pub generics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDef {
    pub label: Option<String>,
    pub ty: TypeExpr,
    pub optional: bool,
    pub variadic: bool,
}

/// Parse a JSON fixture without validating it.
pub fn parse_fixture(json: &str) -> Result<FixtureRecord, LoaderError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse and validate a JSON fixture.
pub fn load_fixture(json: &str) -> Result<LoadedFixture, LoaderError> {
    validate_fixture(parse_fixture(json)?)
}

/// Validate a parsed fixture set.
pub fn validate_fixture(fixture: FixtureRecord) -> Result<LoadedFixture, LoaderError> {
    let imports = fixture
        .imports
        .iter()
        .enumerate()
        .map(|(i, text)| parse_import(text, i))
        .collect::<Result<Vec<_>, _>>()?;

    let conversions = fixture
        .conversions
        .iter()
        .enumerate()
        .map(|(i, (from, to))| {
            let record = format!("conversions[{i}]");
            Ok((
                parse_type(from, &record, "conversions")?,
                parse_type(to, &record, "conversions")?,
            ))
        })
        .collect::<Result<Vec<_>, LoaderError>>()?;

    let declarations = load_records(fixture.language, fixture.declarations)?;
    let loaded = LoadedFixture {
        language: fixture.language,
        imports,
        conversions,
        declarations,
    };

    debug!(
        language = %loaded.language,
        declarations = loaded.declaration_count(),
        imports = loaded.imports.len(),
        "loaded fixture"
    );
    Ok(loaded)
}

/// Validate one ordered record sequence for a language.
pub fn load_records(
    language: Language,
    records: Vec<DeclarationRecord>,
) -> Result<Vec<DeclarationDef>, LoaderError> {
    trace!(%language, records = records.len(), "validating records");
    records
        .iter()
        .enumerate()
        .map(|(i, record)| validate_declaration(record, None, i, 0))
        .collect()
}

fn parse_import(text: &str, index: usize) -> Result<Vec<String>, LoaderError> {
    let record = format!("imports[{index}]");
    match parse_type(text, &record, "imports")? {
        TypeExpr::Named { path, args } if args.is_empty() => Ok(path),
        _ => Err(LoaderError::invalid(
            &record,
            "imports",
            "an import must be a plain namespace path",
        )),
    }
}

pub(crate) fn parse_type(
    text: &str,
    record: &str,
    field: &'static str,
) -> Result<TypeExpr, LoaderError> {
    TypeExpr::parse(text).map_err(|err| LoaderError::TypeSyntax {
        record: record.to_string(),
        field,
        text: text.to_string(),
        offset: err.offset,
        message: err.message,
    })
}

// =============================================================================
// Field sets per kind
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Field {
    Name,
    Generics,
    Members,
    Bases,
    Extends,
    Signatures,
    Type,
    Nested,
}

impl Field {
    fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Generics => "generics",
            Field::Members => "members",
            Field::Bases => "bases",
            Field::Extends => "extends",
            Field::Signatures => "signatures",
            Field::Type => "type",
            Field::Nested => "nested",
        }
    }
}

fn allowed_fields(kind: DeclKind) -> &'static [Field] {
    match kind {
        DeclKind::Namespace => &[Field::Name, Field::Nested],
        DeclKind::Class | DeclKind::Struct | DeclKind::Interface | DeclKind::Enum => &[
            Field::Name,
            Field::Generics,
            Field::Members,
            Field::Bases,
            Field::Nested,
        ],
        DeclKind::Module => &[Field::Name, Field::Members, Field::Bases, Field::Nested],
        DeclKind::Function => &[Field::Name, Field::Generics, Field::Signatures],
        DeclKind::Constant => &[Field::Name, Field::Type],
        DeclKind::Extension => &[Field::Generics, Field::Members, Field::Bases, Field::Extends],
    }
}

fn required_fields(kind: DeclKind) -> &'static [Field] {
    match kind {
        DeclKind::Function => &[Field::Name, Field::Signatures],
        DeclKind::Constant => &[Field::Name, Field::Type],
        DeclKind::Extension => &[Field::Extends],
        _ => &[Field::Name],
    }
}

fn present_fields(record: &DeclarationRecord) -> Vec<Field> {
    let mut fields = Vec::new();
    if record.name.is_some() {
        fields.push(Field::Name);
    }
    if record.generics.is_some() {
        fields.push(Field::Generics);
    }
    if record.members.is_some() {
        fields.push(Field::Members);
    }
    if record.bases.is_some() {
        fields.push(Field::Bases);
    }
    if record.extends.is_some() {
        fields.push(Field::Extends);
    }
    if record.signatures.is_some() {
        fields.push(Field::Signatures);
    }
    if record.ty.is_some() {
        fields.push(Field::Type);
    }
    if record.nested.is_some() {
        fields.push(Field::Nested);
    }
    fields
}

fn record_path(parent: Option<&str>, name: Option<&str>, index: usize) -> String {
    let local = match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("#{index}"),
    };
    match parent {
        Some(parent) => format!("{parent}.{local}"),
        None => local,
    }
}

// =============================================================================
// Declarations
// =============================================================================

fn validate_declaration(
    record: &DeclarationRecord,
    parent: Option<&str>,
    index: usize,
    depth: usize,
) -> Result<DeclarationDef, LoaderError> {
    let path = record_path(parent, record.name.as_deref(), index);
    let kind = record.kind;

    if depth > MAX_NESTING_DEPTH {
        return Err(LoaderError::invalid(
            &path,
            "nested",
            format!("declarations nest deeper than {MAX_NESTING_DEPTH} levels"),
        ));
    }

    let present = present_fields(record);
    let allowed = allowed_fields(kind);
    if let Some(field) = present.iter().find(|f| !allowed.contains(f)) {
        return Err(LoaderError::invalid(
            &path,
            field.as_str(),
            format!("not valid for {} records", kind.as_str()),
        ));
    }
    if let Some(field) = required_fields(kind).iter().find(|f| !present.contains(f)) {
        return Err(LoaderError::MissingField {
            record: path,
            field: field.as_str(),
        });
    }

    let name = match &record.name {
        Some(name) => split_name(name, kind, &path)?,
        None => Vec::new(),
    };
    let generics = validate_generics(record.generics.as_deref().unwrap_or_default(), &path)?;
    let bases = validate_bases(record, &path)?;

    let extension_target = match &record.extends {
        Some(text) => {
            let target = parse_type(text, &path, "extends")?;
            if target.is_dynamic() {
                return Err(LoaderError::invalid(
                    &path,
                    "extends",
                    "an extension must name a concrete target",
                ));
            }
            Some(target)
        }
        None => None,
    };

    let mut members = Vec::new();
    if let Some(records) = &record.members {
        for (i, member) in records.iter().enumerate() {
            members.push(validate_member(member, &path, i)?);
        }
    }
    if let Some(signatures) = &record.signatures {
        if signatures.is_empty() {
            return Err(LoaderError::invalid(
                &path,
                "signatures",
                "a function needs at least one signature",
            ));
        }
        let fn_name = name.last().cloned().unwrap_or_default();
        for (i, signature) in signatures.iter().enumerate() {
            members.push(signature_member(signature, &fn_name, &path, i)?);
        }
    }
    if let Some(text) = &record.ty {
        members.push(MemberDef {
            name: name.last().cloned().unwrap_or_default(),
            kind: MemberKind::Field,
            params: Vec::new(),
            returns: Some(parse_type(text, &path, "type")?),
            modifiers: Modifiers::STATIC,
            generics: Vec::new(),
        });
    }
    check_duplicate_members(&members, &path)?;

    let mut nested = Vec::new();
    if let Some(records) = &record.nested {
        for (i, child) in records.iter().enumerate() {
            nested.push(validate_declaration(child, Some(&path), i, depth + 1)?);
        }
    }

    Ok(DeclarationDef {
        kind,
        name,
        generics,
        members,
        bases,
        extension_target,
        nested,
        record: path,
    })
}

/// Split a declared name into segments. Only namespaces may be qualified.
fn split_name(name: &str, kind: DeclKind, path: &str) -> Result<Vec<String>, LoaderError> {
    let segments: Vec<String> = name
        .split("::")
        .flat_map(|part| part.split(['.', '\\']))
        .map(str::to_string)
        .collect();
    if segments.iter().any(String::is_empty) {
        return Err(LoaderError::invalid(path, "name", "empty name segment"));
    }
    if segments.len() > 1 && kind != DeclKind::Namespace {
        return Err(LoaderError::invalid(
            path,
            "name",
            format!("{} names cannot be qualified", kind.as_str()),
        ));
    }
    Ok(segments)
}

fn validate_generics(generics: &[String], path: &str) -> Result<Vec<String>, LoaderError> {
    let mut seen = FxHashSet::default();
    for param in generics {
        let valid = !param.is_empty() && param.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !valid {
            return Err(LoaderError::invalid(
                path,
                "generics",
                format!("'{param}' is not a valid generic parameter name"),
            ));
        }
        if !seen.insert(param.as_str()) {
            return Err(LoaderError::invalid(
                path,
                "generics",
                format!("generic parameter '{param}' is declared twice"),
            ));
        }
    }
    Ok(generics.to_vec())
}

fn validate_bases(record: &DeclarationRecord, path: &str) -> Result<Vec<BaseDef>, LoaderError> {
    let Some(records) = &record.bases else {
        return Ok(Vec::new());
    };

    let mut bases = Vec::with_capacity(records.len());
    let mut superclasses = 0;
    for base in records {
        let relation = base.relation();
        let permitted = match record.kind {
            DeclKind::Interface => relation == BaseRelation::Interface,
            DeclKind::Module => relation == BaseRelation::Include,
            DeclKind::Struct | DeclKind::Enum | DeclKind::Extension => {
                relation != BaseRelation::Superclass
            }
            _ => true,
        };
        if !permitted {
            return Err(LoaderError::invalid(
                path,
                "bases",
                format!(
                    "{} records cannot have a {} base",
                    record.kind.as_str(),
                    relation.as_str()
                ),
            ));
        }
        if relation == BaseRelation::Superclass {
            superclasses += 1;
            if superclasses > 1 {
                return Err(LoaderError::invalid(
                    path,
                    "bases",
                    "at most one superclass is allowed",
                ));
            }
        }
        let target = parse_type(base.type_text(), path, "bases")?;
        if target.is_dynamic() {
            return Err(LoaderError::invalid(
                path,
                "bases",
                "a base must name a concrete type",
            ));
        }
        bases.push(BaseDef { relation, target });
    }
    Ok(bases)
}

// =============================================================================
// Members
// =============================================================================

fn validate_member(
    member: &MemberRecord,
    decl_path: &str,
    index: usize,
) -> Result<MemberDef, LoaderError> {
    let path = format!(
        "{decl_path}.{}",
        member
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("members[{index}]"))
    );
    let name = match &member.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => {
            return Err(LoaderError::MissingField {
                record: path,
                field: "name",
            });
        }
    };

    if matches!(member.kind, MemberKind::Field | MemberKind::Property) {
        if !member.params.is_empty() {
            return Err(LoaderError::invalid(
                &path,
                "params",
                format!("a {} takes no parameters", member.kind.as_str()),
            ));
        }
        if member.returns.is_none() {
            return Err(LoaderError::MissingField {
                record: path,
                field: "returns",
            });
        }
    }

    let mut modifiers = Modifiers::empty();
    for &modifier in &member.modifiers {
        modifiers |= Modifiers::from(modifier);
    }
    if modifiers.contains(Modifiers::STATIC | Modifiers::INSTANCE) {
        return Err(LoaderError::invalid(
            &path,
            "modifiers",
            "a member cannot be both static and instance",
        ));
    }
    if !modifiers.contains(Modifiers::STATIC) {
        modifiers |= Modifiers::INSTANCE;
    }

    Ok(MemberDef {
        name,
        kind: member.kind,
        params: validate_params(&member.params, &path)?,
        returns: member
            .returns
            .as_deref()
            .map(|text| parse_type(text, &path, "returns"))
            .transpose()?,
        modifiers,
        generics: validate_generics(&member.generics, &path)?,
    })
}

fn signature_member(
    signature: &SignatureRecord,
    fn_name: &str,
    decl_path: &str,
    index: usize,
) -> Result<MemberDef, LoaderError> {
    let path = format!("{decl_path}.signatures[{index}]");
    Ok(MemberDef {
        name: fn_name.to_string(),
        kind: MemberKind::Method,
        params: validate_params(&signature.params, &path)?,
        returns: signature
            .returns
            .as_deref()
            .map(|text| parse_type(text, &path, "returns"))
            .transpose()?,
        modifiers: Modifiers::STATIC,
        generics: validate_generics(&signature.generics, &path)?,
    })
}

fn validate_params(params: &[ParamRecord], path: &str) -> Result<Vec<ParamDef>, LoaderError> {
    let mut defs = Vec::with_capacity(params.len());
    let mut seen_optional = false;
    for (i, param) in params.iter().enumerate() {
        let def = match param {
            ParamRecord::Type(text) => ParamDef {
                label: None,
                ty: parse_type(text, path, "params")?,
                optional: false,
                variadic: false,
            },
            ParamRecord::Detailed(detail) => ParamDef {
                label: detail.name.clone(),
                ty: match &detail.ty {
                    Some(text) => parse_type(text, path, "params")?,
                    None => TypeExpr::Dynamic,
                },
                optional: detail.optional,
                variadic: detail.variadic,
            },
        };

        if def.variadic && i + 1 != params.len() {
            return Err(LoaderError::invalid(
                path,
                "params",
                "only the last parameter may be variadic",
            ));
        }
        if def.optional && def.variadic {
            return Err(LoaderError::invalid(
                path,
                "params",
                "a parameter cannot be both optional and variadic",
            ));
        }
        if seen_optional && !def.optional && !def.variadic {
            return Err(LoaderError::invalid(
                path,
                "params",
                "a required parameter cannot follow an optional one",
            ));
        }
        seen_optional |= def.optional;
        defs.push(def);
    }
    Ok(defs)
}

fn check_duplicate_members(members: &[MemberDef], path: &str) -> Result<(), LoaderError> {
    let mut seen: FxHashSet<(&str, MemberKind, Vec<&TypeExpr>)> = FxHashSet::default();
    for member in members {
        let key = (
            member.name.as_str(),
            member.kind,
            member.params.iter().map(|p| &p.ty).collect::<Vec<_>>(),
        );
        if !seen.insert(key) {
            return Err(LoaderError::DuplicateMember {
                record: path.to_string(),
                member: member.name.clone(),
                kind: member.kind.as_str(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
