use super::*;
use serde_json::json;

fn load(value: serde_json::Value) -> Result<LoadedFixture, LoaderError> {
    load_fixture(&value.to_string())
}

fn load_decls(decls: serde_json::Value) -> Result<LoadedFixture, LoaderError> {
    load(json!({ "language": "swift", "declarations": decls }))
}

fn invalid_field(err: LoaderError) -> (String, &'static str, String) {
    match err {
        LoaderError::InvalidField {
            record,
            field,
            reason,
        } => (record, field, reason),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn test_load_minimal_fixture() {
    let fixture = load(json!({ "language": "ruby" })).unwrap();
    assert_eq!(fixture.language, Language::Ruby);
    assert!(fixture.declarations.is_empty());
    assert!(fixture.imports.is_empty());
    assert_eq!(fixture.declaration_count(), 0);
}

#[test]
fn test_malformed_json_and_unknown_fields() {
    assert!(matches!(
        load_fixture("{ not json"),
        Err(LoaderError::Malformed(_))
    ));
    let err = load_decls(json!([{ "kind": "class", "name": "A", "colour": "red" }])).unwrap_err();
    assert!(matches!(err, LoaderError::Malformed(_)));
    assert_eq!(err.record(), None);
}

#[test]
fn test_unknown_language_is_malformed() {
    let err = load(json!({ "language": "cobol" })).unwrap_err();
    assert!(matches!(err, LoaderError::Malformed(_)));
}

#[test]
fn test_class_with_members_and_bases() {
    let fixture = load_decls(json!([
        { "kind": "protocol", "name": "Equatable" },
        {
            "kind": "class",
            "name": "Box",
            "generics": ["T"],
            "bases": [{ "interface": "Equatable" }],
            "members": [
                { "name": "value", "kind": "property", "returns": "T" },
                { "name": "map", "params": ["Function<T, U>"], "returns": "Box<U>", "generics": ["U"] },
                { "name": "make", "params": [{ "name": "value", "type": "T" }], "returns": "Box<T>", "modifiers": ["static"] }
            ]
        }
    ]))
    .unwrap();

    assert_eq!(fixture.declarations.len(), 2);
    assert_eq!(fixture.declarations[0].kind, DeclKind::Interface);

    let boxed = &fixture.declarations[1];
    assert_eq!(boxed.name, vec!["Box"]);
    assert_eq!(boxed.generics, vec!["T"]);
    assert_eq!(boxed.bases.len(), 1);
    assert_eq!(boxed.bases[0].relation, BaseRelation::Interface);
    assert_eq!(boxed.bases[0].target, TypeExpr::simple("Equatable"));

    let value = &boxed.members[0];
    assert_eq!(value.kind, MemberKind::Property);
    assert_eq!(value.modifiers, Modifiers::INSTANCE);
    assert!(value.params.is_empty());

    let map = &boxed.members[1];
    assert_eq!(map.generics, vec!["U"]);
    assert_eq!(map.returns.as_ref().unwrap().to_string(), "Box<U>");

    let make = &boxed.members[2];
    assert_eq!(make.modifiers, Modifiers::STATIC);
    assert_eq!(make.params[0].label.as_deref(), Some("value"));
}

#[test]
fn test_field_not_valid_for_kind() {
    let err = load_decls(json!([
        { "kind": "namespace", "name": "System", "members": [] }
    ]))
    .unwrap_err();
    let (record, field, reason) = invalid_field(err);
    assert_eq!(record, "System");
    assert_eq!(field, "members");
    assert!(reason.contains("namespace"));

    let err = load_decls(json!([
        { "kind": "module", "name": "Enumerable", "generics": ["T"] }
    ]))
    .unwrap_err();
    assert_eq!(invalid_field(err).1, "generics");
}

#[test]
fn test_missing_required_fields() {
    let err = load_decls(json!([{ "kind": "class" }])).unwrap_err();
    assert!(matches!(
        &err,
        LoaderError::MissingField { record, field: "name" } if record == "#0"
    ));

    let err = load_decls(json!([{ "kind": "function", "name": "print" }])).unwrap_err();
    assert!(matches!(err, LoaderError::MissingField { field: "signatures", .. }));

    let err = load_decls(json!([{ "kind": "extension", "members": [] }])).unwrap_err();
    assert!(matches!(err, LoaderError::MissingField { field: "extends", .. }));

    let err = load_decls(json!([
        { "kind": "class", "name": "A", "members": [{ "name": "size", "kind": "field" }] }
    ]))
    .unwrap_err();
    assert!(matches!(
        &err,
        LoaderError::MissingField { record, field: "returns" } if record == "A.size"
    ));
}

#[test]
fn test_record_paths_name_nested_records() {
    let err = load_decls(json!([
        {
            "kind": "namespace",
            "name": "System",
            "nested": [
                { "kind": "class", "name": "Console", "members": [{ "kind": "method" }] }
            ]
        }
    ]))
    .unwrap_err();
    assert_eq!(err.record(), Some("System.Console.members[0]"));
}

#[test]
fn test_only_namespaces_may_be_qualified() {
    let fixture = load(json!({
        "language": "csharp",
        "declarations": [{ "kind": "namespace", "name": "System.Collections.Generic" }]
    }))
    .unwrap();
    assert_eq!(
        fixture.declarations[0].name,
        vec!["System", "Collections", "Generic"]
    );

    let err = load_decls(json!([{ "kind": "class", "name": "Foo.Bar" }])).unwrap_err();
    assert_eq!(invalid_field(err).1, "name");

    let err = load_decls(json!([{ "kind": "namespace", "name": "a..b" }])).unwrap_err();
    assert_eq!(invalid_field(err).2, "empty name segment");
}

#[test]
fn test_base_relation_rules() {
    let cases = [
        (json!({ "kind": "interface", "name": "I", "bases": [{ "superclass": "A" }] }), "interface"),
        (json!({ "kind": "module", "name": "M", "bases": [{ "interface": "I" }] }), "module"),
        (json!({ "kind": "struct", "name": "S", "bases": [{ "superclass": "A" }] }), "struct"),
        (json!({ "kind": "enum", "name": "E", "bases": [{ "superclass": "A" }] }), "enum"),
        (json!({ "kind": "extension", "extends": "S", "bases": [{ "superclass": "A" }] }), "extension"),
    ];
    for (record, kind) in cases {
        let err = load_decls(json!([record])).unwrap_err();
        let (_, field, reason) = invalid_field(err);
        assert_eq!(field, "bases");
        assert!(reason.starts_with(&format!("{kind} records cannot")), "{reason}");
    }
}

#[test]
fn test_single_superclass() {
    let err = load_decls(json!([
        { "kind": "class", "name": "C", "bases": [{ "superclass": "A" }, { "superclass": "B" }] }
    ]))
    .unwrap_err();
    assert_eq!(invalid_field(err).2, "at most one superclass is allowed");

    let fixture = load_decls(json!([
        { "kind": "class", "name": "C", "bases": [{ "superclass": "A" }, { "include": "M" }, { "interface": "I" }] }
    ]))
    .unwrap();
    assert_eq!(fixture.declarations[0].bases.len(), 3);
}

#[test]
fn test_dynamic_base_and_extension_target_rejected() {
    let err = load_decls(json!([
        { "kind": "class", "name": "C", "bases": [{ "superclass": "?" }] }
    ]))
    .unwrap_err();
    assert_eq!(invalid_field(err).1, "bases");

    let err = load_decls(json!([{ "kind": "extension", "extends": "?" }])).unwrap_err();
    assert_eq!(invalid_field(err).1, "extends");
}

#[test]
fn test_type_syntax_error_names_field() {
    let err = load_decls(json!([
        { "kind": "class", "name": "C", "members": [{ "name": "get", "returns": "List<" }] }
    ]))
    .unwrap_err();
    match err {
        LoaderError::TypeSyntax {
            record,
            field,
            text,
            offset,
            ..
        } => {
            assert_eq!(record, "C.get");
            assert_eq!(field, "returns");
            assert_eq!(text, "List<");
            assert_eq!(offset, 5);
        }
        other => panic!("expected TypeSyntax, got {other:?}"),
    }
}

#[test]
fn test_duplicate_member_signature() {
    let err = load_decls(json!([
        {
            "kind": "struct",
            "name": "Int",
            "members": [
                { "name": "init", "kind": "constructor", "params": [{ "name": "exactly", "type": "Double" }] },
                { "name": "init", "kind": "constructor", "params": ["Double"] }
            ]
        }
    ]))
    .unwrap_err();
    assert!(matches!(
        err,
        LoaderError::DuplicateMember { ref member, kind: "constructor", .. } if member == "init"
    ));
}

#[test]
fn test_overloads_by_type_kind_and_arity_are_allowed() {
    let fixture = load_decls(json!([
        {
            "kind": "class",
            "name": "Console",
            "members": [
                { "name": "WriteLine" },
                { "name": "WriteLine", "params": ["String"] },
                { "name": "WriteLine", "params": ["Int32"] },
                { "name": "WriteLine", "params": ["String", "Int32"] },
                { "name": "WriteLine", "kind": "property", "returns": "String" }
            ]
        }
    ]))
    .unwrap();
    assert_eq!(fixture.declarations[0].members.len(), 5);
}

#[test]
fn test_static_and_instance_conflict() {
    let err = load_decls(json!([
        { "kind": "class", "name": "C", "members": [{ "name": "m", "modifiers": ["static", "instance"] }] }
    ]))
    .unwrap_err();
    assert_eq!(invalid_field(err).1, "modifiers");

    let fixture = load_decls(json!([
        { "kind": "protocol", "name": "P", "members": [{ "name": "m", "modifiers": ["abstract", "mutating"] }] }
    ]))
    .unwrap();
    let modifiers = fixture.declarations[0].members[0].modifiers;
    assert!(modifiers.contains(Modifiers::ABSTRACT | Modifiers::MUTATING | Modifiers::INSTANCE));
    assert!(!modifiers.contains(Modifiers::STATIC));
}

#[test]
fn test_param_ordering_rules() {
    let fixture = load_decls(json!([
        {
            "kind": "class",
            "name": "Kernel",
            "members": [
                { "name": "raise", "params": [{ "optional": true }, { "optional": true }] },
                { "name": "puts", "params": [{ "variadic": true }] },
                { "name": "sprintf", "params": [{}, { "optional": true }, { "variadic": true }] }
            ]
        }
    ]))
    .unwrap();
    let members = &fixture.declarations[0].members;
    assert!(members[0].params.iter().all(|p| p.optional && p.ty.is_dynamic()));
    assert!(members[1].params[0].variadic);
    assert_eq!(members[2].params.len(), 3);

    let rejected = [
        json!([{ "variadic": true }, {}]),
        json!([{ "optional": true, "variadic": true }]),
        json!([{ "optional": true }, "Int"]),
    ];
    for params in rejected {
        let err = load_decls(json!([
            { "kind": "class", "name": "C", "members": [{ "name": "m", "params": params }] }
        ]))
        .unwrap_err();
        assert_eq!(invalid_field(err).1, "params");
    }
}

#[test]
fn test_field_with_params_rejected() {
    let err = load_decls(json!([
        { "kind": "class", "name": "C", "members": [{ "name": "f", "kind": "field", "params": ["Int"], "returns": "Int" }] }
    ]))
    .unwrap_err();
    assert_eq!(invalid_field(err).1, "params");
}

#[test]
fn test_function_signatures_become_static_methods() {
    let fixture = load_decls(json!([
        {
            "kind": "function",
            "name": "max",
            "signatures": [
                { "params": ["T", "T"], "returns": "T", "generics": ["T"] },
                { "params": ["T", "T", "T"], "returns": "T", "generics": ["T"] }
            ]
        }
    ]))
    .unwrap();
    let max = &fixture.declarations[0];
    assert_eq!(max.kind, DeclKind::Function);
    assert_eq!(max.members.len(), 2);
    assert!(max.members.iter().all(|m| m.name == "max"
        && m.kind == MemberKind::Method
        && m.modifiers == Modifiers::STATIC));

    let err = load_decls(json!([{ "kind": "function", "name": "f", "signatures": [] }])).unwrap_err();
    assert_eq!(invalid_field(err).1, "signatures");

    let err = load_decls(json!([
        { "kind": "function", "name": "f", "signatures": [{ "params": ["Int"] }, { "params": ["Int"] }] }
    ]))
    .unwrap_err();
    assert!(matches!(err, LoaderError::DuplicateMember { .. }));
}

#[test]
fn test_constant_becomes_static_field() {
    let fixture = load_decls(json!([{ "kind": "constant", "name": "PI", "type": "Double" }])).unwrap();
    let pi = &fixture.declarations[0];
    assert_eq!(pi.members.len(), 1);
    assert_eq!(pi.members[0].name, "PI");
    assert_eq!(pi.members[0].kind, MemberKind::Field);
    assert_eq!(pi.members[0].modifiers, Modifiers::STATIC);
    assert_eq!(pi.members[0].returns, Some(TypeExpr::simple("Double")));
}

#[test]
fn test_generic_parameter_validation() {
    let err = load_decls(json!([{ "kind": "class", "name": "C", "generics": ["T", "T"] }])).unwrap_err();
    assert!(invalid_field(err).2.contains("declared twice"));

    let err = load_decls(json!([{ "kind": "class", "name": "C", "generics": ["T<U>"] }])).unwrap_err();
    assert_eq!(invalid_field(err).1, "generics");
}

#[test]
fn test_imports_and_conversions() {
    let fixture = load(json!({
        "language": "csharp",
        "imports": ["System", "System.Collections.Generic"],
        "conversions": [["Int32", "Int64"]]
    }))
    .unwrap();
    assert_eq!(fixture.imports[1], vec!["System", "Collections", "Generic"]);
    assert_eq!(
        fixture.conversions,
        vec![(TypeExpr::simple("Int32"), TypeExpr::simple("Int64"))]
    );

    let err = load(json!({ "language": "csharp", "imports": ["List<T>"] })).unwrap_err();
    assert_eq!(err.record(), Some("imports[0]"));

    let err = load(json!({ "language": "csharp", "conversions": [["Int32", "<"]] })).unwrap_err();
    assert!(matches!(err, LoaderError::TypeSyntax { field: "conversions", .. }));
}

#[test]
fn test_extension_records() {
    let fixture = load_decls(json!([
        { "kind": "struct", "name": "Int" },
        {
            "kind": "extension",
            "extends": "Int",
            "bases": [{ "interface": "Codable" }],
            "members": [{ "name": "isEven", "kind": "property", "returns": "Bool" }]
        }
    ]))
    .unwrap();
    let ext = &fixture.declarations[1];
    assert!(ext.name.is_empty());
    assert_eq!(ext.extension_target, Some(TypeExpr::simple("Int")));
    assert_eq!(ext.record, "#1");

    let err = load_decls(json!([{ "kind": "extension", "name": "X", "extends": "Int" }])).unwrap_err();
    assert_eq!(invalid_field(err).1, "name");
}

#[test]
fn test_nesting_depth_limit() {
    let mut record = json!({ "kind": "namespace", "name": "leaf" });
    for _ in 0..=MAX_NESTING_DEPTH + 1 {
        record = json!({ "kind": "namespace", "name": "n", "nested": [record] });
    }
    let err = load_decls(json!([record])).unwrap_err();
    assert_eq!(invalid_field(err).1, "nested");
}

#[test]
fn test_declaration_count_includes_nested() {
    let fixture = load_decls(json!([
        {
            "kind": "namespace",
            "name": "io",
            "nested": [
                { "kind": "interface", "name": "Reader" },
                { "kind": "function", "name": "Copy", "signatures": [{}] },
                { "kind": "constant", "name": "EOF", "type": "error" }
            ]
        }
    ]))
    .unwrap();
    assert_eq!(fixture.declaration_count(), 4);
}

#[test]
fn test_load_records_directly() {
    let records: Vec<DeclarationRecord> =
        serde_json::from_value(json!([{ "kind": "trait", "name": "Clone" }])).unwrap();
    let defs = load_records(Language::Rust, records).unwrap();
    assert_eq!(defs[0].kind, DeclKind::Interface);
}
