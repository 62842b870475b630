use super::*;

fn named(path: &[&str], args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Named {
        path: path.iter().map(|s| s.to_string()).collect(),
        args,
    }
}

#[test]
fn test_parse_simple_name() {
    assert_eq!(TypeExpr::parse("Int").unwrap(), TypeExpr::simple("Int"));
    assert_eq!(TypeExpr::parse("  String ").unwrap(), TypeExpr::simple("String"));
}

#[test]
fn test_parse_dynamic_placeholder() {
    let expr = TypeExpr::parse("?").unwrap();
    assert!(expr.is_dynamic());
    assert_eq!(expr.to_string(), "?");
}

#[test]
fn test_parse_qualified_paths_with_every_separator() {
    let expected = named(&["System", "Collections", "IEnumerable"], vec![]);
    assert_eq!(
        TypeExpr::parse("System.Collections.IEnumerable").unwrap(),
        expected
    );
    assert_eq!(
        TypeExpr::parse("System::Collections::IEnumerable").unwrap(),
        expected
    );
    assert_eq!(
        TypeExpr::parse("System\\Collections\\IEnumerable").unwrap(),
        expected
    );
}

#[test]
fn test_leading_separator_is_dropped() {
    assert_eq!(
        TypeExpr::parse("\\Exception").unwrap(),
        TypeExpr::simple("Exception")
    );
    assert_eq!(
        TypeExpr::parse("::std::string::String").unwrap(),
        named(&["std", "string", "String"], vec![])
    );
}

#[test]
fn test_parse_nested_generic_arguments() {
    let expr = TypeExpr::parse("Dictionary<TKey, List<TValue>>").unwrap();
    assert_eq!(
        expr,
        named(
            &["Dictionary"],
            vec![
                TypeExpr::simple("TKey"),
                named(&["List"], vec![TypeExpr::simple("TValue")]),
            ]
        )
    );
    assert_eq!(expr.to_string(), "Dictionary<TKey, List<TValue>>");
}

#[test]
fn test_dynamic_argument_inside_generic() {
    let expr = TypeExpr::parse("Result<T, ?>").unwrap();
    let TypeExpr::Named { args, .. } = expr else {
        panic!("expected a named type");
    };
    assert_eq!(args.len(), 2);
    assert!(args[1].is_dynamic());
}

#[test]
fn test_display_normalizes_separators() {
    let expr = TypeExpr::parse("std::vec::Vec<u8>").unwrap();
    assert_eq!(expr.to_string(), "std.vec.Vec<u8>");
}

#[test]
fn test_syntax_errors_report_offset() {
    let err = TypeExpr::parse("").unwrap_err();
    assert_eq!(err.offset, 0);
    assert_eq!(err.message, "expected a type name");

    let err = TypeExpr::parse("List<Int").unwrap_err();
    assert_eq!(err.offset, 8);
    assert_eq!(err.message, "unclosed generic argument list");

    let err = TypeExpr::parse("List<Int; Bool>").unwrap_err();
    assert_eq!(err.offset, 8);

    let err = TypeExpr::parse("Int Bool").unwrap_err();
    assert_eq!(err.message, "unexpected trailing characters");

    let err = TypeExpr::parse("System..Console").unwrap_err();
    assert_eq!(err.offset, 7);
}

#[test]
fn test_deep_nesting_is_rejected() {
    let depth = MAX_TYPE_EXPR_DEPTH + 2;
    let text = format!("{}Int{}", "Box<".repeat(depth), ">".repeat(depth));
    let err = TypeExpr::parse(&text).unwrap_err();
    assert_eq!(err.message, "generic arguments nested too deeply");
}

#[test]
fn test_unicode_and_dollar_identifiers() {
    assert_eq!(TypeExpr::parse("$Ref").unwrap(), TypeExpr::simple("$Ref"));
    assert_eq!(TypeExpr::parse("Größe").unwrap(), TypeExpr::simple("Größe"));
}
