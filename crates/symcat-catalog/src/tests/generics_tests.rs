use super::*;
use crate::overload::{ArgumentHint, Resolution};
use serde_json::json;

fn collections() -> SymbolGraph {
    let fixture = json!({
        "language": "csharp",
        "declarations": [
            { "kind": "struct", "name": "Boolean" },
            { "kind": "class", "name": "String" },
            { "kind": "interface", "name": "IEquatable", "members": [{ "name": "Equals", "params": ["Self"], "returns": "Boolean" }] },
            { "kind": "struct", "name": "Int32", "bases": [{ "interface": "IEquatable" }] },
            { "kind": "class", "name": "Func", "generics": ["T", "TResult"] },
            {
                "kind": "interface",
                "name": "IEnumerator",
                "generics": ["T"],
                "members": [{ "name": "Current", "kind": "property", "returns": "T" }]
            },
            {
                "kind": "interface",
                "name": "IEnumerable",
                "generics": ["T"],
                "members": [{ "name": "GetEnumerator", "returns": "IEnumerator<T>" }]
            },
            {
                "kind": "class",
                "name": "List",
                "generics": ["T"],
                "bases": [{ "interface": "IEnumerable<T>" }],
                "members": [
                    { "name": "Add", "params": ["T"] },
                    { "name": "ConvertAll", "params": ["Func<T, TOutput>"], "returns": "List<TOutput>", "generics": ["TOutput"] }
                ]
            },
            {
                "kind": "class",
                "name": "Dictionary",
                "generics": ["TKey", "TValue"],
                "members": [{ "name": "Get", "params": ["TKey"], "returns": "TValue" }]
            },
            {
                "kind": "extension",
                "extends": "IEnumerable<TSource>",
                "generics": ["TSource"],
                "members": [
                    { "name": "First", "returns": "TSource" },
                    { "name": "Where", "params": ["Func<TSource, Boolean>"], "returns": "IEnumerable<TSource>" }
                ]
            }
        ]
    });
    SymbolGraph::from_json(&fixture.to_string()).unwrap()
}

fn ty(graph: &SymbolGraph, name: &str) -> TypeRef {
    graph.resolve_type(name).unwrap()
}

fn signature(graph: &SymbolGraph, view: &BoundView, name: &str) -> (Vec<String>, String) {
    let id = graph
        .overload_set(view.decl, name)
        .unwrap_or_else(|| panic!("no member {name}"))
        .members[0];
    let sig = graph.bound_signature(view, id).unwrap();
    (
        sig.params.iter().map(|p| graph.display_type(p)).collect(),
        graph.display_type(&sig.returns),
    )
}

fn param(owner: DeclId, graph: &SymbolGraph, name: &str) -> TypeRef {
    TypeRef::Param(GenericParam {
        owner: ParamOwner::Decl(owner),
        name: graph.interner().get(name).unwrap(),
    })
}

#[test]
fn test_bind_substitutes_own_members() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let view = graph.bind(list, vec![ty(&graph, "Int32")]).unwrap();
    assert!(view.is_fully_bound());
    assert_eq!(view.args, vec![Some(ty(&graph, "Int32"))]);
    assert_eq!(signature(&graph, &view, "Add"), (vec!["Int32".to_string()], "void".to_string()));
}

#[test]
fn test_bind_reaches_bases_and_extensions() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let view = graph.bind(list, vec![ty(&graph, "String")]).unwrap();

    assert_eq!(signature(&graph, &view, "GetEnumerator").1, "IEnumerator<String>");
    assert_eq!(signature(&graph, &view, "First").1, "String");
    assert_eq!(
        signature(&graph, &view, "Where"),
        (
            vec!["Func<String, Boolean>".to_string()],
            "IEnumerable<String>".to_string()
        )
    );
}

#[test]
fn test_member_generics_stay_open() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let view = graph.bind(list, vec![ty(&graph, "Int32")]).unwrap();
    assert_eq!(
        signature(&graph, &view, "ConvertAll"),
        (
            vec!["Func<Int32, TOutput>".to_string()],
            "List<TOutput>".to_string()
        )
    );
}

#[test]
fn test_binding_is_non_destructive() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let add = graph.overload_set(list, "Add").unwrap().members[0];

    let ints = graph.bind(list, vec![ty(&graph, "Int32")]).unwrap();
    let strings = graph.bind(list, vec![ty(&graph, "String")]).unwrap();
    assert_eq!(graph.bound_signature(&ints, add).unwrap().params, vec![ty(&graph, "Int32")]);
    assert_eq!(graph.bound_signature(&strings, add).unwrap().params, vec![ty(&graph, "String")]);
    assert_eq!(graph.member(add).params[0].ty, param(list, &graph, "T"));
}

#[test]
fn test_self_binds_to_receiver() {
    let graph = collections();
    let int32 = graph.resolve(&["Int32"]).unwrap();
    let view = graph.bind(int32, Vec::new()).unwrap();
    assert!(view.is_fully_bound());
    assert_eq!(
        signature(&graph, &view, "Equals"),
        (vec!["Int32".to_string()], "Boolean".to_string())
    );

    let list = graph.resolve(&["List"]).unwrap();
    let view = graph.bind(list, vec![ty(&graph, "Int32")]).unwrap();
    let subst = view.substitution().unwrap();
    let self_param = param(list, &graph, "Self");
    assert_eq!(graph.display_type(&subst.apply(&self_param)), "List<Int32>");
}

#[test]
fn test_wrong_argument_count_without_partial_inference() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    match graph.bind(list, Vec::new()).unwrap_err() {
        CatalogError::ArityMismatch {
            declaration,
            expected,
            supplied,
        } => {
            assert_eq!(declaration, "List");
            assert_eq!(expected, 1);
            assert_eq!(supplied, 0);
        }
        other => panic!("expected ArityMismatch, got {other:?}"),
    }
    let int32 = ty(&graph, "Int32");
    assert!(matches!(
        graph.bind(list, vec![int32.clone(), int32]),
        Err(CatalogError::ArityMismatch { supplied: 2, .. })
    ));
}

#[test]
fn test_partial_inference_leaves_trailing_parameters_open() {
    let fixture = json!({
        "language": "swift",
        "declarations": [
            { "kind": "struct", "name": "String" },
            {
                "kind": "struct",
                "name": "Dictionary",
                "generics": ["Key", "Value"],
                "members": [{ "name": "lookup", "params": ["Key"], "returns": "Value" }]
            }
        ]
    });
    let graph = SymbolGraph::from_json(&fixture.to_string()).unwrap();
    let dictionary = graph.resolve(&["Dictionary"]).unwrap();
    let view = graph.bind(dictionary, vec![ty(&graph, "String")]).unwrap();
    assert!(!view.is_fully_bound());
    assert_eq!(view.args[1], None);
    assert_eq!(
        signature(&graph, &view, "lookup"),
        (vec!["String".to_string()], "Value".to_string())
    );
    assert!(graph.bind(dictionary, Vec::new()).is_ok());
    assert!(graph
        .bind(dictionary, vec![TypeRef::Dynamic, TypeRef::Dynamic, TypeRef::Dynamic])
        .is_err());
}

#[test]
fn test_arguments_may_refer_to_other_parameters() {
    let graph = collections();
    let dictionary = graph.resolve(&["Dictionary"]).unwrap();
    let list = graph.resolve(&["List"]).unwrap();
    let view = graph
        .bind(
            dictionary,
            vec![
                ty(&graph, "Int32"),
                TypeRef::Decl {
                    id: list,
                    args: vec![param(dictionary, &graph, "TKey")],
                },
            ],
        )
        .unwrap();
    assert_eq!(
        signature(&graph, &view, "Get"),
        (vec!["Int32".to_string()], "List<Int32>".to_string())
    );
}

#[test]
fn test_self_referential_binding_is_rejected() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let err = graph
        .bind(
            list,
            vec![TypeRef::Decl {
                id: list,
                args: vec![param(list, &graph, "T")],
            }],
        )
        .unwrap_err();
    match err {
        CatalogError::RecursiveGeneric {
            declaration,
            parameter,
        } => {
            assert_eq!(declaration, "List");
            assert_eq!(parameter, "T");
        }
        other => panic!("expected RecursiveGeneric, got {other:?}"),
    }

    let dictionary = graph.resolve(&["Dictionary"]).unwrap();
    let swapped = graph.bind(
        dictionary,
        vec![
            param(dictionary, &graph, "TValue"),
            param(dictionary, &graph, "TKey"),
        ],
    );
    assert!(matches!(swapped, Err(CatalogError::RecursiveGeneric { .. })));
}

#[test]
fn test_lookup_through_bound_view() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let view = graph.bind(list, vec![ty(&graph, "Int32")]).unwrap();

    let add = graph
        .lookup_bound_member(&view, "Add", &ArgumentHint::Types(vec![ty(&graph, "Int32")]))
        .unwrap();
    assert!(matches!(add, Resolution::Member(_)));

    let err = graph
        .lookup_bound_member(&view, "Add", &ArgumentHint::Types(vec![ty(&graph, "String")]))
        .unwrap_err();
    assert_eq!(err.to_string(), "'Add/1' not found in 'List'");

    let first = graph
        .lookup_bound_member(&view, "First", &ArgumentHint::Arity(0))
        .unwrap();
    let id = first.member().unwrap();
    assert!(graph.declaration(graph.member(id).owner).is_extension());
}

#[test]
fn test_substitution_leaves_unmapped_parameters() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let dictionary = graph.resolve(&["Dictionary"]).unwrap();
    let mut subst = Substitution::default();
    assert!(subst.is_empty());
    let key = GenericParam {
        owner: ParamOwner::Decl(dictionary),
        name: graph.interner().get("TKey").unwrap(),
    };
    subst.insert(key, ty(&graph, "String"));
    assert_eq!(subst.len(), 1);
    assert_eq!(subst.get(&key), Some(&ty(&graph, "String")));

    let applied = subst.apply(&TypeRef::Decl {
        id: dictionary,
        args: vec![TypeRef::Param(key), param(list, &graph, "T")],
    });
    assert_eq!(graph.display_type(&applied), "Dictionary<String, T>");
    assert_eq!(subst.apply(&TypeRef::Void), TypeRef::Void);
}

#[test]
fn test_parameter_bound_to_itself_stays_open() {
    let graph = collections();
    let list = graph.resolve(&["List"]).unwrap();
    let view = graph.bind(list, vec![param(list, &graph, "T")]).unwrap();
    assert!(!view.is_fully_bound());
    assert_eq!(view.args, vec![None]);
    assert_eq!(signature(&graph, &view, "Add"), (vec!["T".to_string()], "void".to_string()));
    assert_eq!(signature(&graph, &view, "First").1, "T");

    let dictionary = graph.resolve(&["Dictionary"]).unwrap();
    let view = graph
        .bind(
            dictionary,
            vec![param(dictionary, &graph, "TKey"), ty(&graph, "String")],
        )
        .unwrap();
    assert_eq!(view.args, vec![None, Some(ty(&graph, "String"))]);
    assert_eq!(
        signature(&graph, &view, "Get"),
        (vec!["TKey".to_string()], "String".to_string())
    );
}
