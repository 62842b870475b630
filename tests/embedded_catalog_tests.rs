//! JSON and DOT renderings of the embedded catalogs.

use serde_json::Value;
use symcat::output::{catalog_summary, render_dot, render_json};
use symcat::{CatalogSet, Language, SymbolGraph};

fn graph(set: &CatalogSet, language: Language) -> &SymbolGraph {
    set.graph(language)
        .unwrap_or_else(|| panic!("{language} catalog missing: {:?}", set.failures()))
}

fn find<'a>(summary: &'a Value, path: &str) -> &'a Value {
    summary["declarations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|decl| decl["path"] == path)
        .unwrap_or_else(|| panic!("{path} missing from summary"))
}

#[test]
fn test_csharp_json_summary() {
    let set = CatalogSet::embedded([Language::CSharp]);
    let graph = graph(&set, Language::CSharp);
    let summary: Value = serde_json::from_str(&render_json(graph).unwrap()).unwrap();

    assert_eq!(summary["language"], "csharp");
    assert_eq!(summary["topLevel"], serde_json::json!(["System"]));
    assert_eq!(
        summary["declarationCount"].as_u64().unwrap() as usize,
        graph.declarations().len() - 1
    );

    let exception = find(&summary, "System.ArgumentNullException");
    assert_eq!(exception["kind"], "class");
    assert_eq!(
        exception["bases"],
        serde_json::json!([{ "relation": "superclass", "target": "System.ArgumentException" }])
    );
    let order: Vec<&str> = exception["lookupOrder"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        order,
        vec![
            "System.ArgumentNullException",
            "System.ArgumentException",
            "System.SystemException",
            "System.Exception",
            "System.Object",
        ]
    );
    assert_eq!(exception["lookupOrder"][4]["distance"], 4);
    assert_eq!(exception["lookupOrder"][1]["via"], "superclass");

    let namespace = find(&summary, "System");
    assert!(namespace.get("members").is_none());
    assert!(namespace.get("bases").is_none());
}

#[test]
fn test_summaries_cover_every_member_once() {
    let set = CatalogSet::all_embedded();
    for language in set.languages() {
        let graph = graph(&set, language);
        let summary = catalog_summary(graph);
        let listed: usize = summary
            .declarations
            .iter()
            .map(|decl| decl.members.len())
            .sum();
        assert_eq!(listed, summary.member_count, "{language}");
        assert_eq!(summary.language, language);
    }
}

#[test]
fn test_csharp_dot_edges() {
    let set = CatalogSet::embedded([Language::CSharp]);
    let graph = graph(&set, Language::CSharp);
    let dot = render_dot(graph);
    let id = |path: &str| graph.resolve_qualified(path).unwrap().0;

    assert!(dot.starts_with("digraph \"csharp\" {\n"));
    assert!(dot.ends_with("}\n"));
    assert!(dot.contains(&format!(
        "  d{} -> d{} [label=\"superclass\", style=solid];",
        id("System.String"),
        id("System.Object")
    )));
    assert!(dot.contains(&format!(
        "  d{} -> d{} [label=\"interface\", style=dashed];",
        id("System.String"),
        id("System.ICloneable")
    )));
    assert!(dot.contains(&format!(
        "  d{} [label=\"System.IDisposable\", style=rounded];",
        id("System.IDisposable")
    )));
    assert!(!dot.contains(&format!("  d{} [", id("System"))));
}

#[test]
fn test_swift_dot_extension_edges() {
    let set = CatalogSet::embedded([Language::Swift]);
    let graph = graph(&set, Language::Swift);
    let dot = render_dot(graph);
    let array = graph.resolve_qualified("Array").unwrap();
    let extensions = graph.extensions_of(array);
    assert!(!extensions.is_empty());
    for extension in extensions {
        assert!(dot.contains(&format!(
            "  d{} -> d{} [label=\"extends\", style=dotted];",
            extension.0, array.0
        )));
    }
}
