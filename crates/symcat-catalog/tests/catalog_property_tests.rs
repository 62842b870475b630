//! Whole-catalog properties: determinism, immutability under concurrent
//! queries, and lookup-order invariants that hold for every fixture.

use rayon::prelude::*;
use std::collections::HashSet;
use symcat_catalog::{ArgumentHint, Resolution, SymbolGraph, Via};
use symcat_common::Language;
use symcat_loader::embedded::embedded_languages;

fn catalog(language: Language) -> SymbolGraph {
    SymbolGraph::embedded(language)
        .unwrap_or_else(|| panic!("no embedded fixture for {language}"))
        .unwrap_or_else(|err| panic!("{language} catalog failed to build: {err}"))
}

/// Every lookup order and every member, rendered as text.
fn snapshot(graph: &SymbolGraph) -> Vec<String> {
    let mut lines = Vec::new();
    for declaration in graph.declarations() {
        let order: Vec<String> = graph
            .linearization(declaration.id)
            .iter()
            .map(|entry| {
                format!(
                    "{}@{}:{}",
                    graph.display_path(entry.decl),
                    entry.distance,
                    entry.via.as_str()
                )
            })
            .collect();
        lines.push(format!("{} => {}", graph.display_path(declaration.id), order.join(", ")));
    }
    for member in graph.members() {
        lines.push(graph.display_member(member.id));
    }
    lines
}

#[test]
fn test_builds_are_deterministic() {
    for language in embedded_languages() {
        let first = snapshot(&catalog(language));
        let second = snapshot(&catalog(language));
        assert_eq!(first, second, "{language}");
    }
}

#[test]
fn test_parallel_builds_match_sequential_builds() {
    let languages: Vec<Language> = embedded_languages().collect();
    let parallel: Vec<Vec<String>> = languages
        .par_iter()
        .map(|&language| snapshot(&catalog(language)))
        .collect();
    for (language, snapshot_parallel) in languages.iter().zip(&parallel) {
        assert_eq!(&snapshot(&catalog(*language)), snapshot_parallel, "{language}");
    }
}

#[test]
fn test_lookup_orders_have_no_duplicates() {
    for language in embedded_languages() {
        let graph = catalog(language);
        for declaration in graph.declarations() {
            let order = graph.linearization(declaration.id);
            let unique: HashSet<_> = order.iter().map(|entry| entry.decl).collect();
            assert_eq!(
                unique.len(),
                order.len(),
                "{language}: {}",
                graph.display_path(declaration.id)
            );
            assert_eq!(order[0].via, Via::Own);
            assert!(order[1..].iter().all(|entry| entry.via != Via::Own));
        }
    }
}

#[test]
fn test_extensions_share_their_target_distance() {
    for language in embedded_languages() {
        let graph = catalog(language);
        for declaration in graph.declarations() {
            let order = graph.linearization(declaration.id);
            for entry in order.iter().filter(|entry| entry.via == Via::Extension) {
                let target = graph
                    .declaration(entry.decl)
                    .extension_target()
                    .unwrap_or_else(|| panic!("{language}: extension without target"));
                let target_entry = order
                    .iter()
                    .find(|candidate| candidate.decl == target)
                    .unwrap_or_else(|| panic!("{language}: extension before its target"));
                assert_eq!(entry.distance, target_entry.distance);
            }
        }
    }
}

#[test]
fn test_concurrent_binding_does_not_interfere() {
    let graph = catalog(Language::CSharp);
    let list = graph
        .resolve(&["System", "Collections", "Generic", "List"])
        .unwrap();
    let argument_types = ["System.Int32", "System.String", "System.Double", "System.Boolean"];

    let results: Vec<(String, String)> = std::thread::scope(|scope| {
        let handles: Vec<_> = argument_types
            .iter()
            .map(|&text| {
                let graph = &graph;
                scope.spawn(move || {
                    let arg = graph.resolve_type(text).unwrap();
                    let last = (0..50)
                        .map(|_| {
                            let view = graph.bind(list, vec![arg.clone()]).unwrap();
                            let add = graph
                                .lookup_bound_member(
                                    &view,
                                    "Add",
                                    &ArgumentHint::Types(vec![arg.clone()]),
                                )
                                .unwrap()
                                .member()
                                .unwrap();
                            graph.display_type(&graph.bound_signature(&view, add).unwrap().params[0])
                        })
                        .last()
                        .unwrap();
                    (text.to_string(), last)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for (expected, shown) in results {
        assert_eq!(expected, shown);
    }
    let add = graph.overload_set(list, "Add").unwrap().members[0];
    assert_eq!(graph.display_member(add), "System.Collections.Generic.List.Add(T) -> System.Void");
}

#[test]
fn test_parallel_queries_agree_with_sequential_queries() {
    let graph = catalog(Language::Swift);
    let int = graph.resolve(&["Int"]).unwrap();
    let names: Vec<String> = graph
        .members()
        .iter()
        .map(|member| graph.name(member.name).to_string())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let query = |name: &String| match graph.lookup_member(int, name, &ArgumentHint::None) {
        Ok(Resolution::Member(id)) => format!("{name}: {}", graph.display_member(id)),
        Ok(other) => format!("{name}: {} candidates", other.candidates().len()),
        Err(err) => format!("{name}: {err}"),
    };
    let sequential: Vec<String> = names.iter().map(query).collect();
    let parallel: Vec<String> = names.par_iter().map(query).collect();
    assert_eq!(sequential, parallel);
}
