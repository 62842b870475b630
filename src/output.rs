//! Catalog rendering.
//!
//! - [`catalog_summary`] / [`render_json`]: a serializable dump of every
//!   declaration with its bases, lookup order and members
//! - [`render_dot`]: the inheritance graph in Graphviz DOT form, one node per
//!   type declaration, one edge per base reference or extension

use serde::Serialize;
use std::fmt::Write;
use symcat_catalog::{DeclId, SymbolGraph, Via};
use symcat_common::Language;
use symcat_loader::{BaseRelation, DeclKind};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub language: Language,
    pub declaration_count: usize,
    pub member_count: usize,
    pub top_level: Vec<String>,
    pub declarations: Vec<DeclarationSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationSummary {
    pub path: String,
    pub kind: DeclKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<BaseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub lookup_order: Vec<LookupEntrySummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BaseSummary {
    pub relation: BaseRelation,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct LookupEntrySummary {
    pub path: String,
    pub distance: u32,
    pub via: Via,
}

/// Summarize one declaration. The global scope is skipped by callers; it
/// has no path of its own.
pub fn declaration_summary(graph: &SymbolGraph, id: DeclId) -> DeclarationSummary {
    let decl = graph.declaration(id);
    DeclarationSummary {
        path: graph.display_path(id),
        kind: decl.kind,
        generics: decl
            .generics
            .iter()
            .map(|&g| graph.name(g).to_string())
            .collect(),
        bases: decl
            .bases
            .iter()
            .map(|base| BaseSummary {
                relation: base.relation,
                target: graph.display_path(base.target),
            })
            .collect(),
        extends: decl.extends.as_ref().map(|ty| graph.display_type(ty)),
        lookup_order: graph
            .linearization(id)
            .iter()
            .map(|entry| LookupEntrySummary {
                path: graph.display_path(entry.decl),
                distance: entry.distance,
                via: entry.via,
            })
            .collect(),
        members: decl
            .members
            .iter()
            .filter(|&&member| graph.member(member).owner == id)
            .map(|&member| graph.display_member(member))
            .collect(),
    }
}

pub fn catalog_summary(graph: &SymbolGraph) -> CatalogSummary {
    CatalogSummary {
        language: graph.language(),
        declaration_count: graph.declarations().len() - 1,
        member_count: graph.members().len(),
        top_level: graph
            .list_top_level()
            .map(|id| graph.display_path(id))
            .collect(),
        declarations: graph
            .declarations()
            .iter()
            .filter(|decl| decl.id != DeclId::ROOT)
            .map(|decl| declaration_summary(graph, decl.id))
            .collect(),
    }
}

/// Pretty-printed JSON of [`catalog_summary`].
pub fn render_json(graph: &SymbolGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&catalog_summary(graph))
}

fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The inheritance graph in DOT. Edges point from a declaration to its
/// bases; extensions point to their target with a dashed edge.
pub fn render_dot(graph: &SymbolGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", graph.language());
    let _ = writeln!(out, "  rankdir=BT;");
    let _ = writeln!(out, "  node [shape=box, fontname=\"monospace\"];");

    let types = graph
        .declarations()
        .iter()
        .filter(|decl| decl.is_type_like());
    for decl in types.clone() {
        let shape = match decl.kind {
            DeclKind::Interface => ", style=rounded",
            DeclKind::Module => ", style=dashed",
            DeclKind::Extension => ", style=dotted",
            _ => "",
        };
        let _ = writeln!(
            out,
            "  d{} [label=\"{}\"{shape}];",
            decl.id.0,
            dot_escape(&graph.display_path(decl.id))
        );
    }
    for decl in types {
        for base in &decl.bases {
            let style = match base.relation {
                BaseRelation::Superclass => "solid",
                BaseRelation::Interface => "dashed",
                BaseRelation::Include => "bold",
            };
            let _ = writeln!(
                out,
                "  d{} -> d{} [label=\"{}\", style={style}];",
                decl.id.0,
                base.target.0,
                base.relation.as_str()
            );
        }
        if let Some(target) = decl.extension_target() {
            let _ = writeln!(
                out,
                "  d{} -> d{} [label=\"extends\", style=dotted];",
                decl.id.0, target.0
            );
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
#[path = "tests/output_tests.rs"]
mod tests;
