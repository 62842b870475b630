use anyhow::{Context, Result, anyhow, bail};
use std::fmt::Write;
use std::path::Path;
use tracing::{debug, info};

use symcat::output::{render_dot, render_json};
use symcat::{
    ArgumentHint, BoundView, CatalogError, CatalogSet, DeclId, FixtureSource, Language, MemberId,
    Resolution, SymbolGraph, TypeRef,
};

use crate::args::{CliArgs, Command, DumpFormat, MembersArgs};
use crate::config::{CatalogConfig, resolve_config};

/// Run one command. Returns the text to print on stdout.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<String> {
    let config = resolve_config(args.config.as_deref(), cwd)?;
    let language = args.command.language();
    let set = build_catalog(args, &config, language, cwd)?;
    let graph = set
        .graph(language)
        .ok_or_else(|| anyhow!("no catalog available for {language}"))?;

    match &args.command {
        Command::List { .. } => Ok(list(graph)),
        Command::Resolve { path, .. } => resolve(graph, path),
        Command::Members(members) => lookup_members(graph, members),
        Command::Linearize { declaration, .. } => linearize(graph, declaration),
        Command::Dump { format, output, .. } => {
            let text = match format {
                DumpFormat::Json => render_json(graph).context("failed to serialize catalog")?,
                DumpFormat::Dot => render_dot(graph),
            };
            match output {
                Some(path) => {
                    let path = cwd.join(path);
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "catalog written");
                    Ok(String::new())
                }
                None => Ok(text),
            }
        }
    }
}

/// Collect the fixture sources for `language` and build its catalog.
pub fn build_catalog(
    args: &CliArgs,
    config: &CatalogConfig,
    language: Language,
    cwd: &Path,
) -> Result<CatalogSet> {
    if !config.is_enabled(language) {
        bail!("{language} is not enabled in the catalog config");
    }

    let mut sources = Vec::new();
    if config.embedded && !args.no_embedded {
        sources.extend(FixtureSource::embedded(language));
    }
    let extra = config.fixtures_for(language).iter().cloned().chain(
        args.fixtures
            .iter()
            .filter(|(lang, _)| *lang == language)
            .map(|(_, path)| cwd.join(path)),
    );
    for path in extra {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read fixture: {}", path.display()))?;
        sources.push(FixtureSource::new(path.display().to_string(), json));
    }
    if sources.is_empty() {
        bail!("no fixtures for {language}");
    }
    debug!(%language, sources = sources.len(), "building catalog");

    let set = CatalogSet::build(&sources);
    if let Some(failure) = set.failures().first() {
        bail!("catalog build failed: {failure}");
    }
    Ok(set)
}

fn list(graph: &SymbolGraph) -> String {
    let mut out = String::new();
    for id in graph.list_top_level() {
        let _ = writeln!(out, "{}", declaration_line(graph, id));
    }
    out
}

fn declaration_line(graph: &SymbolGraph, id: DeclId) -> String {
    let decl = graph.declaration(id);
    let mut line = format!("{} {}", decl.kind.as_str(), graph.display_path(id));
    if !decl.generics.is_empty() {
        let params: Vec<&str> = decl.generics.iter().map(|&g| graph.name(g)).collect();
        let _ = write!(line, "<{}>", params.join(", "));
    }
    if let Some(target) = &decl.extends {
        let _ = write!(line, " of {}", graph.display_type(target));
    }
    line
}

fn resolve(graph: &SymbolGraph, path: &str) -> Result<String> {
    let id = graph.resolve_qualified(path)?;
    let decl = graph.declaration(id);
    let mut out = String::new();
    let _ = writeln!(out, "{}", declaration_line(graph, id));
    for base in &decl.bases {
        let _ = writeln!(
            out,
            "  {} {}",
            base.relation.as_str(),
            graph.display_path(base.target)
        );
    }
    for &child in decl.children.values() {
        let _ = writeln!(out, "  {}", declaration_line(graph, child));
    }
    for &member in &decl.members {
        if graph.member(member).owner == id {
            let _ = writeln!(out, "  {}", graph.display_member(member));
        }
    }
    Ok(out)
}

fn linearize(graph: &SymbolGraph, declaration: &str) -> Result<String> {
    let id = graph.resolve_qualified(declaration)?;
    let mut out = String::new();
    for entry in graph.linearization(id) {
        let _ = writeln!(
            out,
            "{:>3} {:<10} {}",
            entry.distance,
            entry.via.as_str(),
            graph.display_path(entry.decl)
        );
    }
    Ok(out)
}

fn resolve_types(graph: &SymbolGraph, texts: &[String]) -> Result<Vec<TypeRef>> {
    texts
        .iter()
        .map(|text| {
            graph
                .resolve_type(text)
                .with_context(|| format!("invalid type '{text}'"))
        })
        .collect()
}

fn lookup_members(graph: &SymbolGraph, args: &MembersArgs) -> Result<String> {
    let decl = graph.resolve_qualified(&args.declaration)?;
    let hint = match args.arity {
        Some(arity) => ArgumentHint::Arity(arity),
        None if !args.types.is_empty() => ArgumentHint::Types(resolve_types(graph, &args.types)?),
        None => ArgumentHint::None,
    };
    let view = if args.bind.is_empty() {
        None
    } else {
        Some(graph.bind(decl, resolve_types(graph, &args.bind)?)?)
    };

    let result = match &view {
        Some(view) => graph.lookup_bound_member(view, &args.name, &hint),
        None => graph.lookup_member(decl, &args.name, &hint),
    };
    let resolution = match result {
        Ok(resolution) => resolution,
        Err(CatalogError::AmbiguousOverload { candidates, .. }) => {
            let err = ambiguity_error(graph, view.as_ref(), &args.name, decl, &candidates);
            return Err(err);
        }
        Err(err) => return Err(err.into()),
    };

    let mut out = String::new();
    match &resolution {
        Resolution::Member(_) => {}
        Resolution::Set(set) => {
            let _ = writeln!(out, "{} overloads:", set.len());
        }
        Resolution::Dynamic(set) => {
            let _ = writeln!(out, "{} candidates, bound at runtime:", set.len());
        }
    }
    for &member in resolution.candidates() {
        let _ = writeln!(out, "{}", member_line(graph, view.as_ref(), member));
    }
    Ok(out)
}

fn member_line(graph: &SymbolGraph, view: Option<&BoundView>, member: MemberId) -> String {
    let shown = graph.display_member(member);
    let Some(view) = view else {
        return shown;
    };
    let Ok(signature) = graph.bound_signature(view, member) else {
        return shown;
    };
    let params: Vec<String> = signature
        .params
        .iter()
        .map(|ty| graph.display_type(ty))
        .collect();
    let mut line = format!("{shown}  [({})", params.join(", "));
    if signature.returns != TypeRef::Void {
        let _ = write!(line, " -> {}", graph.display_type(&signature.returns));
    }
    line.push(']');
    line
}

fn ambiguity_error(
    graph: &SymbolGraph,
    view: Option<&BoundView>,
    name: &str,
    decl: DeclId,
    candidates: &[MemberId],
) -> anyhow::Error {
    let mut message = format!(
        "ambiguous reference to '{name}' on '{}'; candidates:",
        graph.display_path(decl)
    );
    for &member in candidates {
        let _ = write!(message, "\n  {}", member_line(graph, view, member));
    }
    anyhow!(message)
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
