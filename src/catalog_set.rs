//! Catalog Set
//!
//! One independent [`SymbolGraph`] per language. Fixture sources are parsed,
//! grouped by the language they declare, concatenated in source order, and
//! each language is then validated and built on its own rayon task. A
//! language whose build fails is recorded in [`CatalogSet::failures`] and has
//! no graph; the other languages are unaffected.

use rayon::prelude::*;
use std::collections::BTreeMap;
use symcat_catalog::{CatalogError, DeclId, SymbolGraph};
use symcat_common::Language;
use symcat_loader::embedded::{self, EmbeddedFixture};
use symcat_loader::{FixtureRecord, parse_fixture, validate_fixture};
use tracing::{debug, info, info_span, warn};

/// A fixture document and where it came from.
#[derive(Clone, Debug)]
pub struct FixtureSource {
    /// File name or other label, used in failure reports.
    pub name: String,
    pub json: String,
}

impl FixtureSource {
    pub fn new(name: impl Into<String>, json: impl Into<String>) -> Self {
        FixtureSource {
            name: name.into(),
            json: json.into(),
        }
    }

    /// The fixture embedded for `language`, if one ships with symcat.
    pub fn embedded(language: Language) -> Option<Self> {
        embedded::get_fixture(language).map(Self::from)
    }
}

impl From<&EmbeddedFixture> for FixtureSource {
    fn from(fixture: &EmbeddedFixture) -> Self {
        FixtureSource::new(fixture.file_name, fixture.content)
    }
}

/// A source or language that produced no graph.
#[derive(Debug)]
pub struct BuildFailure {
    /// `None` when the source could not be parsed far enough to tell.
    pub language: Option<Language>,
    /// Names of the sources involved, joined with `, `.
    pub sources: String,
    pub error: CatalogError,
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.language {
            Some(language) => write!(f, "{language} ({}): {}", self.sources, self.error),
            None => write!(f, "{}: {}", self.sources, self.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct CatalogSet {
    catalogs: BTreeMap<Language, SymbolGraph>,
    failures: Vec<BuildFailure>,
}

/// All fixture records of one language, merged.
struct LanguageInput {
    language: Language,
    sources: Vec<String>,
    record: FixtureRecord,
}

impl CatalogSet {
    /// Build every language found in `sources`.
    pub fn build(sources: &[FixtureSource]) -> Self {
        let _span = info_span!("build_catalog_set", sources = sources.len()).entered();
        let mut failures = Vec::new();
        let mut inputs: BTreeMap<Language, LanguageInput> = BTreeMap::new();

        for source in sources {
            let record = match parse_fixture(&source.json) {
                Ok(record) => record,
                Err(err) => {
                    warn!(source = %source.name, error = %err, "fixture source rejected");
                    failures.push(BuildFailure {
                        language: None,
                        sources: source.name.clone(),
                        error: err.into(),
                    });
                    continue;
                }
            };
            match inputs.get_mut(&record.language) {
                Some(input) => {
                    input.sources.push(source.name.clone());
                    input.record.imports.extend(record.imports);
                    input.record.conversions.extend(record.conversions);
                    input.record.declarations.extend(record.declarations);
                }
                None => {
                    inputs.insert(
                        record.language,
                        LanguageInput {
                            language: record.language,
                            sources: vec![source.name.clone()],
                            record,
                        },
                    );
                }
            }
        }
        debug!(languages = inputs.len(), "grouped fixture sources");

        let built: Vec<(Language, String, Result<SymbolGraph, CatalogError>)> = inputs
            .into_values()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|input| {
                let graph = validate_fixture(input.record)
                    .map_err(CatalogError::from)
                    .and_then(|fixture| SymbolGraph::build(&fixture));
                (input.language, input.sources.join(", "), graph)
            })
            .collect();

        let mut catalogs = BTreeMap::new();
        for (language, sources, result) in built {
            match result {
                Ok(graph) => {
                    catalogs.insert(language, graph);
                }
                Err(error) => {
                    warn!(%language, %error, "catalog build failed");
                    failures.push(BuildFailure {
                        language: Some(language),
                        sources,
                        error,
                    });
                }
            }
        }
        info!(
            built = catalogs.len(),
            failed = failures.len(),
            "catalog set ready"
        );
        CatalogSet { catalogs, failures }
    }

    /// Build the embedded fixtures of `languages`. Languages without an
    /// embedded fixture are skipped.
    pub fn embedded(languages: impl IntoIterator<Item = Language>) -> Self {
        let sources: Vec<FixtureSource> = languages
            .into_iter()
            .filter_map(FixtureSource::embedded)
            .collect();
        Self::build(&sources)
    }

    /// Build every embedded fixture.
    pub fn all_embedded() -> Self {
        Self::embedded(embedded::embedded_languages())
    }

    pub fn graph(&self, language: Language) -> Option<&SymbolGraph> {
        self.catalogs.get(&language)
    }

    /// Languages with a graph, in `Language` order.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.catalogs.keys().copied()
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    fn require(&self, language: Language) -> Result<&SymbolGraph, CatalogError> {
        self.graph(language).ok_or_else(|| CatalogError::NotFound {
            scope: "this catalog set".to_string(),
            name: language.to_string(),
        })
    }

    /// Resolve a qualified path in `language`'s catalog.
    pub fn resolve<S: AsRef<str>>(
        &self,
        language: Language,
        path: &[S],
    ) -> Result<DeclId, CatalogError> {
        self.require(language)?.resolve(path)
    }

    /// Top-level declarations of `language`'s catalog.
    pub fn list_top_level(&self, language: Language) -> Result<Vec<DeclId>, CatalogError> {
        Ok(self.require(language)?.list_top_level().collect())
    }
}

#[cfg(test)]
#[path = "tests/catalog_set_unit_tests.rs"]
mod tests;
