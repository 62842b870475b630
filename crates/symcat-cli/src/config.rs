use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use symcat::Language;

pub const CONFIG_FILE_NAME: &str = "symcat.json";

/// Contents of a `symcat.json` catalog config.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogConfig {
    /// Languages that may be queried. `None` enables every language.
    #[serde(default)]
    pub languages: Option<Vec<Language>>,
    /// Extra fixture files per language, loaded after the embedded fixture.
    #[serde(default)]
    pub fixtures: BTreeMap<Language, Vec<PathBuf>>,
    /// Whether the embedded builtin fixtures are loaded.
    #[serde(default = "default_embedded")]
    pub embedded: bool,
}

fn default_embedded() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            languages: None,
            fixtures: BTreeMap::new(),
            embedded: true,
        }
    }
}

impl CatalogConfig {
    pub fn is_enabled(&self, language: Language) -> bool {
        self.languages
            .as_ref()
            .is_none_or(|languages| languages.contains(&language))
    }

    /// Fixture files configured for `language`.
    pub fn fixtures_for(&self, language: Language) -> &[PathBuf] {
        self.fixtures.get(&language).map_or(&[], Vec::as_slice)
    }
}

pub fn parse_config(source: &str) -> Result<CatalogConfig> {
    let config: CatalogConfig = serde_json::from_str(source).context("invalid catalog config")?;
    if let Some(languages) = &config.languages {
        for language in config.fixtures.keys() {
            if !languages.contains(language) {
                bail!("fixtures listed for {language}, which is not in 'languages'");
            }
        }
    }
    Ok(config)
}

/// Read a config file. Relative fixture paths are taken relative to the
/// directory holding the config.
pub fn load_config(path: &Path) -> Result<CatalogConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog config: {}", path.display()))?;
    let mut config = parse_config(&source)
        .with_context(|| format!("failed to parse catalog config: {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for paths in config.fixtures.values_mut() {
        for fixture in paths.iter_mut() {
            if fixture.is_relative() {
                *fixture = base_dir.join(&*fixture);
            }
        }
    }
    Ok(config)
}

/// Load the config named on the command line, or `symcat.json` in `cwd` if
/// one exists, or the default config.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<CatalogConfig> {
    if let Some(path) = explicit {
        let path = if path.is_relative() {
            cwd.join(path)
        } else {
            path.to_path_buf()
        };
        return load_config(&path);
    }
    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        return load_config(&candidate);
    }
    Ok(CatalogConfig::default())
}
