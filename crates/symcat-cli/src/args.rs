use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use symcat::Language;

/// CLI arguments for the symcat binary.
#[derive(Parser, Debug)]
#[command(
    name = "symcat",
    version,
    about = "Inspect builtin symbol catalogs for cross-language name resolution"
)]
pub struct CliArgs {
    /// Path to a symcat.json catalog config. Defaults to ./symcat.json when present.
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra fixture file for one language, as `<language>=<path>`. Repeatable.
    #[arg(long = "fixture", value_parser = parse_fixture_arg, global = true)]
    pub fixtures: Vec<(Language, PathBuf)>,

    /// Do not load the embedded builtin fixtures.
    #[arg(long = "no-embedded", alias = "noEmbedded", global = true)]
    pub no_embedded: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the top-level declarations of a catalog.
    List {
        language: Language,
    },
    /// Resolve a qualified path and show the declaration.
    Resolve {
        language: Language,
        /// Qualified path, using any of `.`, `::` or `\` as separator.
        path: String,
    },
    /// Look up a member by name along a declaration's lookup order.
    Members(MembersArgs),
    /// Print the lookup order of a declaration.
    Linearize {
        language: Language,
        declaration: String,
    },
    /// Dump a whole catalog as JSON or as a DOT inheritance graph.
    Dump {
        language: Language,
        #[arg(short = 'f', long, value_enum, default_value_t = DumpFormat::Json)]
        format: DumpFormat,
        /// Write to this file instead of stdout.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct MembersArgs {
    pub language: Language,
    /// Declaration to search from.
    pub declaration: String,
    /// Member name.
    pub name: String,

    /// Number of call-site arguments.
    #[arg(long, conflicts_with = "types")]
    pub arity: Option<usize>,

    /// Type of one call-site argument, in order. Repeatable.
    #[arg(long = "type", id = "types")]
    pub types: Vec<String>,

    /// Type argument for the declaration's generic parameters, in order. Repeatable.
    #[arg(long = "bind")]
    pub bind: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Json,
    Dot,
}

impl Command {
    pub fn language(&self) -> Language {
        match self {
            Command::List { language }
            | Command::Resolve { language, .. }
            | Command::Linearize { language, .. }
            | Command::Dump { language, .. } => *language,
            Command::Members(members) => members.language,
        }
    }
}

fn parse_fixture_arg(value: &str) -> Result<(Language, PathBuf), String> {
    let (language, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <language>=<path>, got '{value}'"))?;
    let language = language.parse::<Language>().map_err(|err| err.to_string())?;
    if path.is_empty() {
        return Err(format!("missing fixture path for {language}"));
    }
    Ok((language, PathBuf::from(path)))
}
