use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{CatalogError, Result};

#[derive(Parser, Debug)]
#[command(name = "hteng-catalog", author, version, about = "Inspect and query the EOCR product table")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "HTENG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Product CSV, overriding the configured path
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the product table and report row counts
    Load,
    /// List every product
    List(ListArgs),
    /// Filter products with KEY=VALUE predicates
    Filter(FilterArgs),
    /// Suggest product names for a partial query
    Suggest(SuggestArgs),
    /// Show distinct values of each filterable column
    Facets,
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Predicates such as 제품군=전자식 or 누설지락=O
    #[arg(value_parser = parse_predicate)]
    pub predicates: Vec<(String, String)>,

    #[arg(short, long)]
    pub limit: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct SuggestArgs {
    pub query: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Split `KEY=VALUE` at the first `=`.
pub fn parse_predicate(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| CatalogError::InvalidQuery(format!("expected KEY=VALUE, got '{}'", s)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(CatalogError::InvalidQuery(format!("empty key in '{}'", s)));
    }

    Ok((key.to_string(), value.to_string()))
}
