use anyhow::{Context, Result};
use clap::Parser;

use hteng_catalog::{
    cli::CliApp,
    cli_types::{Cli, Commands},
    config::ServerConfig,
    logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_stderr(if cli.verbose { "debug" } else { "warn" });

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = ServerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(csv) = cli.csv {
        config.csv_path = csv;
    }

    let mut app = CliApp::new(config, cli.verbose);

    match cli.command {
        Commands::Load => app.load(),
        Commands::List(args) => app.list(args),
        Commands::Filter(args) => app.filter(args),
        Commands::Suggest(args) => app.suggest(args),
        Commands::Facets => app.facets(),
        Commands::Config => app.show_config(),
    }
}
