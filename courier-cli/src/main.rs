mod api;
mod cli;
mod config;
mod export;
mod import;
mod reconcile;
mod records;
mod services;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use cli::Cli;

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,courier_cli=info"));
    if verbose {
        builder.filter_module("courier_cli", LevelFilter::Debug);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    cli::run(cli).await
}
