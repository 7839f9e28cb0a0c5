//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use commands::{
    ExportArgs, ImportArgs, ListArgs, PurgeArgs, SubjectsArgs, SummaryArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "courier-cli",
    version,
    about = "Import and review courier performance spreadsheets"
)]
pub struct Cli {
    /// Config file (defaults to <config dir>/courier-cli/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log every store call
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
    /// Import a performance workbook, one employee per sheet
    Import(ImportArgs),
    /// Delete an employee's records, optionally only one month
    Purge(PurgeArgs),
    /// Show an employee's records
    List(ListArgs),
    /// List employees with stored records
    Subjects(SubjectsArgs),
    /// Bill totals and recent shares for an employee
    Summary(SummaryArgs),
    /// Write an employee's records to an importable workbook
    Export(ExportArgs),
    /// Check the configured credentials
    Login,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Import(args) => commands::import::handle_import_command(args, &config).await,
        Commands::Purge(args) => commands::purge::handle_purge_command(args, &config).await,
        Commands::List(args) => commands::list::handle_list_command(args, &config).await,
        Commands::Subjects(args) => commands::subjects::handle_subjects_command(args, &config).await,
        Commands::Summary(args) => commands::summary::handle_summary_command(args, &config).await,
        Commands::Export(args) => commands::export::handle_export_command(args, &config).await,
        Commands::Login => commands::login::handle_login_command(&config).await,
    }
}
