//! `import` command

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::fs;
use std::path::PathBuf;

use super::connect;
use crate::api::{InMemoryStore, RecordStore, Session};
use crate::config::Config;
use crate::import::{ImportReport, import_workbook};
use crate::reconcile::Reconciler;
use crate::records::{DATE_FIELD, RecordKind, SUBJECT_FIELD};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Workbook to import (xlsx, xls or ods)
    pub file: PathBuf,

    /// Sheet layout: monthly statement or daily sheet
    #[arg(long, value_enum)]
    pub kind: RecordKind,

    /// Import into a scratch in-memory store and show what would be written
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_import_command(args: ImportArgs, config: &Config) -> Result<()> {
    if !args.file.exists() {
        anyhow::bail!("Workbook does not exist: {}", args.file.display());
    }
    let bytes = fs::read(&args.file)
        .with_context(|| format!("Failed to read workbook: {}", args.file.display()))?;

    let profile = config.profile(args.kind);
    println!(
        "Importing {} as {} into '{}'{}",
        args.file.display().to_string().cyan(),
        profile.kind,
        profile.collection.bold(),
        if args.dry_run { " (dry run)".yellow().to_string() } else { String::new() }
    );

    let report = if args.dry_run {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, &profile.collection);
        let report = import_workbook(&bytes, &profile, &reconciler)
            .await
            .context("Failed to import workbook")?;
        print_dry_run(&store, &profile.collection).await;
        report
    } else {
        let connection = connect(config).await?;
        let store: &dyn RecordStore = &connection.store;
        let reconciler = Reconciler::new(store, &connection.session, &profile.collection);
        import_workbook(&bytes, &profile, &reconciler)
            .await
            .context("Failed to import workbook")?
    };

    print_report(&report);

    if let Some(failure) = &report.failure {
        anyhow::bail!("Import stopped at {}", failure);
    }
    Ok(())
}

async fn print_dry_run(store: &InMemoryStore, collection: &str) {
    let records = store.records(collection).await;
    println!();
    println!("{} records would be written:", records.len());
    for record in &records {
        println!(
            "  {} {}",
            record.str_field(SUBJECT_FIELD).unwrap_or("?"),
            record.str_field(DATE_FIELD).unwrap_or("?").dimmed()
        );
    }
    println!();
}

fn print_report(report: &ImportReport) {
    for sheet in &report.sheets {
        let batch = &sheet.batch;
        let line = format!(
            "  {} ({}): {} created, {} updated",
            sheet.sheet, batch.subject, batch.created, batch.updated
        );
        match &batch.failure {
            None => println!("{} {}", "✓".green(), line),
            Some(failure) => {
                println!("{} {}", "✗".red(), line);
                println!("    {} {}", "stopped at".red(), failure);
                println!("    {} records written before the failure", batch.committed());
                if batch.skipped() > 0 {
                    println!("    {} records not attempted", batch.skipped());
                }
            }
        }
    }

    if report.is_success() {
        println!(
            "{} {} sheets, {} created, {} updated",
            "Done:".green().bold(),
            report.sheets.len(),
            report.created(),
            report.updated()
        );
    } else if let Some(failure) = &report.failure {
        println!("{} {}", "Failed:".red().bold(), failure);
    }
}
