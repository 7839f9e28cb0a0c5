//! `export` command

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::fs;
use std::path::PathBuf;

use super::{connect, fetch_records};
use crate::config::Config;
use crate::export::{chronological, export_workbook};
use crate::import::MonthlyMapping;
use crate::reconcile::Reconciler;
use crate::records::{KeyedRecord, RecordKind, RecordSet};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Employee name
    pub subject: String,

    #[arg(long, value_enum)]
    pub kind: RecordKind,

    /// Destination .xlsx file
    #[arg(short, long)]
    pub output: PathBuf,
}

pub async fn handle_export_command(args: ExportArgs, config: &Config) -> Result<()> {
    let profile = config.profile(args.kind);
    let connection = connect(config).await?;
    let reconciler = Reconciler::new(&connection.store, &connection.session, &profile.collection);

    let records = match fetch_records(&reconciler, args.kind, &args.subject, None, None).await? {
        RecordSet::Monthly(rows) => RecordSet::Monthly(chronological(&rows, |r| r.date())),
        RecordSet::Daily(rows) => RecordSet::Daily(chronological(&rows, |r| r.date())),
    };
    if records.is_empty() {
        anyhow::bail!("No {} records for {}", args.kind, args.subject);
    }

    let mapping = MonthlyMapping::with_prefix(&profile.delivery_prefix);
    let bytes = export_workbook(&args.subject, &records, &mapping)?;
    fs::write(&args.output, bytes)
        .with_context(|| format!("Failed to write workbook: {}", args.output.display()))?;

    println!(
        "{} {} records of {} saved to {}",
        "✓".green(),
        records.len(),
        args.subject.bold(),
        args.output.display().to_string().bright_green()
    );
    Ok(())
}
