//! `purge` command

use anyhow::Result;
use clap::Args;
use colored::*;

use super::connect;
use crate::config::Config;
use crate::reconcile::Reconciler;
use crate::records::RecordKind;

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Employee name
    pub subject: String,

    #[arg(long, value_enum)]
    pub kind: RecordKind,

    /// Limit to one month (with --month)
    #[arg(long, requires = "month")]
    pub year: Option<i32>,

    /// Month number 1-12 (with --year)
    #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

pub async fn handle_purge_command(args: PurgeArgs, config: &Config) -> Result<()> {
    let profile = config.profile(args.kind);
    let connection = connect(config).await?;
    let reconciler = Reconciler::new(&connection.store, &connection.session, &profile.collection);

    let report = match (args.year, args.month) {
        (Some(year), Some(month)) => {
            println!(
                "Purging {} records of {} for {}-{:02}",
                profile.kind,
                args.subject.bold(),
                year,
                month
            );
            reconciler
                .purge_by_subject_and_month(&args.subject, year, month)
                .await
        }
        _ => {
            println!("Purging all {} records of {}", profile.kind, args.subject.bold());
            reconciler.purge_by_subject(&args.subject).await
        }
    };

    match &report.failure {
        None => {
            println!(
                "{} deleted {} records",
                "✓".green(),
                report.deleted
            );
            Ok(())
        }
        Some(err) => {
            println!(
                "{} deleted {} of {} records",
                "✗".red(),
                report.deleted,
                report.matched
            );
            anyhow::bail!("Purge stopped: {}", err)
        }
    }
}
