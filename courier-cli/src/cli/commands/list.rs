//! `list` command

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{connect, fetch_records};
use crate::config::Config;
use crate::reconcile::Reconciler;
use crate::records::{DailyPerformanceRecord, PerformanceRecord, RecordKind, RecordSet};
use crate::services::format_money;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Employee name
    pub subject: String,

    #[arg(long, value_enum)]
    pub kind: RecordKind,

    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Write the rows to a CSV file instead of printing them
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub async fn handle_list_command(args: ListArgs, config: &Config) -> Result<()> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            anyhow::bail!("--from {} is after --to {}", from, to);
        }
    }

    let profile = config.profile(args.kind);
    let connection = connect(config).await?;
    let reconciler = Reconciler::new(&connection.store, &connection.session, &profile.collection);

    let records = fetch_records(&reconciler, args.kind, &args.subject, args.from, args.to).await?;

    if let Some(path) = &args.csv {
        match &records {
            RecordSet::Monthly(rows) => write_csv(path, rows)?,
            RecordSet::Daily(rows) => write_csv(path, rows)?,
        }
        println!(
            "{} {} records written to {}",
            "✓".green(),
            records.len(),
            path.display().to_string().bright_green()
        );
        return Ok(());
    }

    if records.is_empty() {
        println!("No {} records for {}", args.kind, args.subject.bold());
        return Ok(());
    }

    match &records {
        RecordSet::Monthly(rows) => print_monthly(rows),
        RecordSet::Daily(rows) => print_daily(rows),
    }
    Ok(())
}

fn write_csv<R: Serialize>(path: &Path, rows: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn int_cell(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn money_cell(value: Option<f64>) -> String {
    value.map(format_money).unwrap_or_else(|| "-".to_string())
}

fn print_monthly(rows: &[PerformanceRecord]) {
    println!(
        "{}",
        format!(
            "{:<10} {:>6} {:>8} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6} {:>8} {:>9}",
            "date", "count", "weight", "qty", "freight", "transfer", "scan", "fund", "e-order",
            "p.share", "d.cnt", "d.weight", "d.share"
        )
        .bold()
    );
    for r in rows {
        println!(
            "{:<10} {:>6} {:>8} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6} {:>8} {:>9}",
            date_cell(r.date),
            int_cell(r.pickup_count),
            money_cell(r.weight),
            int_cell(r.quantity),
            money_cell(r.freight),
            money_cell(r.transfer_fee),
            money_cell(r.scanning_fee),
            money_cell(r.fund_fee),
            money_cell(r.electronic_order),
            money_cell(r.pickup_share),
            int_cell(r.delivery_count),
            money_cell(r.delivery_weight),
            money_cell(r.delivery_share),
        );
    }
    println!("{} records", rows.len());
}

fn print_daily(rows: &[DailyPerformanceRecord]) {
    println!(
        "{}",
        format!(
            "{:<10} {:>6} {:>8} {:>9} {:>6} {:>8} {:>9}",
            "date", "count", "weight", "p.share", "d.cnt", "d.weight", "d.share"
        )
        .bold()
    );
    for r in rows {
        println!(
            "{:<10} {:>6} {:>8} {:>9} {:>6} {:>8} {:>9}",
            date_cell(r.date),
            int_cell(r.pickup_count),
            money_cell(r.weight),
            money_cell(r.pickup_share),
            int_cell(r.delivery_count),
            money_cell(r.delivery_weight),
            money_cell(r.delivery_share),
        );
    }
    println!("{} records", rows.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_uses_store_field_names() {
        let path = std::env::temp_dir().join(format!("courier-list-{}.csv", uuid::Uuid::new_v4()));
        let rows = vec![DailyPerformanceRecord {
            subject: "张三".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 1),
            pickup_count: Some(3),
            weight: Some(1.5),
            ..Default::default()
        }];

        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("name,date,pickupCount,weight,pickupShare,deliveryCount,deliveryWeight,deliveryShare")
        );
        assert_eq!(lines.next(), Some("张三,2024-12-01,3,1.5,,,,"));
    }

    #[test]
    fn test_cells() {
        assert_eq!(money_cell(Some(2.0)), "2.00");
        assert_eq!(money_cell(None), "-");
        assert_eq!(int_cell(Some(7)), "7");
        assert_eq!(date_cell(None), "-");
    }
}
