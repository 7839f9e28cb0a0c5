//! `summary` command: the employee bill view

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use clap::Args;
use colored::*;

use super::connect;
use crate::config::Config;
use crate::reconcile::Reconciler;
use crate::records::{PerformanceRecord, RecordKind};
use crate::services::{DayShares, PerformanceSummary, format_money, recent_shares, summarize};

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Employee name
    pub subject: String,

    /// First date of the bill period (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last date of the bill period (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// Reference day for the recent shares (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

pub async fn handle_summary_command(args: SummaryArgs, config: &Config) -> Result<()> {
    if args.from > args.to {
        anyhow::bail!("--from {} is after --to {}", args.from, args.to);
    }

    let profile = config.profile(RecordKind::Monthly);
    let connection = connect(config).await?;
    let reconciler = Reconciler::new(&connection.store, &connection.session, &profile.collection);

    let period: Vec<PerformanceRecord> = reconciler
        .list_range(&args.subject, args.from, args.to)
        .await?;
    let summary = summarize(&period);

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let window_start = today.checked_sub_days(Days::new(2)).unwrap_or(today);
    let recent: Vec<PerformanceRecord> = reconciler.list_since(&args.subject, window_start).await?;

    print_summary(&args, &summary);
    print_recent(&recent_shares(&recent, today));
    Ok(())
}

fn print_summary(args: &SummaryArgs, summary: &PerformanceSummary) {
    println!(
        "{} {} to {}",
        args.subject.bold(),
        args.from,
        args.to
    );
    println!(
        "  {:<16} {}",
        "Bill total",
        format!("{} 元", format_money(summary.earnings())).bright_green().bold()
    );
    println!("  {:<16} {}", "Days", summary.days);
    println!("  {:<16} {}", "Pickup count", summary.pickup_count);
    println!("  {:<16} {}", "Weight", format_money(summary.weight));
    println!("  {:<16} {}", "Quantity", summary.quantity);
    println!("  {:<16} {}", "Freight", format_money(summary.freight));
    println!("  {:<16} {}", "Transfer fee", format_money(summary.transfer_fee));
    println!("  {:<16} {}", "Scanning fee", format_money(summary.scanning_fee));
    println!("  {:<16} {}", "Fund fee", format_money(summary.fund_fee));
    println!("  {:<16} {}", "Electronic order", format_money(summary.electronic_order));
    println!("  {:<16} +{}", "Pickup share", format_money(summary.pickup_share));
    println!("  {:<16} {}", "Delivery count", summary.delivery_count);
    println!("  {:<16} {}", "Delivery weight", format_money(summary.delivery_weight));
    println!("  {:<16} +{}", "Delivery share", format_money(summary.delivery_share));
}

fn print_recent(days: &[DayShares; 3]) {
    println!();
    println!("{}", "Recent shares".bold());
    for (label, day) in ["Today", "Yesterday", "Day before"].iter().zip(days) {
        let date = day.date.map(|d| d.to_string()).unwrap_or_default();
        println!(
            "  {:<11} {:<10} pickup {:>8}  delivery {:>8}",
            label,
            date.dimmed(),
            format!("+{}", format_money(day.pickup_share)).red(),
            format!("+{}", format_money(day.delivery_share)).red()
        );
    }
}
