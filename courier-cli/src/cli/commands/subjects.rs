//! `subjects` command

use anyhow::Result;
use clap::Args;
use colored::*;

use super::connect;
use crate::config::Config;
use crate::reconcile::Reconciler;
use crate::records::RecordKind;

#[derive(Args, Debug)]
pub struct SubjectsArgs {
    #[arg(long, value_enum, default_value_t = RecordKind::Monthly)]
    pub kind: RecordKind,
}

pub async fn handle_subjects_command(args: SubjectsArgs, config: &Config) -> Result<()> {
    let profile = config.profile(args.kind);
    let connection = connect(config).await?;
    let reconciler = Reconciler::new(&connection.store, &connection.session, &profile.collection);

    let subjects = reconciler.list_subjects().await?;
    if subjects.is_empty() {
        println!("No employees in '{}'", profile.collection);
        return Ok(());
    }

    println!("{}", format!("Employees in '{}':", profile.collection).bold());
    for subject in &subjects {
        println!("  {}", subject);
    }
    println!("{} total", subjects.len().to_string().cyan());
    Ok(())
}
