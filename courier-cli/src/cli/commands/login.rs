//! `login` command

use anyhow::Result;
use colored::*;

use super::connect;
use crate::config::Config;

pub async fn handle_login_command(config: &Config) -> Result<()> {
    let connection = connect(config).await?;
    let user = connection.session.user.as_deref().unwrap_or("unknown user");

    println!(
        "{} Logged in to {} as {}",
        "✓".green(),
        connection.store.base_url().cyan(),
        user.bold()
    );
    Ok(())
}
