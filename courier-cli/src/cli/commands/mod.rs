//! Command handlers and the helpers they share

pub mod export;
pub mod import;
pub mod list;
pub mod login;
pub mod purge;
pub mod subjects;
pub mod summary;

pub use export::ExportArgs;
pub use import::ImportArgs;
pub use list::ListArgs;
pub use purge::PurgeArgs;
pub use subjects::SubjectsArgs;
pub use summary::SummaryArgs;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::debug;

use crate::api::{AuthManager, HttpRecordStore, Session};
use crate::config::{Config, ENV_USERNAME};
use crate::import::ImportError;
use crate::reconcile::Reconciler;
use crate::records::{KeyedRecord, RecordKind, RecordSet};

/// Authenticated handle on the configured store
pub struct Connection {
    pub store: HttpRecordStore,
    pub session: Session,
}

/// Log in with the configured credentials, prompting for a missing password
pub async fn connect(config: &Config) -> Result<Connection> {
    let username = config.auth.username.as_deref().ok_or_else(|| {
        anyhow::anyhow!(
            "No username configured. Set [auth] username in the config file or {}.",
            ENV_USERNAME
        )
    })?;

    let password = match &config.auth.password {
        Some(password) => password.clone(),
        None => rpassword::prompt_password(format!("Password for {}: ", username))
            .context("Failed to read password")?,
    };

    debug!("Connecting to {}", config.store.url);
    let store = HttpRecordStore::new(&config.store.url);
    let auth = AuthManager::new(store.clone(), &config.store.auth_collection);
    let session = auth
        .authenticate(username, &password)
        .await
        .with_context(|| format!("Failed to log in to {}", config.store.url))?;

    Ok(Connection { store, session })
}

async fn fetch<R: KeyedRecord>(
    reconciler: &Reconciler<'_>,
    subject: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<R>, ImportError> {
    match (from, to) {
        (Some(from), Some(to)) => reconciler.list_range(subject, from, to).await,
        (Some(from), None) => reconciler.list_since(subject, from).await,
        (None, to) => {
            let mut records: Vec<R> = reconciler.list_records(subject).await?;
            if let Some(to) = to {
                records.retain(|r| r.date().is_some_and(|d| d <= to));
            }
            Ok(records)
        }
    }
}

/// A subject's records of one kind within optional date bounds, newest first
pub async fn fetch_records(
    reconciler: &Reconciler<'_>,
    kind: RecordKind,
    subject: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<RecordSet> {
    let records = match kind {
        RecordKind::Monthly => RecordSet::Monthly(fetch(reconciler, subject, from, to).await?),
        RecordKind::Daily => RecordSet::Daily(fetch(reconciler, subject, from, to).await?),
    };
    Ok(records)
}
