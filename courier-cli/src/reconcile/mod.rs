//! Reconciler: keeps at most one stored record per `(subject, date)`
//!
//! The store does not enforce the natural key, so every write first looks
//! the key up and then either updates the match or creates a new record.
//! All calls run strictly in order, one awaited store call at a time; a
//! batch stops at the first failure and nothing already written is rolled
//! back. Two imports of the same subject running at once can race between
//! the lookup and the write, so concurrent imports of one subject are not
//! supported.

pub mod report;

pub use report::{BatchFailure, BatchReport, PurgeReport, UpsertOutcome};

use chrono::NaiveDate;
use log::{debug, error, info, warn};

use crate::api::{
    Filter, ListQuery, Operation, OperationOutcome, OrderBy, RecordStore, Session, StoredRecord,
};
use crate::import::ImportError;
use crate::records::{DATE_FIELD, KeyedRecord, SUBJECT_FIELD, date_format};

pub struct Reconciler<'a> {
    store: &'a dyn RecordStore,
    session: &'a Session,
    collection: String,
}

fn format_date(date: NaiveDate) -> String {
    date.format(date_format::FORMAT).to_string()
}

/// `[first day of month, first day of next month)`
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RecordStore, session: &'a Session, collection: impl Into<String>) -> Self {
        Self {
            store,
            session,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn key_filter(subject: &str, date: NaiveDate) -> Filter {
        Filter::and(vec![
            Filter::eq(SUBJECT_FIELD, subject),
            Filter::eq(DATE_FIELD, format_date(date)),
        ])
    }

    async fn execute(&self, operation: Operation) -> Result<OperationOutcome, ImportError> {
        debug!(
            "{} on '{}'",
            operation.operation_type(),
            operation.collection()
        );
        operation
            .execute(self.store, self.session)
            .await
            .map_err(|e| ImportError::persistence(format!("{} record", operation.operation_type()), e))
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<StoredRecord>, ImportError> {
        self.store
            .list_full(self.session, &self.collection, query)
            .await
            .map_err(|e| ImportError::persistence(format!("list '{}'", self.collection), e))
    }

    /// Create or fully overwrite the record stored under the record's key
    pub async fn upsert<R: KeyedRecord>(&self, record: &R) -> Result<UpsertOutcome, ImportError> {
        let subject = record.subject().trim();
        if subject.is_empty() {
            return Err(ImportError::validation(subject, "employee name is empty"));
        }
        let Some(date) = record.date() else {
            return Err(ImportError::validation(subject, "date is missing"));
        };

        // The stored name must match the key used for the lookup
        let mut canonical = record.clone();
        canonical.set_subject(subject);
        let subject = canonical.subject();

        let existing = self
            .list(&ListQuery::new().filter(Self::key_filter(subject, date)))
            .await?;
        let data = canonical.to_fields();

        match existing.split_first() {
            Some((first, rest)) => {
                if !rest.is_empty() {
                    warn!(
                        "{} records stored for '{}' on {}, updating only {}",
                        existing.len(),
                        subject,
                        date,
                        first.id
                    );
                }
                let outcome = self
                    .execute(Operation::update(&self.collection, &first.id, data))
                    .await?;
                Ok(UpsertOutcome::Updated {
                    id: outcome.id().to_string(),
                    duplicates: rest.len(),
                })
            }
            None => {
                let outcome = self.execute(Operation::create(&self.collection, data)).await?;
                Ok(UpsertOutcome::Created {
                    id: outcome.id().to_string(),
                })
            }
        }
    }

    /// Upsert `records` in order under `subject`, stopping at the first failure
    pub async fn batch_upsert<R: KeyedRecord>(&self, subject: &str, records: Vec<R>) -> BatchReport {
        let mut report = BatchReport::new(subject, records.len());

        for (index, mut record) in records.into_iter().enumerate() {
            record.set_subject(subject);
            match self.upsert(&record).await {
                Ok(outcome) => report.record(&outcome),
                Err(err) => {
                    error!(
                        "Batch for '{}' stopped at record #{}: {}",
                        subject,
                        index + 1,
                        err
                    );
                    report.failure = Some(BatchFailure {
                        index,
                        date: record.date(),
                        error: err,
                    });
                    break;
                }
            }
        }

        info!(
            "Batch for '{}' in '{}': {} created, {} updated of {}",
            subject, self.collection, report.created, report.updated, report.total
        );
        report
    }

    async fn purge(&self, subject: &str, filter: Filter) -> PurgeReport {
        let mut report = PurgeReport {
            subject: subject.to_string(),
            ..Default::default()
        };

        let matches = match self.list(&ListQuery::new().filter(filter)).await {
            Ok(matches) => matches,
            Err(err) => {
                report.failure = Some(err);
                return report;
            }
        };
        report.matched = matches.len();

        for record in matches {
            match self.execute(Operation::delete(&self.collection, &record.id)).await {
                Ok(_) => report.deleted += 1,
                Err(err) => {
                    error!(
                        "Purge of '{}' stopped after {} of {} deletions: {}",
                        subject, report.deleted, report.matched, err
                    );
                    report.failure = Some(err);
                    break;
                }
            }
        }

        info!(
            "Purged {} records of '{}' from '{}'",
            report.deleted, subject, self.collection
        );
        report
    }

    /// Delete every record of a subject
    pub async fn purge_by_subject(&self, subject: &str) -> PurgeReport {
        self.purge(subject, Filter::eq(SUBJECT_FIELD, subject)).await
    }

    /// Delete a subject's records dated within one calendar month
    pub async fn purge_by_subject_and_month(&self, subject: &str, year: i32, month: u32) -> PurgeReport {
        let Some((start, end)) = month_bounds(year, month) else {
            return PurgeReport {
                subject: subject.to_string(),
                failure: Some(ImportError::validation(
                    subject,
                    format!("invalid month {}-{}", year, month),
                )),
                ..Default::default()
            };
        };

        let filter = Filter::and(vec![
            Filter::eq(SUBJECT_FIELD, subject),
            Filter::gte(DATE_FIELD, format_date(start)),
            Filter::lt(DATE_FIELD, format_date(end)),
        ]);
        self.purge(subject, filter).await
    }

    /// Distinct subject names present in the collection
    pub async fn list_subjects(&self) -> Result<Vec<String>, ImportError> {
        let query = ListQuery::new()
            .sort(OrderBy::asc(SUBJECT_FIELD))
            .fields([SUBJECT_FIELD]);
        let records = self.list(&query).await?;

        let mut subjects: Vec<String> = Vec::new();
        for name in records.iter().filter_map(|r| r.str_field(SUBJECT_FIELD)) {
            let name = name.trim();
            if !name.is_empty() && !subjects.iter().any(|s| s == name) {
                subjects.push(name.to_string());
            }
        }
        Ok(subjects)
    }

    async fn list_typed<R: KeyedRecord>(&self, filter: Filter) -> Result<Vec<R>, ImportError> {
        let query = ListQuery::new().filter(filter).sort(OrderBy::desc(DATE_FIELD));
        let records = self.list(&query).await?;
        Ok(records
            .iter()
            .filter_map(|stored| {
                let decoded = R::from_stored(stored);
                if decoded.is_none() {
                    warn!("Skipping undecodable record {} in '{}'", stored.id, self.collection);
                }
                decoded
            })
            .collect())
    }

    /// All records of a subject, newest first
    pub async fn list_records<R: KeyedRecord>(&self, subject: &str) -> Result<Vec<R>, ImportError> {
        self.list_typed(Filter::eq(SUBJECT_FIELD, subject)).await
    }

    /// Records of a subject with `start <= date <= end`, newest first
    pub async fn list_range<R: KeyedRecord>(
        &self,
        subject: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<R>, ImportError> {
        self.list_typed(Filter::and(vec![
            Filter::eq(SUBJECT_FIELD, subject),
            Filter::gte(DATE_FIELD, format_date(start)),
            Filter::lte(DATE_FIELD, format_date(end)),
        ]))
        .await
    }

    /// Records of a subject dated `from` onwards, newest first
    pub async fn list_since<R: KeyedRecord>(&self, subject: &str, from: NaiveDate) -> Result<Vec<R>, ImportError> {
        self.list_typed(Filter::and(vec![
            Filter::eq(SUBJECT_FIELD, subject),
            Filter::gte(DATE_FIELD, format_date(from)),
        ]))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::store::StoreResult;
    use crate::api::{InMemoryStore, StoreError};
    use crate::records::{DailyPerformanceRecord, PerformanceRecord};
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COLLECTION: &str = "performance";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(subject: &str, date: Option<NaiveDate>, pickup: i64) -> PerformanceRecord {
        PerformanceRecord {
            subject: subject.to_string(),
            date,
            pickup_count: Some(pickup),
            pickup_share: Some(pickup as f64 * 0.5),
            ..Default::default()
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Store wrapper that fails the Nth write (create/update/delete, 1-based)
    struct FailingStore {
        inner: InMemoryStore,
        fail_on_write: usize,
        writes: AtomicUsize,
    }

    impl FailingStore {
        fn new(fail_on_write: usize) -> Self {
            Self {
                inner: InMemoryStore::new(),
                fail_on_write,
                writes: AtomicUsize::new(0),
            }
        }

        fn check(&self) -> StoreResult<()> {
            let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_on_write {
                return Err(StoreError::Transport("connection reset".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn create(&self, s: &Session, c: &str, d: &Map<String, Value>) -> StoreResult<String> {
            self.check()?;
            self.inner.create(s, c, d).await
        }

        async fn update_by_id(
            &self,
            s: &Session,
            c: &str,
            id: &str,
            d: &Map<String, Value>,
        ) -> StoreResult<()> {
            self.check()?;
            self.inner.update_by_id(s, c, id, d).await
        }

        async fn delete_by_id(&self, s: &Session, c: &str, id: &str) -> StoreResult<()> {
            self.check()?;
            self.inner.delete_by_id(s, c, id).await
        }

        async fn list_full(&self, s: &Session, c: &str, q: &ListQuery) -> StoreResult<Vec<StoredRecord>> {
            self.inner.list_full(s, c, q).await
        }

        async fn get_first(&self, s: &Session, c: &str, f: &Filter) -> StoreResult<StoredRecord> {
            self.inner.get_first(s, c, f).await
        }
    }

    #[tokio::test]
    async fn test_upsert_twice_converges() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let first = reconciler
            .upsert(&monthly("Zhang", Some(ymd(2024, 12, 1)), 10))
            .await
            .unwrap();
        let second = reconciler
            .upsert(&monthly("Zhang", Some(ymd(2024, 12, 1)), 25))
            .await
            .unwrap();

        assert!(matches!(first, UpsertOutcome::Created { .. }));
        assert!(matches!(second, UpsertOutcome::Updated { duplicates: 0, .. }));

        let records = store.records(COLLECTION).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["pickupCount"], json!(25));
        assert_eq!(records[0].fields["pickupShare"], json!(12.5));
    }

    #[tokio::test]
    async fn test_upsert_trims_padded_subject() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let first = reconciler
            .upsert(&monthly(" Zhang ", Some(ymd(2024, 12, 1)), 1))
            .await
            .unwrap();
        let second = reconciler
            .upsert(&monthly(" Zhang ", Some(ymd(2024, 12, 1)), 2))
            .await
            .unwrap();
        let third = reconciler
            .upsert(&monthly("Zhang", Some(ymd(2024, 12, 1)), 3))
            .await
            .unwrap();

        assert!(matches!(first, UpsertOutcome::Created { .. }));
        assert!(matches!(second, UpsertOutcome::Updated { duplicates: 0, .. }));
        assert!(matches!(third, UpsertOutcome::Updated { duplicates: 0, .. }));

        let records = store.records(COLLECTION).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["name"], json!("Zhang"));
        assert_eq!(records[0].fields["pickupCount"], json!(3));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_all_fields() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let mut original = monthly("Zhang", Some(ymd(2024, 12, 1)), 10);
        original.freight = Some(30.0);
        reconciler.upsert(&original).await.unwrap();
        reconciler
            .upsert(&monthly("Zhang", Some(ymd(2024, 12, 1)), 11))
            .await
            .unwrap();

        let records = store.records(COLLECTION).await;
        assert_eq!(records[0].fields["freight"], Value::Null);
    }

    #[tokio::test]
    async fn test_upsert_keys_on_subject_and_date() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        reconciler.upsert(&monthly("Zhang", Some(ymd(2024, 12, 1)), 1)).await.unwrap();
        reconciler.upsert(&monthly("Li", Some(ymd(2024, 12, 1)), 2)).await.unwrap();
        reconciler.upsert(&monthly("Zhang", Some(ymd(2024, 12, 2)), 3)).await.unwrap();

        assert_eq!(store.len(COLLECTION).await, 3);
    }

    #[tokio::test]
    async fn test_upsert_rejects_missing_date() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let result = reconciler.upsert(&monthly("Zhang", None, 1)).await;
        assert!(matches!(result, Err(ImportError::Validation { .. })));
        assert_eq!(store.len(COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_upsert_updates_first_of_duplicates() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let first_id = store
            .insert_raw(COLLECTION, fields(json!({"name": "Zhang", "date": "2024-12-01", "pickupCount": 1})))
            .await;
        store
            .insert_raw(COLLECTION, fields(json!({"name": "Zhang", "date": "2024-12-01", "pickupCount": 2})))
            .await;
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let outcome = reconciler
            .upsert(&monthly("Zhang", Some(ymd(2024, 12, 1)), 9))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            UpsertOutcome::Updated {
                id: first_id,
                duplicates: 1
            }
        );
        let records = store.records(COLLECTION).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields["pickupCount"], json!(9));
        assert_eq!(records[1].fields["pickupCount"], json!(2));
    }

    #[tokio::test]
    async fn test_batch_stops_at_invalid_record() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let report = reconciler
            .batch_upsert(
                "Zhang",
                vec![
                    monthly("", Some(ymd(2024, 12, 1)), 1),
                    monthly("", None, 2),
                    monthly("", Some(ymd(2024, 12, 3)), 3),
                ],
            )
            .await;

        assert!(!report.is_success());
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped(), 1);
        let failure = report.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert!(matches!(failure.error, ImportError::Validation { .. }));

        let records = store.records(COLLECTION).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].str_field("name"), Some("Zhang"));
        assert_eq!(records[0].str_field("date"), Some("2024-12-01"));
    }

    #[tokio::test]
    async fn test_batch_store_failure_keeps_earlier_writes() {
        let store = FailingStore::new(2);
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, "daily_performance");

        let records: Vec<DailyPerformanceRecord> = (1..=3)
            .map(|day| DailyPerformanceRecord {
                date: Some(ymd(2024, 12, day)),
                pickup_count: Some(day as i64),
                ..Default::default()
            })
            .collect();
        let report = reconciler.batch_upsert("Li", records).await;

        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.date, Some(ymd(2024, 12, 2)));
        assert!(matches!(
            failure.error,
            ImportError::Persistence {
                source: StoreError::Transport(_),
                ..
            }
        ));
        assert_eq!(store.inner.len("daily_performance").await, 1);
    }

    #[tokio::test]
    async fn test_purge_by_month_is_half_open() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        for (name, date) in [
            ("Zhang", "2024-11-30"),
            ("Zhang", "2024-12-01"),
            ("Zhang", "2024-12-31"),
            ("Zhang", "2025-01-01"),
            ("Li", "2024-12-15"),
        ] {
            store
                .insert_raw(COLLECTION, fields(json!({"name": name, "date": date})))
                .await;
        }
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let report = reconciler.purge_by_subject_and_month("Zhang", 2024, 12).await;

        assert!(report.is_success());
        assert_eq!(report.deleted, 2);
        let mut left: Vec<String> = store
            .records(COLLECTION)
            .await
            .iter()
            .map(|r| format!("{} {}", r.str_field("name").unwrap(), r.str_field("date").unwrap()))
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec!["Li 2024-12-15", "Zhang 2024-11-30", "Zhang 2025-01-01"]
        );
    }

    #[tokio::test]
    async fn test_purge_invalid_month() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let report = reconciler.purge_by_subject_and_month("Zhang", 2024, 13).await;
        assert!(matches!(report.failure, Some(ImportError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_purge_by_subject_partial_failure() {
        let store = FailingStore::new(3);
        let session = Session::anonymous();
        for day in 1..=4 {
            store
                .inner
                .insert_raw(
                    COLLECTION,
                    fields(json!({"name": "Zhang", "date": format!("2024-12-0{}", day)})),
                )
                .await;
        }
        let reconciler = Reconciler::new(&store, &session, COLLECTION);

        let report = reconciler.purge_by_subject("Zhang").await;

        assert_eq!(report.matched, 4);
        assert_eq!(report.deleted, 2);
        assert!(!report.is_success());
        assert_eq!(store.inner.len(COLLECTION).await, 2);
    }

    #[tokio::test]
    async fn test_queries() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let reconciler = Reconciler::new(&store, &session, COLLECTION);
        for (name, day) in [("Zhang", 1), ("Li", 2), ("Zhang", 3), ("Zhang", 5)] {
            reconciler
                .upsert(&monthly(name, Some(ymd(2024, 12, day)), day as i64))
                .await
                .unwrap();
        }

        assert_eq!(reconciler.list_subjects().await.unwrap(), vec!["Li", "Zhang"]);

        let all: Vec<PerformanceRecord> = reconciler.list_records("Zhang").await.unwrap();
        let dates: Vec<_> = all.iter().filter_map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2024, 12, 5), ymd(2024, 12, 3), ymd(2024, 12, 1)]);

        let range: Vec<PerformanceRecord> = reconciler
            .list_range("Zhang", ymd(2024, 12, 1), ymd(2024, 12, 3))
            .await
            .unwrap();
        assert_eq!(range.len(), 2);

        let since: Vec<PerformanceRecord> =
            reconciler.list_since("Zhang", ymd(2024, 12, 3)).await.unwrap();
        assert_eq!(since.len(), 2);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 12),
            Some((ymd(2024, 12, 1), ymd(2025, 1, 1)))
        );
        assert_eq!(month_bounds(2024, 2), Some((ymd(2024, 2, 1), ymd(2024, 3, 1))));
        assert_eq!(month_bounds(2024, 0), None);
    }
}
