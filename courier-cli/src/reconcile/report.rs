//! Results of batch upserts and purges

use chrono::NaiveDate;

use crate::import::ImportError;

/// What a single upsert did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created { id: String },
    /// `duplicates` counts further stored records sharing the key; they are
    /// left untouched
    Updated { id: String, duplicates: usize },
}

/// The record that stopped a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// Position of the failing record in the batch
    pub index: usize,
    pub date: Option<NaiveDate>,
    pub error: ImportError,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date {
            Some(date) => write!(f, "record #{} ({}): {}", self.index + 1, date, self.error),
            None => write!(f, "record #{} (no date): {}", self.index + 1, self.error),
        }
    }
}

/// Outcome of `batch_upsert`; records before the failure stay committed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub subject: String,
    /// Records handed to the batch
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn new(subject: impl Into<String>, total: usize) -> Self {
        Self {
            subject: subject.into(),
            total,
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Records written before the batch stopped
    pub fn committed(&self) -> usize {
        self.created + self.updated
    }

    /// Records never attempted because of an earlier failure
    pub fn skipped(&self) -> usize {
        match &self.failure {
            Some(failure) => self.total.saturating_sub(failure.index + 1),
            None => 0,
        }
    }

    pub(crate) fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created { .. } => self.created += 1,
            UpsertOutcome::Updated { .. } => self.updated += 1,
        }
    }
}

/// Outcome of a purge; on failure the remaining matches stay in place
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PurgeReport {
    pub subject: String,
    /// Records that matched the purge scope
    pub matched: usize,
    pub deleted: usize,
    pub failure: Option<ImportError>,
}

impl PurgeReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::new("Zhang", 3);
        report.record(&UpsertOutcome::Created { id: "a".to_string() });
        report.failure = Some(BatchFailure {
            index: 1,
            date: None,
            error: ImportError::validation("Zhang", "date is missing"),
        });

        assert!(!report.is_success());
        assert_eq!(report.committed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(
            report.failure.as_ref().map(|f| f.to_string()).as_deref(),
            Some("record #2 (no date): Invalid record for 'Zhang': date is missing")
        );
    }
}
