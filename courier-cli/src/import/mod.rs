//! Spreadsheet import: workbook bytes → sheets → rows → records → store
//!
//! Sheets are processed in workbook order. The first sheet that fails
//! (missing subject, unreadable layout, or a batch that stopped) ends the
//! import; sheets already written stay written.

pub mod cell;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod normalize;
pub mod workbook;

pub use error::ImportError;
pub use extract::{ColumnLayout, extract_sheet};
pub use mapping::{DEFAULT_DELIVERY_PREFIX, MonthlyMapping};
pub use normalize::{NullPolicy, Normalizer};
pub use workbook::{Sheet, read_workbook};

use log::{error, info};

use crate::reconcile::{BatchReport, Reconciler};
use crate::records::RecordKind;

/// Everything that varies between the monthly and the daily import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProfile {
    pub kind: RecordKind,
    pub collection: String,
    pub null_policy: NullPolicy,
    /// Only used by the monthly (header-keyed) layout
    pub delivery_prefix: String,
}

impl ImportProfile {
    /// Legacy defaults: monthly keeps nulls, daily writes zeros
    pub fn for_kind(kind: RecordKind) -> Self {
        let null_policy = match kind {
            RecordKind::Monthly => NullPolicy::Passthrough,
            RecordKind::Daily => NullPolicy::Zero,
        };
        Self {
            kind,
            collection: kind.default_collection().to_string(),
            null_policy,
            delivery_prefix: DEFAULT_DELIVERY_PREFIX.to_string(),
        }
    }

    pub fn layout(&self) -> ColumnLayout {
        match self.kind {
            RecordKind::Monthly => ColumnLayout::Named {
                delivery_prefix: self.delivery_prefix.clone(),
            },
            RecordKind::Daily => ColumnLayout::Positional,
        }
    }
}

/// One imported sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetReport {
    pub sheet: String,
    pub batch: BatchReport,
}

/// The sheet that stopped an import
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: ImportError,
}

impl std::fmt::Display for SheetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sheet '{}': {}", self.sheet, self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportReport {
    /// Sheets whose batch ran, including a batch that stopped partway
    pub sheets: Vec<SheetReport>,
    pub failure: Option<SheetFailure>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn created(&self) -> usize {
        self.sheets.iter().map(|s| s.batch.created).sum()
    }

    pub fn updated(&self) -> usize {
        self.sheets.iter().map(|s| s.batch.updated).sum()
    }
}

/// Extract, normalize and upsert one sheet
async fn import_sheet(
    sheet: &Sheet,
    profile: &ImportProfile,
    reconciler: &Reconciler<'_>,
) -> Result<BatchReport, ImportError> {
    let extracted = extract_sheet(sheet, &profile.layout())?;
    let normalizer = Normalizer::new(profile.null_policy);

    let report = match profile.kind {
        RecordKind::Monthly => {
            let mapping = MonthlyMapping::with_prefix(&profile.delivery_prefix);
            let records = normalizer.monthly(&extracted, &mapping);
            reconciler.batch_upsert(&extracted.subject, records).await
        }
        RecordKind::Daily => {
            let records = normalizer.daily(&extracted);
            reconciler.batch_upsert(&extracted.subject, records).await
        }
    };
    Ok(report)
}

/// Import already-loaded sheets in order, stopping at the first failure
pub async fn import_sheets(sheets: &[Sheet], profile: &ImportProfile, reconciler: &Reconciler<'_>) -> ImportReport {
    let mut report = ImportReport::default();

    for sheet in sheets {
        info!(
            "Importing sheet '{}' as {} into '{}'",
            sheet.name,
            profile.kind,
            reconciler.collection()
        );

        match import_sheet(sheet, profile, reconciler).await {
            Ok(batch) => {
                let failure = batch.failure.as_ref().map(|f| f.error.clone());
                report.sheets.push(SheetReport {
                    sheet: sheet.name.clone(),
                    batch,
                });
                if let Some(error) = failure {
                    report.failure = Some(SheetFailure {
                        sheet: sheet.name.clone(),
                        error,
                    });
                    break;
                }
            }
            Err(err) => {
                error!("Import stopped at sheet '{}': {}", sheet.name, err);
                report.failure = Some(SheetFailure {
                    sheet: sheet.name.clone(),
                    error: err,
                });
                break;
            }
        }
    }

    info!(
        "Import finished: {} sheets, {} created, {} updated",
        report.sheets.len(),
        report.created(),
        report.updated()
    );
    report
}

/// Read workbook bytes and import every sheet
pub async fn import_workbook(
    bytes: &[u8],
    profile: &ImportProfile,
    reconciler: &Reconciler<'_>,
) -> Result<ImportReport, ImportError> {
    let sheets = read_workbook(bytes)?;
    Ok(import_sheets(&sheets, profile, reconciler).await)
}
