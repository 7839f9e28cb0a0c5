//! Write records back out as an importable workbook
//!
//! Layout matches what the importer reads: subject in A1, labels in row 2,
//! one record per row from row 3. Dates are written as day serials with a
//! date format so spreadsheet apps show them as dates.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::import::mapping::{DAILY_COLUMNS, DAILY_LABELS, MonthlyMapping, PerformanceField};
use crate::import::normalize::date_to_serial;
use crate::records::{DailyPerformanceRecord, PerformanceRecord, RecordSet};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const MAX_SHEET_NAME: usize = 31;

/// Excel sheet names: at most 31 chars, none of `[]:*?/\`
fn sheet_name(subject: &str) -> String {
    let name: String = subject
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();
    let name = name.trim_matches('\'').trim().to_string();
    if name.is_empty() { "Sheet1".to_string() } else { name }
}

fn monthly_value(record: &PerformanceRecord, field: PerformanceField) -> Option<f64> {
    match field {
        PerformanceField::Date => record.date.map(date_to_serial),
        PerformanceField::PickupCount => record.pickup_count.map(|v| v as f64),
        PerformanceField::Weight => record.weight,
        PerformanceField::Quantity => record.quantity.map(|v| v as f64),
        PerformanceField::Freight => record.freight,
        PerformanceField::TransferFee => record.transfer_fee,
        PerformanceField::ScanningFee => record.scanning_fee,
        PerformanceField::FundFee => record.fund_fee,
        PerformanceField::ElectronicOrder => record.electronic_order,
        PerformanceField::PickupShare => record.pickup_share,
        PerformanceField::DeliveryCount => record.delivery_count.map(|v| v as f64),
        PerformanceField::DeliveryWeight => record.delivery_weight,
        PerformanceField::DeliveryShare => record.delivery_share,
    }
}

fn daily_value(record: &DailyPerformanceRecord, field: PerformanceField) -> Option<f64> {
    match field {
        PerformanceField::Date => record.date.map(date_to_serial),
        PerformanceField::PickupCount => record.pickup_count.map(|v| v as f64),
        PerformanceField::Weight => record.weight,
        PerformanceField::PickupShare => record.pickup_share,
        PerformanceField::DeliveryCount => record.delivery_count.map(|v| v as f64),
        PerformanceField::DeliveryWeight => record.delivery_weight,
        PerformanceField::DeliveryShare => record.delivery_share,
        _ => None,
    }
}

fn write_rows<R>(
    worksheet: &mut Worksheet,
    columns: &[(PerformanceField, String)],
    records: &[R],
    value: impl Fn(&R, PerformanceField) -> Option<f64>,
) -> Result<()> {
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for (col, (_, label)) in columns.iter().enumerate() {
        worksheet.write_string(1, col as u16, label)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 2) as u32;
        for (col, (field, _)) in columns.iter().enumerate() {
            let Some(v) = value(record, *field) else {
                continue;
            };
            if *field == PerformanceField::Date {
                worksheet.write_number_with_format(row, col as u16, v, &date_format)?;
            } else {
                worksheet.write_number(row, col as u16, v)?;
            }
        }
    }
    Ok(())
}

/// Render one subject's records as xlsx bytes
pub fn export_workbook(subject: &str, records: &RecordSet, mapping: &MonthlyMapping) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name(subject))
        .with_context(|| format!("Invalid sheet name for '{}'", subject))?;
    worksheet.write_string(0, 0, subject)?;

    match records {
        RecordSet::Monthly(records) => {
            let columns: Vec<(PerformanceField, String)> = mapping
                .entries()
                .filter_map(|(field, _)| {
                    mapping
                        .canonical_label(field)
                        .map(|label| (field, label.to_string()))
                })
                .collect();
            write_rows(worksheet, &columns, records, monthly_value)?;
        }
        RecordSet::Daily(records) => {
            let columns: Vec<(PerformanceField, String)> = DAILY_COLUMNS
                .iter()
                .zip(DAILY_LABELS)
                .map(|(field, label)| (*field, label.to_string()))
                .collect();
            write_rows(worksheet, &columns, records, daily_value)?;
        }
    }

    workbook
        .save_to_buffer()
        .context("Failed to build workbook")
}

/// Oldest-first copy, the order a hand-kept sheet uses
pub fn chronological<R: Clone>(records: &[R], date: impl Fn(&R) -> Option<NaiveDate>) -> Vec<R> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| date(r));
    sorted
}
