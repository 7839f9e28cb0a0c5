//! Row normalization
//!
//! Turns extracted raw rows into typed performance records. Spreadsheet
//! dates arrive as day serials counted from 1899-12-30; counts and amounts
//! arrive as numbers or numeric text.
//!
//! Missing numeric cells follow a per-call-site `NullPolicy`: the daily
//! sheet has always written `0`, the monthly statement has always written
//! `null`. Both are kept as named configuration rather than merged.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::cell::CellValue;
use super::extract::ExtractedSheet;
use super::mapping::{DAILY_COLUMNS, MonthlyMapping, PerformanceField};
use crate::records::date_format::parse_leading_date;
use crate::records::{DailyPerformanceRecord, PerformanceRecord};

/// Serial of 1970-01-01 in the spreadsheet day count
pub const UNIX_EPOCH_SERIAL: f64 = 25569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// What a missing or unparseable numeric cell becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Default to zero (daily sheet)
    Zero,
    /// Keep the field null (monthly statement)
    Passthrough,
}

impl NullPolicy {
    fn resolve<T: Default>(self, value: Option<T>) -> Option<T> {
        match self {
            NullPolicy::Zero => Some(value.unwrap_or_default()),
            NullPolicy::Passthrough => value,
        }
    }
}

impl std::fmt::Display for NullPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NullPolicy::Zero => write!(f, "zero"),
            NullPolicy::Passthrough => write!(f, "passthrough"),
        }
    }
}

/// Convert a spreadsheet day serial to a UTC calendar date
///
/// `timestamp_ms = (serial - 25569) * 86400 * 1000`; a time-of-day fraction
/// stays within its day.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).floor();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
}

/// Inverse of `serial_to_date` for whole days
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    UNIX_EPOCH_SERIAL + (date - epoch).num_days() as f64
}

fn date_value(cell: Option<&CellValue>) -> Option<NaiveDate> {
    match cell? {
        CellValue::Int(i) => serial_to_date(*i as f64),
        CellValue::Float(f) => serial_to_date(*f),
        CellValue::Text(s) => parse_leading_date(s)
            .or_else(|| NaiveDate::parse_from_str(s.trim(), "%Y/%m/%d").ok())
            .or_else(|| s.trim().parse::<f64>().ok().and_then(serial_to_date)),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

fn numeric_value(cell: Option<&CellValue>) -> Option<f64> {
    let value = match cell? {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(f) => *f,
        CellValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        CellValue::Bool(_) | CellValue::Empty => return None,
    };
    value.is_finite().then_some(value)
}

fn int_value(cell: Option<&CellValue>, policy: NullPolicy) -> Option<i64> {
    let value = match cell {
        Some(CellValue::Int(i)) => Some(*i),
        other => numeric_value(other).map(|f| f.trunc() as i64),
    };
    policy.resolve(value)
}

fn float_value(cell: Option<&CellValue>, policy: NullPolicy) -> Option<f64> {
    policy.resolve(numeric_value(cell))
}

fn assign_monthly(
    record: &mut PerformanceRecord,
    field: PerformanceField,
    cell: Option<&CellValue>,
    policy: NullPolicy,
) {
    match field {
        PerformanceField::Date => record.date = date_value(cell),
        PerformanceField::PickupCount => record.pickup_count = int_value(cell, policy),
        PerformanceField::Weight => record.weight = float_value(cell, policy),
        PerformanceField::Quantity => record.quantity = int_value(cell, policy),
        PerformanceField::Freight => record.freight = float_value(cell, policy),
        PerformanceField::TransferFee => record.transfer_fee = float_value(cell, policy),
        PerformanceField::ScanningFee => record.scanning_fee = float_value(cell, policy),
        PerformanceField::FundFee => record.fund_fee = float_value(cell, policy),
        PerformanceField::ElectronicOrder => record.electronic_order = float_value(cell, policy),
        PerformanceField::PickupShare => record.pickup_share = float_value(cell, policy),
        PerformanceField::DeliveryCount => record.delivery_count = int_value(cell, policy),
        PerformanceField::DeliveryWeight => record.delivery_weight = float_value(cell, policy),
        PerformanceField::DeliveryShare => record.delivery_share = float_value(cell, policy),
    }
}

fn assign_daily(
    record: &mut DailyPerformanceRecord,
    field: PerformanceField,
    cell: Option<&CellValue>,
    policy: NullPolicy,
) {
    match field {
        PerformanceField::Date => record.date = date_value(cell),
        PerformanceField::PickupCount => record.pickup_count = int_value(cell, policy),
        PerformanceField::Weight => record.weight = float_value(cell, policy),
        PerformanceField::PickupShare => record.pickup_share = float_value(cell, policy),
        PerformanceField::DeliveryCount => record.delivery_count = int_value(cell, policy),
        PerformanceField::DeliveryWeight => record.delivery_weight = float_value(cell, policy),
        PerformanceField::DeliveryShare => record.delivery_share = float_value(cell, policy),
        _ => {}
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    policy: NullPolicy,
}

impl Normalizer {
    pub fn new(policy: NullPolicy) -> Self {
        Self { policy }
    }

    /// Header-keyed rows → monthly records
    pub fn monthly(&self, sheet: &ExtractedSheet, mapping: &MonthlyMapping) -> Vec<PerformanceRecord> {
        let index = sheet.header_index();
        let columns: Vec<(PerformanceField, Option<usize>)> = mapping
            .entries()
            .map(|(field, labels)| {
                let col = labels.iter().find_map(|label| index.get(label.as_str()).copied());
                (field, col)
            })
            .collect();

        sheet
            .rows
            .iter()
            .map(|row| {
                let mut record = PerformanceRecord {
                    subject: sheet.subject.clone(),
                    ..Default::default()
                };
                for (field, col) in &columns {
                    let cell = col.and_then(|c| row.cell(c));
                    assign_monthly(&mut record, *field, cell, self.policy);
                }
                record
            })
            .collect()
    }

    /// Positional rows → daily records
    pub fn daily(&self, sheet: &ExtractedSheet) -> Vec<DailyPerformanceRecord> {
        sheet
            .rows
            .iter()
            .map(|row| {
                let mut record = DailyPerformanceRecord {
                    subject: sheet.subject.clone(),
                    ..Default::default()
                };
                for (col, field) in DAILY_COLUMNS.iter().enumerate() {
                    assign_daily(&mut record, *field, row.cell(col), self.policy);
                }
                record
            })
            .collect()
    }
}
