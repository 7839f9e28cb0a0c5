//! Performance record types
//!
//! Two record shapes share the same identity, `(name, date)`:
//! the monthly `PerformanceRecord` with the full fee breakdown and the
//! narrower `DailyPerformanceRecord`. Field names on the wire are the
//! store's camelCase column names; the subject travels as `name`.

pub mod date_format;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::StoredRecord;

/// Store field holding the subject (employee name)
pub const SUBJECT_FIELD: &str = "name";
/// Store field holding the ISO calendar date
pub const DATE_FIELD: &str = "date";

/// Which record shape a sheet, collection or command works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Monthly statement: header-named columns, full fee breakdown
    Monthly,
    /// Daily sheet: positional columns, pickup/delivery only
    Daily,
}

impl RecordKind {
    /// Collection the legacy dashboard used for this kind
    pub fn default_collection(&self) -> &'static str {
        match self {
            RecordKind::Monthly => "performance",
            RecordKind::Daily => "daily_performance",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Monthly => write!(f, "monthly"),
            RecordKind::Daily => write!(f, "daily"),
        }
    }
}

/// A record identified by `(subject, date)`
pub trait KeyedRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn subject(&self) -> &str;

    fn date(&self) -> Option<NaiveDate>;

    /// Rebind the record to another subject (batch imports fix the subject)
    fn set_subject(&mut self, subject: &str);

    /// Full field map sent to the store, subject included
    fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Decode a stored record; `None` if the shape doesn't fit
    fn from_stored(record: &StoredRecord) -> Option<Self> {
        serde_json::from_value(Value::Object(record.fields.clone())).ok()
    }
}

/// One employee's monthly-statement line for one date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    #[serde(rename = "name")]
    pub subject: String,
    #[serde(with = "date_format", default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub pickup_count: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub freight: Option<f64>,
    #[serde(default)]
    pub transfer_fee: Option<f64>,
    #[serde(default)]
    pub scanning_fee: Option<f64>,
    #[serde(default)]
    pub fund_fee: Option<f64>,
    #[serde(default)]
    pub electronic_order: Option<f64>,
    #[serde(default)]
    pub pickup_share: Option<f64>,
    #[serde(default)]
    pub delivery_count: Option<i64>,
    #[serde(default)]
    pub delivery_weight: Option<f64>,
    #[serde(default)]
    pub delivery_share: Option<f64>,
}

/// One employee's daily pickup/delivery figures for one date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPerformanceRecord {
    #[serde(rename = "name")]
    pub subject: String,
    #[serde(with = "date_format", default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub pickup_count: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub pickup_share: Option<f64>,
    #[serde(default)]
    pub delivery_count: Option<i64>,
    #[serde(default)]
    pub delivery_weight: Option<f64>,
    #[serde(default)]
    pub delivery_share: Option<f64>,
}

impl KeyedRecord for PerformanceRecord {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_string();
    }
}

impl KeyedRecord for DailyPerformanceRecord {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_string();
    }
}

/// Records of one kind, as fetched for listing or export
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    Monthly(Vec<PerformanceRecord>),
    Daily(Vec<DailyPerformanceRecord>),
}

impl RecordSet {
    pub fn len(&self) -> usize {
        match self {
            RecordSet::Monthly(records) => records.len(),
            RecordSet::Daily(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_monthly_fields_use_store_names() {
        let record = PerformanceRecord {
            subject: "Zhang".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 1),
            pickup_count: Some(12),
            delivery_share: Some(-3.5),
            ..Default::default()
        };
        let fields = record.to_fields();

        assert_eq!(fields["name"], json!("Zhang"));
        assert_eq!(fields["date"], json!("2024-12-01"));
        assert_eq!(fields["pickupCount"], json!(12));
        assert_eq!(fields["deliveryShare"], json!(-3.5));
        assert_eq!(fields["transferFee"], Value::Null);
        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "date",
                "deliveryCount",
                "deliveryShare",
                "deliveryWeight",
                "electronicOrder",
                "freight",
                "fundFee",
                "name",
                "pickupCount",
                "pickupShare",
                "quantity",
                "scanningFee",
                "transferFee",
                "weight",
            ]
        );
    }

    #[test]
    fn test_daily_from_stored_record() {
        let Value::Object(fields) = json!({
            "name": "Li",
            "date": "2024-03-05 00:00:00.000Z",
            "pickupCount": 7,
            "weight": 10.25,
            "pickupShare": 3.5,
            "deliveryCount": 0,
            "deliveryWeight": 0,
            "deliveryShare": 0,
            "collectionName": "daily_performance"
        }) else {
            unreachable!()
        };
        let stored = StoredRecord::new("r1", fields);
        let record = DailyPerformanceRecord::from_stored(&stored).unwrap();

        assert_eq!(record.subject, "Li");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(record.pickup_count, Some(7));
        assert_eq!(record.delivery_weight, Some(0.0));
    }

    #[test]
    fn test_record_kind_collections() {
        assert_eq!(RecordKind::Monthly.default_collection(), "performance");
        assert_eq!(RecordKind::Daily.default_collection(), "daily_performance");
        assert_eq!(RecordKind::Daily.to_string(), "daily");
    }
}
