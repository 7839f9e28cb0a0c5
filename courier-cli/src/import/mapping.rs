//! Header label tables for the monthly statement and the daily sheet

/// Default prefix marking the delivery half of a repeated label
pub const DEFAULT_DELIVERY_PREFIX: &str = "派件";

/// Record field a column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceField {
    Date,
    PickupCount,
    Weight,
    Quantity,
    Freight,
    TransferFee,
    ScanningFee,
    FundFee,
    ElectronicOrder,
    PickupShare,
    DeliveryCount,
    DeliveryWeight,
    DeliveryShare,
}

/// Daily sheet column order (column index = position in this slice)
pub const DAILY_COLUMNS: [PerformanceField; 7] = [
    PerformanceField::Date,
    PerformanceField::PickupCount,
    PerformanceField::Weight,
    PerformanceField::PickupShare,
    PerformanceField::DeliveryCount,
    PerformanceField::DeliveryWeight,
    PerformanceField::DeliveryShare,
];

/// Labels written above the daily columns on export
pub const DAILY_LABELS: [&str; 7] = [
    "日期",
    "收件票数",
    "收件重量",
    "收件分成",
    "派件票数",
    "派件重量",
    "派件分成",
];

/// Header label → field table for the monthly statement
///
/// The first label of each entry is canonical (used on export); the rest
/// are accepted aliases. Delivery labels are derived from the prefix so a
/// repeated "票数" lands on `DeliveryCount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyMapping {
    entries: Vec<(PerformanceField, Vec<String>)>,
}

impl MonthlyMapping {
    pub fn with_prefix(delivery_prefix: &str) -> Self {
        let labels = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let delivery = |name: &str| format!("{}{}", delivery_prefix, name);

        Self {
            entries: vec![
                (PerformanceField::Date, labels(&["日期"])),
                (PerformanceField::PickupCount, labels(&["收件票数", "票数"])),
                (PerformanceField::Weight, labels(&["重量", "收件重量"])),
                (PerformanceField::Quantity, labels(&["件数"])),
                (PerformanceField::Freight, labels(&["运费"])),
                (PerformanceField::TransferFee, labels(&["中转费"])),
                (PerformanceField::ScanningFee, labels(&["扫描费"])),
                (PerformanceField::FundFee, labels(&["基金费"])),
                (PerformanceField::ElectronicOrder, labels(&["电子单"])),
                (PerformanceField::PickupShare, labels(&["收件分成", "分成"])),
                (PerformanceField::DeliveryCount, vec![delivery("票数")]),
                (PerformanceField::DeliveryWeight, vec![delivery("重量")]),
                (PerformanceField::DeliveryShare, vec![delivery("分成")]),
            ],
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (PerformanceField, &[String])> {
        self.entries.iter().map(|(field, labels)| (*field, labels.as_slice()))
    }

    /// Label written on export for a field
    pub fn canonical_label(&self, field: PerformanceField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, labels)| labels.first())
            .map(String::as_str)
    }
}

impl Default for MonthlyMapping {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_DELIVERY_PREFIX)
    }
}
