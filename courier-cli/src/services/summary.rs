// Bill summaries over monthly performance records
//
// Nulls count as zero in every total. Shares are earnings; the bill total
// is the sum of pickup and delivery shares.

use chrono::{Days, NaiveDate};

use crate::records::PerformanceRecord;

/// Column totals plus earnings for a set of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceSummary {
    pub days: usize,
    pub pickup_count: i64,
    pub weight: f64,
    pub quantity: i64,
    pub freight: f64,
    pub transfer_fee: f64,
    pub scanning_fee: f64,
    pub fund_fee: f64,
    pub electronic_order: f64,
    pub pickup_share: f64,
    pub delivery_count: i64,
    pub delivery_weight: f64,
    pub delivery_share: f64,
}

impl PerformanceSummary {
    /// Bill total: pickup share + delivery share
    pub fn earnings(&self) -> f64 {
        self.pickup_share + self.delivery_share
    }
}

pub fn summarize(records: &[PerformanceRecord]) -> PerformanceSummary {
    records.iter().fold(
        PerformanceSummary::default(),
        |mut acc, r| {
            acc.days += 1;
            acc.pickup_count += r.pickup_count.unwrap_or(0);
            acc.weight += r.weight.unwrap_or(0.0);
            acc.quantity += r.quantity.unwrap_or(0);
            acc.freight += r.freight.unwrap_or(0.0);
            acc.transfer_fee += r.transfer_fee.unwrap_or(0.0);
            acc.scanning_fee += r.scanning_fee.unwrap_or(0.0);
            acc.fund_fee += r.fund_fee.unwrap_or(0.0);
            acc.electronic_order += r.electronic_order.unwrap_or(0.0);
            acc.pickup_share += r.pickup_share.unwrap_or(0.0);
            acc.delivery_count += r.delivery_count.unwrap_or(0);
            acc.delivery_weight += r.delivery_weight.unwrap_or(0.0);
            acc.delivery_share += r.delivery_share.unwrap_or(0.0);
            acc
        },
    )
}

/// Pickup and delivery share earned on one day
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayShares {
    pub date: Option<NaiveDate>,
    pub pickup_share: f64,
    pub delivery_share: f64,
}

/// Shares for today, yesterday and the day before, in that order
///
/// Days without a record report zero.
pub fn recent_shares(records: &[PerformanceRecord], today: NaiveDate) -> [DayShares; 3] {
    let mut days = [DayShares::default(); 3];
    for (offset, slot) in days.iter_mut().enumerate() {
        let date = today.checked_sub_days(Days::new(offset as u64));
        slot.date = date;
        if let Some(record) = records.iter().find(|r| r.date.is_some() && r.date == date) {
            slot.pickup_share = record.pickup_share.unwrap_or(0.0);
            slot.delivery_share = record.delivery_share.unwrap_or(0.0);
        }
    }
    days
}

/// Two-decimal fixed rendering for money and weights
pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}
