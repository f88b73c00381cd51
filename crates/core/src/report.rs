//! Sales grouped per calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::sale::SaleRecord;

/// Totals for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    /// Number of sale records.
    pub records: usize,
    /// Units across all records.
    pub units: u64,
    /// Revenue from records that carry a price snapshot.
    pub revenue: Decimal,
    /// Units from records without a price snapshot (quick-sells).
    pub unpriced_units: u64,
}

/// Group sale records by the UTC day they happened, newest day first.
#[must_use]
pub fn daily_summary<'a>(records: impl IntoIterator<Item = &'a SaleRecord>) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();
    for record in records {
        let date = record.sold_at.date_naive();
        let day = days.entry(date).or_insert_with(|| DailySales {
            date,
            records: 0,
            units: 0,
            revenue: Decimal::ZERO,
            unpriced_units: 0,
        });
        day.records += 1;
        day.units += u64::from(record.quantity);
        match record.total() {
            Some(total) => day.revenue = day.revenue.saturating_add(total),
            None => day.unpriced_units += u64::from(record.quantity),
        }
    }
    days.into_values().rev().collect()
}
