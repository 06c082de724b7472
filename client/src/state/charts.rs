//! Aggregation of the analysis history into bar-chart buckets.

#[cfg(test)]
#[path = "charts_test.rs"]
mod charts_test;

use time::UtcOffset;

use crate::net::types::AnalysisRecord;
use crate::util::format::parse_timestamp;

/// Height of the tallest bar.
pub const MAX_BAR_PX: f64 = 200.0;
/// Minimum rendered bar height.
pub const MIN_BAR_PX: f64 = 20.0;

const UNCATEGORIZED: &str = "Sem categoria";

/// One bar of a chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub label: String,
    pub amount: f64,
    pub height_px: f64,
    /// HSL hue for category bars.
    pub hue: u16,
}

impl Bar {
    /// Amount in thousands: `R$ 8k`.
    pub fn short_amount(&self) -> String {
        format!("R$ {:.0}k", self.amount / 1000.0)
    }
}

/// Everything the charts tab renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartData {
    /// Category totals in first-appearance order.
    pub categories: Vec<Bar>,
    /// Monthly totals labelled `M/AAAA`, oldest first.
    pub months: Vec<Bar>,
    pub total_amount: f64,
    pub operations: usize,
    pub estimated_taxes: f64,
}

impl ChartData {
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations == 0
    }
}

/// Bucket `records` by category and by month of `created_at` in `offset`.
///
/// Records without a parseable date count toward categories and totals but
/// not toward any month.
pub fn chart_data(records: &[AnalysisRecord], offset: UtcOffset) -> ChartData {
    let mut categories: Vec<(String, f64)> = Vec::new();
    let mut months: Vec<((i32, u8), f64)> = Vec::new();

    for record in records {
        let amount = record.amount.unwrap_or(0.0);
        let category = record
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        add_to(&mut categories, category.to_owned(), amount);

        let month = record
            .created_at
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, offset))
            .map(|at| at.to_offset(offset))
            .map(|at| (at.year(), u8::from(at.month())));
        if let Some(key) = month {
            add_to(&mut months, key, amount);
        }
    }
    months.sort_by_key(|(key, _)| *key);

    ChartData {
        categories: bars(categories.into_iter()),
        months: bars(months.into_iter().map(|((year, month), amount)| (format!("{month}/{year}"), amount))),
        total_amount: records.iter().filter_map(|r| r.amount).sum(),
        operations: records.len(),
        estimated_taxes: records.iter().filter_map(AnalysisRecord::estimated_tax).sum(),
    }
}

fn add_to<K: PartialEq>(buckets: &mut Vec<(K, f64)>, key: K, amount: f64) {
    match buckets.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, total)) => *total += amount,
        None => buckets.push((key, amount)),
    }
}

fn bars(entries: impl Iterator<Item = (String, f64)>) -> Vec<Bar> {
    let entries: Vec<(String, f64)> = entries.collect();
    let max = entries.iter().map(|(_, amount)| *amount).fold(0.0_f64, f64::max);
    entries
        .into_iter()
        .enumerate()
        .map(|(index, (label, amount))| Bar {
            label,
            amount,
            height_px: bar_height(amount, max),
            hue: hue_for(index),
        })
        .collect()
}

/// Bar height scaled against the largest bucket, never below the minimum.
pub fn bar_height(amount: f64, max: f64) -> f64 {
    if max <= 0.0 || !amount.is_finite() {
        return MIN_BAR_PX;
    }
    (amount / max * MAX_BAR_PX).clamp(MIN_BAR_PX, MAX_BAR_PX)
}

fn hue_for(index: usize) -> u16 {
    u16::try_from((index * 60) % 360).unwrap_or(0)
}
