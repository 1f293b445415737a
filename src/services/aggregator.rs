use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::solar::{MonthlyAggregate, ProductionSample};

/// Sums production per calendar month, ordered January → December.
///
/// Months without samples are left out rather than zero-filled. The label is
/// taken from the first sample seen for each month.
pub fn monthly_totals(samples: &[ProductionSample]) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<u32, MonthlyAggregate> = BTreeMap::new();

    for s in samples {
        let month = s.timestamp.month();
        months
            .entry(month)
            .or_insert_with(|| MonthlyAggregate {
                month,
                label: s.timestamp.format("%b").to_string(),
                total_production_kwh: 0.0,
            })
            .total_production_kwh += s.production_kwh;
    }

    months.into_values().collect()
}

/// Samples whose calendar date falls in `[start, end]`.
/// An inverted range simply matches nothing.
pub fn filter_range(
    samples: &[ProductionSample],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<ProductionSample> {
    if start > end {
        return Vec::new();
    }
    samples
        .iter()
        .filter(|s| {
            let date = s.timestamp.date();
            date >= start && date <= end
        })
        .cloned()
        .collect()
}
