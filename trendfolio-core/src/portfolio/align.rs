//! Canonical date axis for heterogeneous instrument calendars.
//!
//! The axis is the sorted union of every contributing series' dates. Series
//! are mapped onto it explicitly: a date a series lacks contributes 0, it is
//! never a gap that shifts other series.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Sorted, duplicate-free union of dates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
}

impl DateAxis {
    /// Union of all dates across `series`.
    pub fn union<'a, I>(series: I) -> Self
    where
        I: IntoIterator<Item = &'a [NaiveDate]>,
    {
        let mut all = BTreeSet::new();
        for dates in series {
            all.extend(dates.iter().copied());
        }
        Self { dates: all.into_iter().collect() }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Add `values` (dated by `dates`) into `target`, which is aligned with
    /// this axis. Non-finite values contribute 0.
    pub fn accumulate(&self, target: &mut [f64], dates: &[NaiveDate], values: &[f64]) {
        debug_assert_eq!(target.len(), self.len());
        for (date, &value) in dates.iter().zip(values) {
            if !value.is_finite() {
                continue;
            }
            if let Some(i) = self.position(*date) {
                target[i] += value;
            }
        }
    }
}
