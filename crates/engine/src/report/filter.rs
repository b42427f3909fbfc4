use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ExpenseRecord;

/// Record filter. Every field is optional; unset imposes nothing. Set
/// fields are ANDed together. Date bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub payer_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub category_id: Option<i64>,
    /// Removed records stay in the raw list when `true`; they never enter
    /// aggregation either way. The raw list shows removed records by
    /// default (crossed out in the UI), so this starts `true`.
    pub include_removed: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            date_from: None,
            date_to: None,
            payer_id: None,
            supplier_id: None,
            category_id: None,
            include_removed: true,
        }
    }
}

impl FilterCriteria {
    /// Whether a single record passes every set criterion.
    #[must_use]
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(from) = self.date_from
            && record.expense_date < from
        {
            return false;
        }
        if let Some(to) = self.date_to
            && record.expense_date > to
        {
            return false;
        }
        if let Some(payer) = self.payer_id
            && record.user_id != payer
        {
            return false;
        }
        if let Some(supplier) = self.supplier_id
            && record.supplier_id != Some(supplier)
        {
            return false;
        }
        if let Some(category) = self.category_id
            && record.category_id != Some(category)
        {
            return false;
        }
        if !self.include_removed && !record.is_active() {
            return false;
        }
        true
    }
}

/// Applies the criteria to a record slice. An empty result is a valid
/// result, and applying the same criteria twice changes nothing.
#[must_use]
pub fn filter(records: &[ExpenseRecord], criteria: &FilterCriteria) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_fixtures::{expense, removed};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn default_criteria_keep_removed_records_visible() {
        let records = vec![
            expense(1, date(1), 100_00, crate::Currency::Usd),
            removed(expense(2, date(2), 50_00, crate::Currency::Usd)),
        ];
        // The raw list shows removed records unless told otherwise.
        let out = filter(&records, &FilterCriteria::default());
        assert_eq!(out.len(), 2);

        let active = filter(
            &records,
            &FilterCriteria {
                include_removed: false,
                ..Default::default()
            },
        );
        assert_eq!(active.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let records = vec![
            expense(1, date(1), 1, crate::Currency::Usd),
            expense(2, date(2), 1, crate::Currency::Usd),
            expense(3, date(3), 1, crate::Currency::Usd),
        ];
        let criteria = FilterCriteria {
            date_from: Some(date(1)),
            date_to: Some(date(2)),
            ..Default::default()
        };
        let out = filter(&records, &criteria);
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = vec![
            expense(1, date(1), 1, crate::Currency::Usd),
            removed(expense(2, date(2), 1, crate::Currency::Bwp)),
            expense(3, date(9), 1, crate::Currency::Usd),
        ];
        let criteria = FilterCriteria {
            date_to: Some(date(5)),
            include_removed: true,
            ..Default::default()
        };
        let once = filter(&records, &criteria);
        let twice = filter(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let records = vec![expense(1, date(1), 1, crate::Currency::Usd)];
        let criteria = FilterCriteria {
            payer_id: Some(999),
            ..Default::default()
        };
        assert!(filter(&records, &criteria).is_empty());
    }
}
