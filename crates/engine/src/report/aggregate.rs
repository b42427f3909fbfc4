use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Currency, ExpenseRecord, MoneyMinor, rates::to_usd_minor};

/// How records are bucketed for the summary views.
///
/// Payers group by user id (two people can share a name); supplier and
/// category group by display label so every record with the field unset
/// lands in the one `(No supplier)` / `(No category)` bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    Payer,
    Supplier,
    Category,
}

impl Grouping {
    /// Column header used above the group label in exports.
    #[must_use]
    pub fn label_header(self) -> &'static str {
        match self {
            Self::Payer => "Paid for",
            Self::Supplier => "Supplier",
            Self::Category => "Category",
        }
    }
}

/// One summary row: a group label with two native-currency subtotals and
/// the derived USD equivalent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub label: String,
    pub total_usd: MoneyMinor,
    pub total_bwp: MoneyMinor,
    /// USD **minor units** as `f64`; derived from the two native subtotals
    /// after accumulation, never accumulated itself.
    pub total_usd_equiv: f64,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Payer(i64),
    Label(String),
}

fn group_key(record: &ExpenseRecord, grouping: Grouping) -> (GroupKey, String) {
    match grouping {
        Grouping::Payer => (GroupKey::Payer(record.user_id), record.user_name.clone()),
        Grouping::Supplier => {
            let label = record.supplier_label().to_string();
            (GroupKey::Label(label.clone()), label)
        }
        Grouping::Category => {
            let label = record.category_label().to_string();
            (GroupKey::Label(label.clone()), label)
        }
    }
}

/// Single-pass grouped totals over the active records.
///
/// Removed records are excluded here unconditionally, whatever an upstream
/// filter decided to keep visible. Each group carries one accumulator per
/// currency; the USD equivalent is computed from them after the pass, so
/// per-record float error never accumulates. Rows come back in first-seen
/// record order (callers sort afterwards).
#[must_use]
pub fn aggregate_by(records: &[ExpenseRecord], grouping: Grouping, rate: f64) -> Vec<AggregateRow> {
    let mut rows: Vec<AggregateRow> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.is_active()) {
        let (key, label) = group_key(record, grouping);
        let idx = *index.entry(key).or_insert_with(|| {
            rows.push(AggregateRow {
                label,
                total_usd: MoneyMinor::ZERO,
                total_bwp: MoneyMinor::ZERO,
                total_usd_equiv: 0.0,
            });
            rows.len() - 1
        });
        match record.currency {
            Currency::Usd => rows[idx].total_usd += record.amount,
            Currency::Bwp => rows[idx].total_bwp += record.amount,
        }
    }

    for row in &mut rows {
        row.total_usd_equiv = row.total_usd.minor() as f64
            + to_usd_minor(row.total_bwp, Currency::Bwp, rate);
    }
    rows
}

/// Grand total over the active records, as a single implicit group.
#[must_use]
pub fn grand_total(records: &[ExpenseRecord], rate: f64) -> AggregateRow {
    let mut total_usd = MoneyMinor::ZERO;
    let mut total_bwp = MoneyMinor::ZERO;
    for record in records.iter().filter(|r| r.is_active()) {
        match record.currency {
            Currency::Usd => total_usd += record.amount,
            Currency::Bwp => total_bwp += record.amount,
        }
    }
    AggregateRow {
        label: "Total".to_string(),
        total_usd,
        total_bwp,
        total_usd_equiv: total_usd.minor() as f64 + to_usd_minor(total_bwp, Currency::Bwp, rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_fixtures::{expense, removed, with_category, with_payer, with_supplier};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn removed_records_never_enter_aggregates() {
        let records = vec![
            expense(1, date(1), 100_00, Currency::Usd),
            removed(expense(2, date(2), 40_00, Currency::Usd)),
        ];
        let total = grand_total(&records, 13.5);
        assert_eq!(total.total_usd, crate::MoneyMinor::new(100_00));

        let rows = aggregate_by(&records, Grouping::Payer, 13.5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_usd, crate::MoneyMinor::new(100_00));
    }

    #[test]
    fn supplier_scenario_two_currencies() {
        // Acme: 100 USD + 135 BWP; Beta: 50 USD; rate 13.5.
        let records = vec![
            with_supplier(expense(1, date(1), 100_00, Currency::Usd), 1, "Acme"),
            with_supplier(expense(2, date(2), 135_00, Currency::Bwp), 1, "Acme"),
            with_supplier(expense(3, date(3), 50_00, Currency::Usd), 2, "Beta"),
        ];
        let rows = aggregate_by(&records, Grouping::Supplier, 13.5);
        assert_eq!(rows.len(), 2);

        let acme = rows.iter().find(|r| r.label == "Acme").unwrap();
        assert_eq!(acme.total_usd, crate::MoneyMinor::new(100_00));
        assert_eq!(acme.total_bwp, crate::MoneyMinor::new(135_00));
        assert!((acme.total_usd_equiv - 110_00.0).abs() < 1e-6);

        let beta = rows.iter().find(|r| r.label == "Beta").unwrap();
        assert_eq!(beta.total_usd, crate::MoneyMinor::new(50_00));
        assert_eq!(beta.total_bwp, crate::MoneyMinor::ZERO);
        assert!((beta.total_usd_equiv - 50_00.0).abs() < 1e-6);
    }

    #[test]
    fn unset_suppliers_share_one_bucket() {
        let records = vec![
            expense(1, date(1), 10_00, Currency::Usd),
            expense(2, date(2), 20_00, Currency::Usd),
        ];
        let rows = aggregate_by(&records, Grouping::Supplier, 13.5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "(No supplier)");
        assert_eq!(rows[0].total_usd, crate::MoneyMinor::new(30_00));
    }

    #[test]
    fn categories_group_by_label_with_a_shared_unset_bucket() {
        let records = vec![
            with_category(expense(1, date(1), 10_00, Currency::Usd), 1, "Food"),
            with_category(expense(2, date(2), 5_00, Currency::Usd), 1, "Food"),
            expense(3, date(3), 1_00, Currency::Usd),
        ];
        let rows = aggregate_by(&records, Grouping::Category, 13.5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Food");
        assert_eq!(rows[0].total_usd, crate::MoneyMinor::new(15_00));
        assert_eq!(rows[1].label, "(No category)");
    }

    #[test]
    fn payers_group_by_id_not_name() {
        let records = vec![
            with_payer(expense(1, date(1), 10_00, Currency::Usd), 1, "Ann"),
            with_payer(expense(2, date(2), 20_00, Currency::Usd), 2, "Ann"),
        ];
        let rows = aggregate_by(&records, Grouping::Payer, 13.5);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn conversion_is_linear_in_the_group_sum() {
        // Sum-then-convert must equal convert-then-sum within tolerance.
        let amounts = [135_00, 27_01, 999_99, 1];
        let records: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| expense(i as i64 + 1, date(1), a, Currency::Bwp))
            .collect();
        let total = grand_total(&records, 13.5);
        let per_record: f64 = amounts.iter().map(|&a| a as f64 / 13.5).sum();
        assert!((total.total_usd_equiv - per_record).abs() < 1e-6);
    }

    #[test]
    fn bad_rate_falls_back_in_the_equivalent() {
        let records = vec![expense(1, date(1), 100_00, Currency::Bwp)];
        for bad in [0.0, f64::NAN] {
            let total = grand_total(&records, bad);
            assert!((total.total_usd_equiv - 100_00.0 / 13.5).abs() < 1e-6);
        }
    }

    #[test]
    fn rows_preserve_first_seen_order() {
        let records = vec![
            with_supplier(expense(1, date(1), 1, Currency::Usd), 2, "Zeta"),
            with_supplier(expense(2, date(2), 1, Currency::Usd), 1, "Acme"),
            with_supplier(expense(3, date(3), 1, Currency::Usd), 2, "Zeta"),
        ];
        let rows = aggregate_by(&records, Grouping::Supplier, 13.5);
        assert_eq!(
            rows.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            vec!["Zeta", "Acme"]
        );
    }
}
