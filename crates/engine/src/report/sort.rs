use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ExpenseRecord;

use super::AggregateRow;

/// Ordering for summary rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySortMode {
    /// Ascending, case-insensitive group label.
    #[default]
    Alpha,
    /// Descending USD-equivalent total.
    Spend,
}

/// Sortable columns of the raw expense list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Date,
    Amount,
    Currency,
    Description,
    Payer,
    Supplier,
    Category,
    AddedBy,
    RemovedBy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sorts summary rows in place. Both modes are stable, so ties keep their
/// incoming (first-seen) order.
pub fn sort_rows(rows: &mut [AggregateRow], mode: SummarySortMode) {
    match mode {
        SummarySortMode::Alpha => {
            rows.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        }
        SummarySortMode::Spend => {
            rows.sort_by(|a, b| {
                b.total_usd_equiv
                    .partial_cmp(&a.total_usd_equiv)
                    .unwrap_or(Ordering::Equal)
            });
        }
    }
}

/// Sorts the raw expense list in place by one column.
///
/// String columns compare case-insensitively, the amount column compares
/// the native numeric value. The removed-by key is empty for active
/// records in both directions, so active rows group together at one end.
pub fn sort_records(records: &mut [ExpenseRecord], column: SortColumn, direction: SortDirection) {
    let cmp = |a: &ExpenseRecord, b: &ExpenseRecord| -> Ordering {
        match column {
            SortColumn::Date => a.expense_date.cmp(&b.expense_date),
            SortColumn::Amount => a.amount.cmp(&b.amount),
            SortColumn::Currency => a.currency.code().cmp(b.currency.code()),
            SortColumn::Description => fold(&a.description).cmp(&fold(&b.description)),
            SortColumn::Payer => fold(&a.user_name).cmp(&fold(&b.user_name)),
            SortColumn::Supplier => fold(a.supplier_label()).cmp(&fold(b.supplier_label())),
            SortColumn::Category => fold(a.category_label()).cmp(&fold(b.category_label())),
            SortColumn::AddedBy => fold(&a.added_by_name).cmp(&fold(&b.added_by_name)),
            SortColumn::RemovedBy => removed_by_key(a).cmp(&removed_by_key(b)),
        }
    };
    match direction {
        SortDirection::Asc => records.sort_by(cmp),
        SortDirection::Desc => records.sort_by(|a, b| cmp(b, a)),
    }
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

fn removed_by_key(record: &ExpenseRecord) -> String {
    if record.is_active() {
        String::new()
    } else {
        fold(record.removed_by_name.as_deref().unwrap_or_default())
    }
}
