//! Export formatter.
//!
//! Four fixed views (expenses list, per-group summary, total spend,
//! activity log) rendered to delimited text or to a single-table PDF. Both
//! renderers are deterministic: the same table yields the same bytes.

mod csv;
mod pdf;

pub use csv::to_csv;
pub use pdf::to_pdf;

use crate::{AggregateRow, AuditEntry, Currency, ExpenseRecord, Grouping};

/// A rendered view: title, header row, data rows. Everything downstream of
/// this struct is pure formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(ToString::to_string).collect()
}

/// Amount cell for the raw expenses list. Removed records export their
/// amount negated so imported totals still reconcile; the live UI instead
/// shows them unsigned with a removed marker.
fn export_amount(record: &ExpenseRecord) -> String {
    if record.is_active() {
        record.amount.to_decimal_string()
    } else {
        (-record.amount).to_decimal_string()
    }
}

/// USD-equivalent cell: minor units rendered with two decimals.
fn equiv_cell(minor: f64) -> String {
    format!("{:.2}", minor / 100.0)
}

/// The raw expenses list view.
#[must_use]
pub fn expenses_table(records: &[ExpenseRecord]) -> ExportTable {
    let headers = strings(&[
        "Date",
        "Description",
        "Amount",
        "Currency",
        "Supplier",
        "Category",
        "Added by",
        "Paid for",
        "Removed by",
        "Receipt URL",
    ]);
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.expense_date.format("%Y-%m-%d").to_string(),
                r.description.clone(),
                export_amount(r),
                r.currency.code().to_string(),
                r.supplier_label().to_string(),
                r.category_label().to_string(),
                r.added_by_name.clone(),
                r.user_name.clone(),
                r.removed_by_name.clone().unwrap_or_default(),
                r.receipt_urls.join("; "),
            ]
        })
        .collect();
    ExportTable {
        title: "Expenses".to_string(),
        headers,
        rows,
    }
}

/// A per-group summary view (by payer, supplier or category).
#[must_use]
pub fn summary_table(grouping: Grouping, rows: &[AggregateRow]) -> ExportTable {
    let headers = strings(&[
        grouping.label_header(),
        "USD",
        "BWP",
        "Total (USD equiv)",
    ]);
    let data = rows
        .iter()
        .map(|row| {
            vec![
                row.label.clone(),
                row.total_usd.to_decimal_string(),
                row.total_bwp.to_decimal_string(),
                equiv_cell(row.total_usd_equiv),
            ]
        })
        .collect();
    ExportTable {
        title: format!("Spend by {}", grouping.label_header().to_lowercase()),
        headers,
        rows: data,
    }
}

/// The total-spend view: one row per currency plus the combined total.
#[must_use]
pub fn total_table(total: &AggregateRow) -> ExportTable {
    ExportTable {
        title: "Total spend".to_string(),
        headers: strings(&["Currency", "Amount", "Total (USD equiv)"]),
        rows: vec![
            vec![
                Currency::Usd.code().to_string(),
                total.total_usd.to_decimal_string(),
                String::new(),
            ],
            vec![
                Currency::Bwp.code().to_string(),
                total.total_bwp.to_decimal_string(),
                String::new(),
            ],
            vec![
                "Total".to_string(),
                String::new(),
                equiv_cell(total.total_usd_equiv),
            ],
        ],
    }
}

/// Amount rendering for the activity-log view. Delimited text exports the
/// bare decimal; the PDF keeps the currency symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountStyle {
    Plain,
    Symbol,
}

/// The activity-log view.
#[must_use]
pub fn audit_table(entries: &[AuditEntry], style: AmountStyle) -> ExportTable {
    let headers = strings(&[
        "Date & time",
        "Action",
        "User",
        "Expense #",
        "Expense date",
        "Amount",
        "Description",
    ]);
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.action.display().to_string(),
                e.user_name.clone(),
                e.expense_id.to_string(),
                e.expense_date.format("%Y-%m-%d").to_string(),
                match style {
                    AmountStyle::Plain => e.amount.to_decimal_string(),
                    AmountStyle::Symbol => e.amount.display_in(e.currency),
                },
                e.description.clone(),
            ]
        })
        .collect();
    ExportTable {
        title: "Activity log".to_string(),
        headers,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoneyMinor;
    use crate::report::test_fixtures::{expense, removed};
    use chrono::{NaiveDate, TimeZone};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn removed_records_export_negated_amounts() {
        let records = vec![
            expense(1, date(1), 50_00, Currency::Usd),
            removed(expense(2, date(2), 30_00, Currency::Usd)),
        ];
        let table = expenses_table(&records);
        assert_eq!(table.rows[0][2], "50.00");
        assert_eq!(table.rows[1][2], "-30.00");
        assert_eq!(table.rows[1][8], "Bob");
        assert_eq!(table.rows[0][8], "");
    }

    #[test]
    fn receipt_urls_join_with_semicolon_space() {
        let mut record = expense(1, date(1), 1, Currency::Usd);
        record.receipt_urls = vec!["https://x/a".to_string(), "https://x/b".to_string()];
        let table = expenses_table(&[record]);
        assert_eq!(table.rows[0][9], "https://x/a; https://x/b");
    }

    #[test]
    fn summary_header_carries_the_group_label() {
        let rows = vec![AggregateRow {
            label: "Acme".to_string(),
            total_usd: MoneyMinor::new(100_00),
            total_bwp: MoneyMinor::new(135_00),
            total_usd_equiv: 110_00.0,
        }];
        let table = summary_table(Grouping::Supplier, &rows);
        assert_eq!(
            table.headers,
            vec!["Supplier", "USD", "BWP", "Total (USD equiv)"]
        );
        assert_eq!(table.rows[0], vec!["Acme", "100.00", "135.00", "110.00"]);
    }

    #[test]
    fn audit_amount_style_splits_per_format() {
        let entry = crate::AuditEntry {
            id: 1,
            expense_id: 7,
            action: crate::AuditAction::Added,
            user_id: 1,
            user_name: "Ann".to_string(),
            created_at: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            expense_date: date(1),
            amount: MoneyMinor::new(12_34),
            currency: Currency::Bwp,
            description: "Taxi".to_string(),
        };
        let plain = audit_table(std::slice::from_ref(&entry), AmountStyle::Plain);
        assert_eq!(plain.rows[0][5], "12.34");

        let symbol = audit_table(&[entry], AmountStyle::Symbol);
        assert_eq!(symbol.rows[0][5], "P12.34");
    }

    #[test]
    fn total_table_has_fixed_rows() {
        let total = AggregateRow {
            label: "Total".to_string(),
            total_usd: MoneyMinor::new(150_00),
            total_bwp: MoneyMinor::new(135_00),
            total_usd_equiv: 160_00.0,
        };
        let table = total_table(&total);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "USD");
        assert_eq!(table.rows[1][0], "BWP");
        assert_eq!(table.rows[2], vec!["Total", "", "160.00"]);
    }
}
