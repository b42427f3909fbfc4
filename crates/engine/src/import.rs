//! Bulk CSV import parsing.
//!
//! Input rows are `date, amount, currency, category, supplier, description`.
//! Parsing is forgiving the way a spreadsheet paste needs to be: a header
//! row is detected and skipped, malformed rows are counted and dropped
//! instead of failing the batch.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::{Currency, MoneyMinor, util};

/// One parsed import row, not yet persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub expense_date: NaiveDate,
    pub amount: MoneyMinor,
    pub currency: Currency,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub description: String,
}

/// Parse outcome: usable rows plus the count of rows that were dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub skipped: usize,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parses CSV bytes into import rows.
///
/// A leading BOM is tolerated. A first row whose date column reads `date`
/// (any case) is a header and does not count as skipped.
#[must_use]
pub fn parse_expense_csv(bytes: &[u8]) -> ParsedImport {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut out = ParsedImport::default();
    for (i, record) in reader.records().enumerate() {
        let Ok(record) = record else {
            out.skipped += 1;
            continue;
        };
        let first = record.get(0).unwrap_or_default().trim();
        if i == 0 && first.eq_ignore_ascii_case("date") {
            continue;
        }
        match parse_row(&record) {
            Some(row) => out.rows.push(row),
            None => out.skipped += 1,
        }
    }
    out
}

fn parse_row(record: &csv::StringRecord) -> Option<ImportRow> {
    let field = |i: usize| record.get(i).unwrap_or_default().trim();

    let expense_date = util::parse_iso_date(field(0)).ok()?;
    let amount: MoneyMinor = field(1).parse().ok()?;
    if amount.is_negative() {
        return None;
    }
    let currency = Currency::from_code_lossy(Some(field(2)));
    let category = util::normalize_optional_text(Some(field(3)));
    let supplier = util::normalize_optional_text(Some(field(4)));
    let description = field(5).to_string();

    Some(ImportRow {
        expense_date,
        amount,
        currency,
        category,
        supplier,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_header() {
        let csv = "date,amount,currency,category,supplier,description\r\n\
                   2025-06-01,50.00,USD,Food,Acme,Lunch\r\n\
                   2025-06-02,135,BWP,,,\r\n";
        let parsed = parse_expense_csv(csv.as_bytes());
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].amount, MoneyMinor::new(50_00));
        assert_eq!(parsed.rows[0].supplier.as_deref(), Some("Acme"));
        assert_eq!(parsed.rows[1].currency, Currency::Bwp);
        assert_eq!(parsed.rows[1].category, None);
    }

    #[test]
    fn malformed_rows_are_counted_not_fatal() {
        let csv = "2025-06-01,50,USD,,,ok\r\n\
                   not-a-date,50,USD,,,bad date\r\n\
                   2025-06-03,abc,USD,,,bad amount\r\n\
                   2025-06-04,-5,USD,,,negative\r\n";
        let parsed = parse_expense_csv(csv.as_bytes());
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped, 3);
    }

    #[test]
    fn tolerates_bom_and_unknown_currency() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"2025-06-01,10,ZAR,,,mystery\r\n");
        let parsed = parse_expense_csv(&bytes);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].currency, Currency::Usd);
    }
}
