//! Server-side aggregates.
//!
//! These are the SQL shortcut for the pure fold in `report::aggregate`:
//! per-currency SUMs over active rows, grouped the same way. Both paths
//! must produce the same groups and native subtotals.

use sea_orm::{Statement, Value, prelude::*};

use crate::{
    AggregateRow, Currency, Grouping, MoneyMinor, NO_CATEGORY_LABEL, NO_SUPPLIER_LABEL,
    ResultEngine, rates::to_usd_minor,
};

use super::Engine;

fn row_from_sums(label: String, usd_minor: i64, bwp_minor: i64, rate: f64) -> AggregateRow {
    let total_usd = MoneyMinor::new(usd_minor);
    let total_bwp = MoneyMinor::new(bwp_minor);
    AggregateRow {
        label,
        total_usd,
        total_bwp,
        total_usd_equiv: total_usd.minor() as f64 + to_usd_minor(total_bwp, Currency::Bwp, rate),
    }
}

const SUM_COLUMNS: &str = "COALESCE(SUM(CASE WHEN currency = 'USD' THEN amount_minor ELSE 0 END), 0) AS usd, \
     COALESCE(SUM(CASE WHEN currency = 'BWP' THEN amount_minor ELSE 0 END), 0) AS bwp";

impl Engine {
    /// Grand total over active rows.
    pub async fn summary_total(&self, rate: f64) -> ResultEngine<AggregateRow> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!("SELECT {SUM_COLUMNS} FROM expenses WHERE removed_at IS NULL"),
            Vec::<Value>::new(),
        );
        let row = self.database.query_one(stmt).await?;
        let (usd, bwp) = match row {
            Some(r) => (
                r.try_get("", "usd").unwrap_or(0),
                r.try_get("", "bwp").unwrap_or(0),
            ),
            None => (0, 0),
        };
        Ok(row_from_sums("Total".to_string(), usd, bwp, rate))
    }

    /// Per-payer totals over active rows. Groups by user id; the label is
    /// the stamped payer name.
    pub async fn totals_by_payer(&self, rate: f64) -> ResultEngine<Vec<AggregateRow>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT MAX(user_name) AS label, {SUM_COLUMNS} \
                 FROM expenses WHERE removed_at IS NULL \
                 GROUP BY user_id ORDER BY MIN(id)"
            ),
            Vec::<Value>::new(),
        );
        self.grouped_rows(stmt, rate).await
    }

    /// Per-supplier totals over active rows. Unset suppliers share the
    /// `(No supplier)` bucket.
    pub async fn totals_by_supplier(&self, rate: f64) -> ResultEngine<Vec<AggregateRow>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(supplier_name, ?) AS label, {SUM_COLUMNS} \
                 FROM expenses WHERE removed_at IS NULL \
                 GROUP BY label ORDER BY MIN(id)"
            ),
            [NO_SUPPLIER_LABEL.into()],
        );
        self.grouped_rows(stmt, rate).await
    }

    /// Per-category totals over active rows. Unset categories share the
    /// `(No category)` bucket.
    pub async fn totals_by_category(&self, rate: f64) -> ResultEngine<Vec<AggregateRow>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(category_name, ?) AS label, {SUM_COLUMNS} \
                 FROM expenses WHERE removed_at IS NULL \
                 GROUP BY label ORDER BY MIN(id)"
            ),
            [NO_CATEGORY_LABEL.into()],
        );
        self.grouped_rows(stmt, rate).await
    }

    /// Dispatch helper used by the server handlers.
    pub async fn totals_by(&self, grouping: Grouping, rate: f64) -> ResultEngine<Vec<AggregateRow>> {
        match grouping {
            Grouping::Payer => self.totals_by_payer(rate).await,
            Grouping::Supplier => self.totals_by_supplier(rate).await,
            Grouping::Category => self.totals_by_category(rate).await,
        }
    }

    async fn grouped_rows(&self, stmt: Statement, rate: f64) -> ResultEngine<Vec<AggregateRow>> {
        let rows = self.database.query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let label: String = row.try_get("", "label").unwrap_or_default();
            let usd: i64 = row.try_get("", "usd").unwrap_or(0);
            let bwp: i64 = row.try_get("", "bwp").unwrap_or(0);
            out.push(row_from_sums(label, usd, bwp, rate));
        }
        Ok(out)
    }
}
