use sea_orm::{QueryOrder, QuerySelect, prelude::*};

use crate::{
    AuditAction, AuditEntry, Currency, MoneyMinor, ResultEngine, audit_log, expenses,
};

use super::Engine;

impl Engine {
    /// Lists the activity log, newest first, joined with each entry's
    /// expense for display.
    pub async fn list_audit(&self, limit: u64) -> ResultEngine<Vec<AuditEntry>> {
        let rows: Vec<(audit_log::Model, Option<expenses::Model>)> = audit_log::Entity::find()
            .find_also_related(expenses::Entity)
            .order_by_desc(audit_log::Column::CreatedAt)
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (entry, expense) in rows {
            // Entries cascade-delete with their expense, so the join only
            // misses if the row vanished mid-query.
            let Some(expense) = expense else {
                continue;
            };
            out.push(AuditEntry {
                id: entry.id,
                expense_id: entry.expense_id,
                action: AuditAction::try_from(entry.action.as_str())?,
                user_id: entry.user_id,
                user_name: entry.user_name,
                created_at: entry.created_at,
                expense_date: expense.expense_date,
                amount: MoneyMinor::new(expense.amount_minor),
                currency: Currency::from_code_lossy(Some(&expense.currency)),
                description: expense.description,
            });
        }
        Ok(out)
    }
}
