use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    Currency, EngineError, ExpenseRecord, FilterCriteria, ImportRow, MoneyMinor, ResultEngine,
    Session, audit_log, categories, encode_receipt_column, expenses, import, suppliers, users,
};

use super::{Engine, with_tx};

/// Command to record one expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub expense_date: NaiveDate,
    pub amount: MoneyMinor,
    pub currency: Currency,
    pub description: String,
    pub payment_method: Option<String>,
    pub supplier_id: Option<i64>,
    pub category_id: Option<i64>,
    /// Who the expense was paid for. Defaults to the acting user when unset.
    pub payer_id: Option<i64>,
}

/// Outcome of a bulk CSV import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

/// Builds a `data:` URL from raw attachment bytes.
///
/// The store treats receipt references as opaque strings, so callers that
/// hold actual file bytes (the admin CLI) embed them this way.
#[must_use]
pub fn receipt_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

trait ApplyExpenseFilters: QueryFilter + Sized {
    fn apply_expense_filters(self, filter: &FilterCriteria) -> Self;
}

impl<T> ApplyExpenseFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_expense_filters(mut self, filter: &FilterCriteria) -> Self {
        if let Some(from) = filter.date_from {
            self = self.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            self = self.filter(expenses::Column::ExpenseDate.lte(to));
        }
        if let Some(payer) = filter.payer_id {
            self = self.filter(expenses::Column::UserId.eq(payer));
        }
        if let Some(supplier) = filter.supplier_id {
            self = self.filter(expenses::Column::SupplierId.eq(supplier));
        }
        if let Some(category) = filter.category_id {
            self = self.filter(expenses::Column::CategoryId.eq(category));
        }
        if !filter.include_removed {
            self = self.filter(expenses::Column::RemovedAt.is_null());
        }
        self
    }
}

async fn insert_audit(
    db_tx: &DatabaseTransaction,
    expense_id: i64,
    action: crate::AuditAction,
    session: &Session,
    at: DateTime<Utc>,
) -> ResultEngine<()> {
    audit_log::ActiveModel {
        id: ActiveValue::NotSet,
        expense_id: ActiveValue::Set(expense_id),
        action: ActiveValue::Set(action.as_str().to_string()),
        user_id: ActiveValue::Set(session.user_id),
        user_name: ActiveValue::Set(session.name.clone()),
        created_at: ActiveValue::Set(at),
    }
    .insert(db_tx)
    .await?;
    Ok(())
}

async fn require_user(db_tx: &DatabaseTransaction, user_id: i64) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
}

async fn resolve_supplier(
    db_tx: &DatabaseTransaction,
    supplier_id: Option<i64>,
) -> ResultEngine<(Option<i64>, Option<String>)> {
    let Some(id) = supplier_id else {
        return Ok((None, None));
    };
    let model = suppliers::Entity::find_by_id(id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("supplier not exists".to_string()))?;
    Ok((Some(model.id), Some(model.name)))
}

async fn resolve_category(
    db_tx: &DatabaseTransaction,
    category_id: Option<i64>,
) -> ResultEngine<(Option<i64>, Option<String>)> {
    let Some(id) = category_id else {
        return Ok((None, None));
    };
    let model = categories::Entity::find_by_id(id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
    Ok((Some(model.id), Some(model.name)))
}

async fn insert_expense_row(
    db_tx: &DatabaseTransaction,
    session: &Session,
    cmd: &NewExpense,
    now: DateTime<Utc>,
) -> ResultEngine<ExpenseRecord> {
    if cmd.amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }

    let payer = require_user(db_tx, cmd.payer_id.unwrap_or(session.user_id)).await?;
    let (supplier_id, supplier_name) = resolve_supplier(db_tx, cmd.supplier_id).await?;
    let (category_id, category_name) = resolve_category(db_tx, cmd.category_id).await?;

    let model = expenses::ActiveModel {
        id: ActiveValue::NotSet,
        expense_date: ActiveValue::Set(cmd.expense_date),
        amount_minor: ActiveValue::Set(cmd.amount.minor()),
        currency: ActiveValue::Set(cmd.currency.code().to_string()),
        description: ActiveValue::Set(cmd.description.trim().to_string()),
        payment_method: ActiveValue::Set(crate::util::normalize_optional_text(
            cmd.payment_method.as_deref(),
        )),
        supplier_id: ActiveValue::Set(supplier_id),
        supplier_name: ActiveValue::Set(supplier_name),
        category_id: ActiveValue::Set(category_id),
        category_name: ActiveValue::Set(category_name),
        user_id: ActiveValue::Set(payer.id),
        user_name: ActiveValue::Set(payer.name.clone()),
        added_by_id: ActiveValue::Set(session.user_id),
        added_by_name: ActiveValue::Set(session.name.clone()),
        receipt_url: ActiveValue::Set(None),
        created_at: ActiveValue::Set(now),
        removed_at: ActiveValue::Set(None),
        removed_by_id: ActiveValue::Set(None),
        removed_by_name: ActiveValue::Set(None),
    }
    .insert(db_tx)
    .await?;

    insert_audit(db_tx, model.id, crate::AuditAction::Added, session, now).await?;
    ExpenseRecord::try_from(model)
}

impl Engine {
    /// Records an expense and its `added` audit entry.
    pub async fn add_expense(
        &self,
        session: &Session,
        cmd: NewExpense,
    ) -> ResultEngine<ExpenseRecord> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let record = insert_expense_row(&db_tx, session, &cmd, now).await?;
            Ok(record)
        })
    }

    /// Lists expenses, newest expense date first.
    ///
    /// Removed records stay in the listing unless the filter excludes them;
    /// they stay out of every aggregate regardless.
    pub async fn list_expenses(
        &self,
        filter: &FilterCriteria,
    ) -> ResultEngine<Vec<ExpenseRecord>> {
        let models = expenses::Entity::find()
            .apply_expense_filters(filter)
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(ExpenseRecord::try_from).collect()
    }

    /// Fetches a single expense.
    pub async fn expense(&self, id: i64) -> ResultEngine<ExpenseRecord> {
        let model = expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        ExpenseRecord::try_from(model)
    }

    /// Replaces the receipt reference list of an expense.
    ///
    /// References are opaque strings; the store never looks at what they
    /// point to.
    pub async fn update_receipts(
        &self,
        _session: &Session,
        id: i64,
        urls: Vec<String>,
    ) -> ResultEngine<ExpenseRecord> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

            let updated = expenses::ActiveModel {
                id: ActiveValue::Set(model.id),
                receipt_url: ActiveValue::Set(encode_receipt_column(&urls)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            ExpenseRecord::try_from(updated)
        })
    }

    /// Soft-removes an expense and writes its `removed` audit entry.
    ///
    /// Removing twice is an error; there is no un-remove.
    pub async fn remove_expense(&self, session: &Session, id: i64) -> ResultEngine<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            if model.removed_at.is_some() {
                return Err(EngineError::ExistingKey(
                    "expense already removed".to_string(),
                ));
            }

            expenses::ActiveModel {
                id: ActiveValue::Set(model.id),
                removed_at: ActiveValue::Set(Some(now)),
                removed_by_id: ActiveValue::Set(Some(session.user_id)),
                removed_by_name: ActiveValue::Set(Some(session.name.clone())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            insert_audit(&db_tx, model.id, crate::AuditAction::Removed, session, now).await?;
            Ok(())
        })
    }

    /// Bulk CSV import.
    ///
    /// Parses the batch, auto-creates unknown supplier/category names, and
    /// records each usable row as an expense paid for by the acting user.
    /// Invalid rows are skipped, not fatal.
    pub async fn import_expenses(
        &self,
        session: &Session,
        bytes: &[u8],
    ) -> ResultEngine<ImportReport> {
        let parsed = import::parse_expense_csv(bytes);
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut report = ImportReport {
                added: 0,
                skipped: parsed.skipped,
            };
            for row in &parsed.rows {
                let cmd = self.import_row_to_command(&db_tx, row).await?;
                insert_expense_row(&db_tx, session, &cmd, now).await?;
                report.added += 1;
            }
            Ok(report)
        })
    }

    async fn import_row_to_command(
        &self,
        db_tx: &DatabaseTransaction,
        row: &ImportRow,
    ) -> ResultEngine<NewExpense> {
        let supplier_id = match row.supplier.as_deref() {
            Some(name) => Some(self.ensure_supplier(db_tx, name).await?),
            None => None,
        };
        let category_id = match row.category.as_deref() {
            Some(name) => Some(self.ensure_category(db_tx, name).await?),
            None => None,
        };
        Ok(NewExpense {
            expense_date: row.expense_date,
            amount: row.amount,
            currency: row.currency,
            description: row.description.clone(),
            payment_method: None,
            supplier_id,
            category_id,
            payer_id: None,
        })
    }
}
