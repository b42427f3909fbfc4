//! Expense record primitives.
//!
//! An `ExpenseRecord` is one financial transaction. Rows are denormalized:
//! supplier/category/payer names are stamped onto the row at write time so
//! listings and aggregates never need a join. Removal is a soft delete
//! (`removed_at`/`removed_by`), append-only; there is no un-remove.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, MoneyMinor};

/// Label shown and exported for expenses with no supplier set.
pub const NO_SUPPLIER_LABEL: &str = "(No supplier)";
/// Label shown and exported for expenses with no category set.
pub const NO_CATEGORY_LABEL: &str = "(No category)";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub expense_date: NaiveDate,
    pub amount: MoneyMinor,
    pub currency: Currency,
    pub description: String,
    pub payment_method: Option<String>,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub user_id: i64,
    pub user_name: String,
    pub added_by_id: i64,
    pub added_by_name: String,
    pub receipt_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by_id: Option<i64>,
    pub removed_by_name: Option<String>,
}

impl ExpenseRecord {
    /// A record takes part in aggregation only while it is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.removed_at.is_none()
    }

    /// Supplier label for display and grouping.
    #[must_use]
    pub fn supplier_label(&self) -> &str {
        self.supplier_name.as_deref().unwrap_or(NO_SUPPLIER_LABEL)
    }

    /// Category label for display and grouping.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or(NO_CATEGORY_LABEL)
    }
}

/// Decodes the stored receipt column into an ordered URL list.
///
/// Old rows are not uniform: the column may hold a JSON array of strings, a
/// single bare URL, or nothing. Every variant maps here, once, so the rest
/// of the crate only ever sees `Vec<String>`.
#[must_use]
pub fn decode_receipt_column(value: Option<&str>) -> Vec<String> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    if raw.starts_with('[') {
        if let Ok(urls) = serde_json::from_str::<Vec<String>>(raw) {
            return urls
                .into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
    }
    vec![raw.to_string()]
}

/// Encodes a URL list back into the stored column (JSON array, or NULL when
/// empty).
#[must_use]
pub fn encode_receipt_column(urls: &[String]) -> Option<String> {
    let cleaned: Vec<&str> = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        serde_json::to_string(&cleaned).ok()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub expense_date: Date,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub payment_method: Option<String>,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub user_id: i64,
    pub user_name: String,
    pub added_by_id: i64,
    pub added_by_name: String,
    pub receipt_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub removed_at: Option<DateTimeUtc>,
    pub removed_by_id: Option<i64>,
    pub removed_by_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseRecord> for ActiveModel {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: ActiveValue::NotSet,
            expense_date: ActiveValue::Set(record.expense_date),
            amount_minor: ActiveValue::Set(record.amount.minor()),
            currency: ActiveValue::Set(record.currency.code().to_string()),
            description: ActiveValue::Set(record.description.clone()),
            payment_method: ActiveValue::Set(record.payment_method.clone()),
            supplier_id: ActiveValue::Set(record.supplier_id),
            supplier_name: ActiveValue::Set(record.supplier_name.clone()),
            category_id: ActiveValue::Set(record.category_id),
            category_name: ActiveValue::Set(record.category_name.clone()),
            user_id: ActiveValue::Set(record.user_id),
            user_name: ActiveValue::Set(record.user_name.clone()),
            added_by_id: ActiveValue::Set(record.added_by_id),
            added_by_name: ActiveValue::Set(record.added_by_name.clone()),
            receipt_url: ActiveValue::Set(encode_receipt_column(&record.receipt_urls)),
            created_at: ActiveValue::Set(record.created_at),
            removed_at: ActiveValue::Set(record.removed_at),
            removed_by_id: ActiveValue::Set(record.removed_by_id),
            removed_by_name: ActiveValue::Set(record.removed_by_name.clone()),
        }
    }
}

impl TryFrom<Model> for ExpenseRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            expense_date: model.expense_date,
            amount: MoneyMinor::new(model.amount_minor),
            currency: Currency::from_code_lossy(Some(&model.currency)),
            description: model.description,
            payment_method: model.payment_method,
            supplier_id: model.supplier_id,
            supplier_name: model.supplier_name,
            category_id: model.category_id,
            category_name: model.category_name,
            user_id: model.user_id,
            user_name: model.user_name,
            added_by_id: model.added_by_id,
            added_by_name: model.added_by_name,
            receipt_urls: decode_receipt_column(model.receipt_url.as_deref()),
            created_at: model.created_at,
            removed_at: model.removed_at,
            removed_by_id: model.removed_by_id,
            removed_by_name: model.removed_by_name,
        })
    }
}
