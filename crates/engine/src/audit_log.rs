//! Append-only activity log.
//!
//! One row per expense mutation (`added` / `removed`). Entries never change
//! once written; the listing joins each entry with its expense for display.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, MoneyMinor};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Added,
    Removed,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }

    /// Human form used in the activity log and its exports.
    #[must_use]
    pub fn display(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
        }
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "added" => Ok(Self::Added),
            "removed" => Ok(Self::Removed),
            other => Err(EngineError::KeyNotFound(format!(
                "unknown audit action: {other}"
            ))),
        }
    }
}

/// A log entry joined with the expense it concerns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub expense_id: i64,
    pub action: AuditAction,
    pub user_id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub expense_date: NaiveDate,
    pub amount: MoneyMinor,
    pub currency: Currency,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub expense_id: i64,
    pub action: String,
    pub user_id: i64,
    pub user_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
