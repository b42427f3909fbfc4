//! Wire types shared between the server and its clients.
//!
//! This crate is serde-only on purpose: no engine types leak onto the
//! wire, and known shape variants of older clients are absorbed here with
//! serde aliases instead of in every handler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Bwp,
}

pub mod expense {
    use super::*;

    /// Query string of `GET /expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
        pub payer_id: Option<i64>,
        pub supplier_id: Option<i64>,
        pub category_id: Option<i64>,
        /// Unset means `true`: the raw list shows removed records.
        pub include_removed: Option<bool>,
    }

    /// Request body of `POST /expenses`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// ISO `YYYY-MM-DD`.
        pub expense_date: NaiveDate,
        pub amount_minor: i64,
        pub currency: Currency,
        pub description: String,
        pub payment_method: Option<String>,
        pub supplier_id: Option<i64>,
        pub category_id: Option<i64>,
        /// Who the expense was paid for; defaults to the caller. Older
        /// clients send `uid`.
        #[serde(alias = "uid")]
        pub payer_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub expense_date: NaiveDate,
        pub amount_minor: i64,
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
        pub removed_by_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }

    /// Request body of `PATCH /expenses/{id}/receipts`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptsUpdate {
        pub receipt_urls: Vec<String>,
    }

    /// Response body of `POST /expenses/import`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportResponse {
        pub added: usize,
        pub skipped: usize,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AggregateRowView {
        pub label: String,
        pub total_usd_minor: i64,
        pub total_bwp_minor: i64,
        /// USD minor units, as a float (BWP divides by a decimal rate).
        pub total_usd_equiv_minor: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryResponse {
        pub rows: Vec<AggregateRowView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalResponse {
        pub total_usd_minor: i64,
        pub total_bwp_minor: i64,
        pub total_usd_equiv_minor: f64,
    }
}

pub mod audit {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AuditAction {
        Added,
        Removed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditEntryView {
        pub id: i64,
        pub expense_id: i64,
        pub action: AuditAction,
        pub user_name: String,
        pub created_at: DateTime<Utc>,
        pub expense_date: NaiveDate,
        pub amount_minor: i64,
        pub currency: Currency,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditResponse {
        pub entries: Vec<AuditEntryView>,
    }
}

pub mod user {
    use super::*;

    /// A user as listed to clients.
    ///
    /// Older clients used `uid` for the id; the alias keeps their payloads
    /// parseable.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        #[serde(alias = "uid")]
        pub id: i64,
        pub name: String,
        pub email: Option<String>,
    }

    /// Response envelope of `GET /users`. Some deployments wrapped the
    /// list as `items`, hence the alias.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        #[serde(alias = "items")]
        pub users: Vec<UserView>,
    }
}

pub mod meta {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MetaItemView {
        pub id: i64,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MetaItemNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MetaListResponse {
        pub items: Vec<MetaItemView>,
    }
}

pub mod rate {
    use super::*;

    /// Response body of `GET /rate`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateView {
        /// BWP per USD.
        pub rate: f64,
        pub as_of: NaiveDate,
        /// True when the most recent fetch attempt failed and the value is
        /// the last known one.
        pub fetch_failed: bool,
    }

    /// Request body of `PUT /rate` (manual override).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateOverride {
        pub rate: f64,
        pub as_of: Option<NaiveDate>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_new_accepts_the_legacy_uid_field() {
        let body: expense::ExpenseNew = serde_json::from_str(
            r#"{
                "expense_date": "2025-06-01",
                "amount_minor": 5000,
                "currency": "USD",
                "description": "Lunch",
                "uid": 7
            }"#,
        )
        .unwrap();
        assert_eq!(body.payer_id, Some(7));
    }

    #[test]
    fn users_response_accepts_the_items_envelope() {
        let body: user::UsersResponse =
            serde_json::from_str(r#"{"items": [{"uid": 1, "name": "Ann", "email": null}]}"#)
                .unwrap();
        assert_eq!(body.users.len(), 1);
        assert_eq!(body.users[0].id, 1);
    }

    #[test]
    fn currency_codes_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Bwp).unwrap(), "\"BWP\"");
        assert_eq!(
            serde_json::from_str::<Currency>("\"USD\"").unwrap(),
            Currency::Usd
        );
    }
}
