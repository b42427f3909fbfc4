//! Core library for Spesario, a small multi-user expense tracker.
//!
//! The crate has two halves:
//! - a pure reporting slice ([`report`] and [`export`]): filtering,
//!   grouped multi-currency totals, sorting and the fixed export views,
//!   all deterministic functions of records + exchange rate;
//! - a sea-orm record store ([`Engine`]): expense writes with soft delete
//!   and an append-only activity log, SQL aggregates equivalent to the
//!   pure fold, metadata registries and bulk CSV import.
//!
//! Amounts are stored as integer minor units in their native currency
//! (USD or BWP); cross-currency totals are derived in USD at report time.

mod audit_log;
mod categories;
mod currency;
mod error;
mod expenses;
pub mod export;
mod import;
mod money;
mod ops;
mod rates;
pub mod report;
mod session;
mod suppliers;
mod users;
mod util;

pub use audit_log::{AuditAction, AuditEntry};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{
    ExpenseRecord, NO_CATEGORY_LABEL, NO_SUPPLIER_LABEL, decode_receipt_column,
    encode_receipt_column,
};
pub use import::{ImportRow, ParsedImport, parse_expense_csv};
pub use money::MoneyMinor;
pub use ops::{Engine, EngineBuilder, ImportReport, MetaItem, NewExpense, receipt_data_url};
pub use rates::{ExchangeRate, FALLBACK_BWP_PER_USD, RateCache, to_usd_minor};
pub use report::{
    AggregateRow, FilterCriteria, Grouping, SortColumn, SortDirection, SummarySortMode,
    aggregate_by, filter, grand_total, sort_records, sort_rows,
};
pub use session::{Role, Session};
pub use users::User;

pub type ResultEngine<T> = Result<T, EngineError>;
