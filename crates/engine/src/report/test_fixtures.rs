//! Shared record builders for the report tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::{Currency, ExpenseRecord, MoneyMinor};

pub(crate) fn expense(
    id: i64,
    expense_date: NaiveDate,
    amount_minor: i64,
    currency: Currency,
) -> ExpenseRecord {
    ExpenseRecord {
        id,
        expense_date,
        amount: MoneyMinor::new(amount_minor),
        currency,
        description: format!("expense {id}"),
        payment_method: None,
        supplier_id: None,
        supplier_name: None,
        category_id: None,
        category_name: None,
        user_id: 1,
        user_name: "Ann".to_string(),
        added_by_id: 1,
        added_by_name: "Ann".to_string(),
        receipt_urls: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        removed_at: None,
        removed_by_id: None,
        removed_by_name: None,
    }
}

pub(crate) fn removed(mut record: ExpenseRecord) -> ExpenseRecord {
    record.removed_at = Some(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap());
    record.removed_by_id = Some(2);
    record.removed_by_name = Some("Bob".to_string());
    record
}

pub(crate) fn with_supplier(mut record: ExpenseRecord, id: i64, name: &str) -> ExpenseRecord {
    record.supplier_id = Some(id);
    record.supplier_name = Some(name.to_string());
    record
}

pub(crate) fn with_category(mut record: ExpenseRecord, id: i64, name: &str) -> ExpenseRecord {
    record.category_id = Some(id);
    record.category_name = Some(name.to_string());
    record
}

pub(crate) fn with_payer(mut record: ExpenseRecord, id: i64, name: &str) -> ExpenseRecord {
    record.user_id = id;
    record.user_name = name.to_string();
    record
}
