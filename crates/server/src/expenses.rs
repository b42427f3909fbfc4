//! Expense API endpoints.

use api_types::expense::{
    ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseView, ImportResponse, ReceiptsUpdate,
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use engine::{ExpenseRecord, FilterCriteria, MoneyMinor, NewExpense, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn api_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Bwp => api_types::Currency::Bwp,
    }
}

fn engine_currency(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Bwp => engine::Currency::Bwp,
    }
}

fn view(record: ExpenseRecord) -> ExpenseView {
    ExpenseView {
        id: record.id,
        expense_date: record.expense_date,
        amount_minor: record.amount.minor(),
        currency: api_currency(record.currency),
        description: record.description,
        payment_method: record.payment_method,
        supplier_id: record.supplier_id,
        supplier_name: record.supplier_name,
        category_id: record.category_id,
        category_name: record.category_name,
        user_id: record.user_id,
        user_name: record.user_name,
        added_by_id: record.added_by_id,
        added_by_name: record.added_by_name,
        receipt_urls: record.receipt_urls,
        created_at: record.created_at,
        removed_at: record.removed_at,
        removed_by_name: record.removed_by_name,
    }
}

pub async fn list(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let filter = FilterCriteria {
        date_from: query.date_from,
        date_to: query.date_to,
        payer_id: query.payer_id,
        supplier_id: query.supplier_id,
        category_id: query.category_id,
        // The raw list defaults to showing removed records; aggregates
        // exclude them regardless.
        include_removed: query.include_removed.unwrap_or(true),
    };
    let records = state.engine.list_expenses(&filter).await?;
    Ok(Json(ExpenseListResponse {
        expenses: records.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let record = state
        .engine
        .add_expense(
            &user.session(),
            NewExpense {
                expense_date: payload.expense_date,
                amount: MoneyMinor::new(payload.amount_minor),
                currency: engine_currency(payload.currency),
                description: payload.description,
                payment_method: payload.payment_method,
                supplier_id: payload.supplier_id,
                category_id: payload.category_id,
                payer_id: payload.payer_id,
            },
        )
        .await?;
    Ok(Json(view(record)))
}

pub async fn update_receipts(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReceiptsUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let record = state
        .engine
        .update_receipts(&user.session(), id, payload.receipt_urls)
        .await?;
    Ok(Json(view(record)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseView>, ServerError> {
    state.engine.remove_expense(&user.session(), id).await?;
    let record = state.engine.expense(id).await?;
    Ok(Json(view(record)))
}

pub async fn import(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ServerError> {
    if body.is_empty() {
        return Err(ServerError::Generic("empty import body".to_string()));
    }
    let report = state.engine.import_expenses(&user.session(), &body).await?;
    Ok(Json(ImportResponse {
        added: report.added,
        skipped: report.skipped,
    }))
}
