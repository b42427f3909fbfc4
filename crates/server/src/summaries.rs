//! Aggregate API endpoints.
//!
//! These serve the SQL shortcut totals; clients recomputing from the raw
//! list must arrive at the same figures.

use api_types::summary::{AggregateRowView, SummaryResponse, TotalResponse};
use axum::{Extension, Json, extract::State};
use engine::{AggregateRow, Grouping, User};

use crate::{ServerError, server::ServerState};

fn row_view(row: AggregateRow) -> AggregateRowView {
    AggregateRowView {
        label: row.label,
        total_usd_minor: row.total_usd.minor(),
        total_bwp_minor: row.total_bwp.minor(),
        total_usd_equiv_minor: row.total_usd_equiv,
    }
}

async fn current_rate(state: &ServerState) -> f64 {
    state.rates.read().await.cache.effective()
}

pub async fn total(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<TotalResponse>, ServerError> {
    let rate = current_rate(&state).await;
    let row = state.engine.summary_total(rate).await?;
    Ok(Json(TotalResponse {
        total_usd_minor: row.total_usd.minor(),
        total_bwp_minor: row.total_bwp.minor(),
        total_usd_equiv_minor: row.total_usd_equiv,
    }))
}

async fn grouped(
    state: ServerState,
    grouping: Grouping,
) -> Result<Json<SummaryResponse>, ServerError> {
    let rate = current_rate(&state).await;
    let rows = state.engine.totals_by(grouping, rate).await?;
    Ok(Json(SummaryResponse {
        rows: rows.into_iter().map(row_view).collect(),
    }))
}

pub async fn by_payer(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryResponse>, ServerError> {
    grouped(state, Grouping::Payer).await
}

pub async fn by_supplier(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryResponse>, ServerError> {
    grouped(state, Grouping::Supplier).await
}

pub async fn by_category(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryResponse>, ServerError> {
    grouped(state, Grouping::Category).await
}
