//! Activity log endpoint.

use api_types::audit::{AuditAction, AuditEntryView, AuditResponse};
use axum::{Extension, Json, extract::Query, extract::State};
use engine::User;
use serde::Deserialize;

use crate::{ServerError, expenses::api_currency, server::ServerState};

const DEFAULT_LIMIT: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u64>,
}

pub async fn list(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = state.engine.list_audit(limit).await?;
    Ok(Json(AuditResponse {
        entries: entries
            .into_iter()
            .map(|e| AuditEntryView {
                id: e.id,
                expense_id: e.expense_id,
                action: match e.action {
                    engine::AuditAction::Added => AuditAction::Added,
                    engine::AuditAction::Removed => AuditAction::Removed,
                },
                user_name: e.user_name,
                created_at: e.created_at,
                expense_date: e.expense_date,
                amount_minor: e.amount.minor(),
                currency: api_currency(e.currency),
                description: e.description,
            })
            .collect(),
    }))
}
