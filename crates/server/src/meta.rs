//! Users, suppliers and categories endpoints.

use api_types::meta::{MetaItemNew, MetaItemView, MetaListResponse};
use api_types::user::{UserView, UsersResponse};
use axum::{Extension, Json, extract::State};
use engine::{MetaItem, User};

use crate::{ServerError, server::ServerState};

fn item_view(item: MetaItem) -> MetaItemView {
    MetaItemView {
        id: item.id,
        name: item.name,
    }
}

pub async fn list_users(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(UsersResponse {
        users: users
            .into_iter()
            .map(|u| UserView {
                id: u.id,
                name: u.name,
                email: Some(u.email),
            })
            .collect(),
    }))
}

pub async fn list_suppliers(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<MetaListResponse>, ServerError> {
    let items = state.engine.list_suppliers().await?;
    Ok(Json(MetaListResponse {
        items: items.into_iter().map(item_view).collect(),
    }))
}

pub async fn create_supplier(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<MetaItemNew>,
) -> Result<Json<MetaItemView>, ServerError> {
    let item = state.engine.create_supplier(&payload.name).await?;
    Ok(Json(item_view(item)))
}

pub async fn list_categories(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<MetaListResponse>, ServerError> {
    let items = state.engine.list_categories().await?;
    Ok(Json(MetaListResponse {
        items: items.into_iter().map(item_view).collect(),
    }))
}

pub async fn create_category(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<MetaItemNew>,
) -> Result<Json<MetaItemView>, ServerError> {
    let item = state.engine.create_category(&payload.name).await?;
    Ok(Json(item_view(item)))
}
