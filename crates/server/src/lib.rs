use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerConfig, run, run_with_listener, spawn_with_listener};

mod audit;
mod expenses;
mod meta;
mod rates;
mod server;
mod summaries;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{
            ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseView, ImportResponse,
            ReceiptsUpdate,
        };
    }

    pub mod summary {
        pub use api_types::summary::{AggregateRowView, SummaryResponse, TotalResponse};
    }

    pub mod audit {
        pub use api_types::audit::{AuditEntryView, AuditResponse};
    }

    pub mod meta {
        pub use api_types::meta::{MetaItemNew, MetaItemView, MetaListResponse};
    }

    pub mod rate {
        pub use api_types::rate::{RateOverride, RateView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidCurrency(_)
        | EngineError::InvalidName(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
