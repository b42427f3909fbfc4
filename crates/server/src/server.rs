use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{audit, expenses, meta, rates, summaries};
use engine::{Engine, RateCache};

/// Exchange-rate state: the cached value plus whether the one startup
/// fetch has happened yet.
pub(crate) struct RateState {
    pub cache: RateCache,
    pub fetched: bool,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub(crate) rates: Arc<RwLock<RateState>>,
    pub(crate) rate_url: Option<String>,
}

/// Server tunables that are not part of the engine.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Source for the BWP-per-USD rate (frankfurter-style JSON). `None`
    /// keeps the fallback/override rate only.
    pub rate_url: Option<String>,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = auth_header.token();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/import", post(expenses::import))
        .route("/expenses/summary", get(summaries::total))
        .route("/expenses/byPayer", get(summaries::by_payer))
        .route("/expenses/bySupplier", get(summaries::by_supplier))
        .route("/expenses/byCategory", get(summaries::by_category))
        .route("/expenses/audit", get(audit::list))
        .route(
            "/expenses/{id}/receipts",
            axum::routing::patch(expenses::update_receipts),
        )
        .route("/expenses/{id}/remove", post(expenses::remove))
        .route("/users", get(meta::list_users))
        .route("/suppliers", get(meta::list_suppliers).post(meta::create_supplier))
        .route(
            "/categories",
            get(meta::list_categories).post(meta::create_category),
        )
        .route("/rate", get(rates::get_rate).put(rates::override_rate))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

fn make_state(engine: Engine, config: ServerConfig) -> ServerState {
    ServerState {
        engine: Arc::new(engine),
        rates: Arc::new(RwLock::new(RateState {
            cache: RateCache::new(Utc::now().date_naive()),
            fetched: false,
        })),
        rate_url: config.rate_url,
    }
}

pub async fn run(engine: Engine, config: ServerConfig) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(make_state(engine, config))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
