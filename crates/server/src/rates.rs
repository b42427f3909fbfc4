//! Exchange-rate endpoints.
//!
//! The rate is best-effort: one fetch from the configured source per
//! server session, the last known value on failure, and a manual override
//! for when the source is down. A broken rate source is never an error to
//! the client, only a `fetch_failed` flag.

use api_types::rate::{RateOverride, RateView};
use axum::{Extension, Json, extract::State};
use chrono::{NaiveDate, Utc};
use engine::User;
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

/// Frankfurter-style payload: `{"date": "...", "rates": {"BWP": 13.42}}`.
#[derive(Debug, Deserialize)]
struct RateSourcePayload {
    date: Option<NaiveDate>,
    rates: std::collections::HashMap<String, f64>,
}

async fn fetch_rate(url: &str) -> Option<(f64, NaiveDate)> {
    let payload = reqwest::get(url)
        .await
        .ok()?
        .json::<RateSourcePayload>()
        .await
        .ok()?;
    let rate = payload.rates.get("BWP").copied()?;
    Some((rate, payload.date.unwrap_or_else(|| Utc::now().date_naive())))
}

async fn refresh_once(state: &ServerState) {
    {
        let rates = state.rates.read().await;
        if rates.fetched {
            return;
        }
    }
    let mut rates = state.rates.write().await;
    if rates.fetched {
        return;
    }
    rates.fetched = true;

    let Some(url) = state.rate_url.as_deref() else {
        return;
    };
    match fetch_rate(url).await {
        Some((rate, as_of)) => {
            rates.cache.apply_fetch(rate, as_of);
            tracing::info!("exchange rate refreshed: {rate} BWP/USD as of {as_of}");
        }
        None => {
            rates.cache.fetch_failed();
            tracing::warn!("exchange rate fetch failed, keeping last known value");
        }
    }
}

pub async fn get_rate(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<RateView>, ServerError> {
    refresh_once(&state).await;
    let rates = state.rates.read().await;
    Ok(Json(RateView {
        rate: rates.cache.current.rate,
        as_of: rates.cache.current.as_of,
        fetch_failed: rates.cache.fetch_failed,
    }))
}

pub async fn override_rate(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RateOverride>,
) -> Result<Json<RateView>, ServerError> {
    let as_of = payload.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let mut rates = state.rates.write().await;
    if !rates.cache.apply_override(payload.rate, as_of) {
        return Err(ServerError::Generic(
            "rate must be a positive finite number".to_string(),
        ));
    }
    Ok(Json(RateView {
        rate: rates.cache.current.rate,
        as_of: rates.cache.current.as_of,
        fetch_failed: rates.cache.fetch_failed,
    }))
}
