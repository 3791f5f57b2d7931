//! Route handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::portfolio::types::{PortfolioRequest, WalletValuation};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `POST /api/portfolio`
pub async fn portfolio(
    State(state): State<AppState>,
    payload: Result<Json<PortfolioRequest>, JsonRejection>,
) -> Result<Json<Vec<WalletValuation>>, ApiError> {
    let start = Instant::now();

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(reason = %rejection.body_text(), "Rejected portfolio request");
            let err = ApiError::InvalidInput;
            metrics::record_request(err.status().as_u16(), start);
            return Err(err);
        }
    };

    tracing::debug!(wallets = request.wallets.len(), "Valuating portfolio");
    let valuations = state.service.valuate(&request.wallets).await;

    metrics::record_request(200, start);
    Ok(Json(valuations))
}

/// `GET /health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
