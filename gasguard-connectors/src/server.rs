//! `/gas_data` ingest service
//!
//! The receiving end of [`crate::http::HttpConnector`] and of boards that
//! post directly. `gas_level` may be a number, a numeric string or a whole
//! board line (`"Gas Level: 512"`); the response is the estimate for it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use gasguard_core::{Estimate, GasEstimator, RawReading};
use serde::{Deserialize, Serialize};

use crate::serial::parse_line;

/// `gas_level` as sent by the different clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GasLevel {
    Number(i64),
    Text(String),
}

impl GasLevel {
    pub fn reading(&self) -> Result<RawReading, String> {
        let raw = match self {
            Self::Number(raw) => *raw,
            Self::Text(text) => match text.trim().parse::<i64>() {
                Ok(raw) => raw,
                Err(_) => return parse_line(text.as_bytes()).map_err(|e| e.to_string()),
            },
        };

        u32::try_from(raw)
            .ok()
            .and_then(|raw| RawReading::new(raw).ok())
            .ok_or_else(|| format!("gas_level {} outside the ADC range", raw))
    }
}

#[derive(Debug, Deserialize)]
pub struct GasDataRequest {
    pub gas_level: GasLevel,
}

#[derive(Debug, Serialize)]
pub struct GasDataResponse {
    pub gas_level: RawReading,
    #[serde(flatten)]
    pub estimate: Estimate,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub version: &'static str,
    pub readings_received: u64,
}

struct AppState {
    estimator: GasEstimator,
    received: AtomicU64,
}

type Rejected = (StatusCode, Json<ErrorBody>);

fn bad_request(error: impl Into<String>) -> Rejected {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: error.into(),
        }),
    )
}

/// Create the service router
pub fn router(estimator: GasEstimator) -> Router {
    let state = Arc::new(AppState {
        estimator,
        received: AtomicU64::new(0),
    });

    Router::new()
        .route("/gas_data", post(gas_data_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind `addr` and serve until the process ends
pub async fn serve(addr: SocketAddr, estimator: GasEstimator) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("gas data service listening on http://{}", listener.local_addr()?);
    log::info!("  POST /gas_data - estimate one reading");
    log::info!("  GET  /health   - health check");
    axum::serve(listener, router(estimator)).await
}

async fn gas_data_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GasDataRequest>, JsonRejection>,
) -> Result<Json<GasDataResponse>, Rejected> {
    let Json(request) = body.map_err(|e| bad_request(e.body_text()))?;
    let raw = request.gas_level.reading().map_err(|e| {
        log::warn!("rejected gas data {:?}: {}", request.gas_level, e);
        bad_request(e)
    })?;

    state.received.fetch_add(1, Ordering::Relaxed);
    let estimate = state.estimator.estimate(raw);
    log::info!(
        "received gas data: {} -> {} {}",
        raw,
        estimate.gas_type,
        estimate.concentration
    );

    Ok(Json(GasDataResponse {
        gas_level: raw,
        estimate,
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok",
        version: crate::VERSION,
        readings_received: state.received.load(Ordering::Relaxed),
    })
}
