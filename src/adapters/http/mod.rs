//! HTTP boundary
//!
//! Thin translation layer only: requests become ledger calls, ledger results
//! and errors become responses. No retries, no caching, no validation here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use crate::{
    commands::{
        charge::ChargeRequest, show_history::ShowHistoryRequest, show_point::ShowPointRequest,
        use_point::UsePointRequest, Error, PointLedger,
    },
    domain::{Balance, HistoryRecord},
    ports::{balance::BalanceStore, history::HistoryLog},
};

pub fn router<B, H>(ledger: PointLedger<B, H>) -> Router
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    Router::new()
        .route("/point/:id", get(show_point::<B, H>))
        .route("/point/:id/histories", get(show_history::<B, H>))
        .route("/point/:id/charge", patch(charge::<B, H>))
        .route("/point/:id/use", patch(use_point::<B, H>))
        .layer(TraceLayer::new_for_http())
        .with_state(ledger)
}

#[derive(Deserialize)]
pub struct PointRequest {
    pub amount: i64,
}

/// Balance as serialized on the wire
#[derive(Debug, Serialize)]
pub struct UserPointResponse {
    id: u64,
    point: u64,
    #[serde(rename = "updateMillis")]
    update_millis: i64,
}

impl From<Balance> for UserPointResponse {
    fn from(balance: Balance) -> Self {
        Self {
            id: balance.user_id,
            point: balance.point,
            update_millis: balance.updated_at.timestamp_millis(),
        }
    }
}

/// History record as serialized on the wire
#[derive(Debug, Serialize)]
pub struct PointHistoryResponse {
    id: u64,
    #[serde(rename = "userId")]
    user_id: u64,
    amount: u64,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "updateMillis")]
    update_millis: i64,
}

impl From<HistoryRecord> for PointHistoryResponse {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            amount: record.amount,
            kind: record.kind.as_str(),
            update_millis: record.created_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    code: String,
    message: String,
}

/// Wraps [`commands::Error`](Error) so the handlers can use `?`.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = if self.0.is_client_error() {
            (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    code: "400".to_string(),
                    message: self.0.to_string(),
                },
            )
        } else {
            tracing::error!(error = ?self.0, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    code: "500".to_string(),
                    message: "internal error".to_string(),
                },
            )
        };
        (status, Json(body)).into_response()
    }
}

async fn show_point<B, H>(
    State(ledger): State<PointLedger<B, H>>,
    Path(id): Path<u64>,
) -> Result<Json<UserPointResponse>, ApiError>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    let balance = ledger.oneshot(ShowPointRequest { user_id: id }).await?;
    Ok(Json(balance.into()))
}

async fn show_history<B, H>(
    State(ledger): State<PointLedger<B, H>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<PointHistoryResponse>>, ApiError>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    let records = ledger.oneshot(ShowHistoryRequest { user_id: id }).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn charge<B, H>(
    State(ledger): State<PointLedger<B, H>>,
    Path(id): Path<u64>,
    Json(body): Json<PointRequest>,
) -> Result<Json<UserPointResponse>, ApiError>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    let balance = ledger
        .oneshot(ChargeRequest {
            user_id: id,
            amount: body.amount,
        })
        .await?;
    Ok(Json(balance.into()))
}

async fn use_point<B, H>(
    State(ledger): State<PointLedger<B, H>>,
    Path(id): Path<u64>,
    Json(body): Json<PointRequest>,
) -> Result<Json<UserPointResponse>, ApiError>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    let balance = ledger
        .oneshot(UsePointRequest {
            user_id: id,
            amount: body.amount,
        })
        .await?;
    Ok(Json(balance.into()))
}
