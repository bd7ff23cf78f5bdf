use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::Uri,
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use crate::domain::payment::{CardForm, DirectMpesaForm, MobileMoneyForm};
use crate::interfaces::http::{ApiError, dto::*};

use super::AppState;

fn read_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(form)| form).map_err(|rejection| {
        tracing::info!(reason = %rejection.body_text(), "unreadable request body");
        ApiError::invalid_body()
    })
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "success",
        message: "Flutterwave Payment API is running",
        mode: state.mode.as_str(),
        endpoints: Endpoints {
            mobile_money: "/api/pay",
            card_payment: "/api/card-pay",
            mpesa_payment: "/api/mpesa-pay",
            verify_transaction: "/api/transactions/{id}/verify",
            health: "/health",
        },
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "success",
        message: "Server is healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// POST /api/pay
pub async fn pay(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MobileMoneyForm>, JsonRejection>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let form = read_body(body)?;
    state
        .checkout
        .pay_mobile_money(&form)
        .await
        .map(|receipt| Json(receipt.into()))
        .map_err(|e| ApiError::from_payment(e, state.expose_error_details))
}

/// POST /api/card-pay
pub async fn card_pay(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CardForm>, JsonRejection>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let form = read_body(body)?;
    state
        .checkout
        .pay_card(&form)
        .await
        .map(|receipt| Json(receipt.into()))
        .map_err(|e| ApiError::from_payment(e, state.expose_error_details))
}

/// POST /api/mpesa-pay
pub async fn mpesa_pay(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DirectMpesaForm>, JsonRejection>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let form = read_body(body)?;
    state
        .checkout
        .pay_direct_mpesa(&form)
        .await
        .map(|receipt| Json(receipt.into()))
        .map_err(|e| ApiError::from_payment(e, state.expose_error_details))
}

/// GET /api/transactions/{id}/verify
pub async fn verify_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .checkout
        .verify_transaction(&transaction_id)
        .await
        .map(|report| Json(report.into()))
        .map_err(|e| ApiError::from_payment(e, state.expose_error_details))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
