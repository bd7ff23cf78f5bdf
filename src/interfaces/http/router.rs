use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{ApiError, handlers};
use crate::application::checkout::CheckoutService;
use crate::config::SecretKey;

/// Whether the service is wired to the gateway's sandbox or live keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Test,
    Live,
}

impl Mode {
    pub fn for_key(key: &SecretKey) -> Self {
        if key.is_test_key() { Mode::Test } else { Mode::Live }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Test => "test",
            Mode::Live => "live",
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub checkout: CheckoutService,
    pub mode: Mode,
    /// Include error details in 500 responses.
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(checkout: CheckoutService, mode: Mode, expose_error_details: bool) -> Self {
        AppState {
            checkout,
            mode,
            expose_error_details,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Create the REST API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let expose_error_details = state.expose_error_details;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/pay", post(handlers::pay))
        .route("/api/card-pay", post(handlers::card_pay))
        .route("/api/mpesa-pay", post(handlers::mpesa_pay))
        .route(
            "/api/transactions/{id}/verify",
            get(handlers::verify_transaction),
        )
        .fallback(handlers::not_found)
        // Middleware
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| -> Response {
                let message = panic_message(panic.as_ref());
                tracing::error!(%message, "handler panicked");
                ApiError::internal(message, expose_error_details).into_response()
            },
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
