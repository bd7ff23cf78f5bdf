#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Datelike, Months, Utc};
use kes_checkout::application::checkout::CheckoutService;
use kes_checkout::config::EncryptionKey;
use kes_checkout::domain::gateway::{ChargeOutcome, ChargePayload, GatewayResponse};
use kes_checkout::domain::payment::ChargeType;
use kes_checkout::domain::ports::ChargeGateway;
use kes_checkout::error::{PaymentError, Result};
use kes_checkout::infrastructure::cipher::CardCipher;
use kes_checkout::interfaces::http::{AppState, Mode, create_router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// How the fake gateway answers every call.
#[derive(Debug, Clone)]
pub enum Script {
    Respond(Value),
    Transport(Option<String>),
    Timeout,
    /// The gateway call panics with this message.
    Panic(&'static str),
}

/// In-process gateway that follows a script and records every charge.
#[derive(Clone)]
pub struct ScriptedGateway {
    script: Script,
    pub charges: Arc<Mutex<Vec<(ChargeType, Value)>>>,
    pub verifications: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            charges: Arc::default(),
            verifications: Arc::default(),
        }
    }

    pub fn charge_count(&self) -> usize {
        self.charges.lock().unwrap().len()
    }

    fn answer(&self) -> Result<GatewayResponse> {
        match &self.script {
            Script::Respond(body) => Ok(serde_json::from_value(body.clone()).unwrap()),
            Script::Transport(message) => Err(PaymentError::Transport {
                detail: "gateway responded with HTTP 400".into(),
                gateway_message: message.clone(),
            }),
            Script::Timeout => Err(PaymentError::GatewayTimeout),
            Script::Panic(message) => panic!("{message}"),
        }
    }
}

#[async_trait]
impl ChargeGateway for ScriptedGateway {
    async fn charge(
        &self,
        charge_type: ChargeType,
        payload: &ChargePayload,
    ) -> Result<ChargeOutcome> {
        self.charges
            .lock()
            .unwrap()
            .push((charge_type, serde_json::to_value(payload).unwrap()));
        self.answer().map(GatewayResponse::into_outcome)
    }

    async fn verify(&self, transaction_id: &str) -> Result<GatewayResponse> {
        self.verifications
            .lock()
            .unwrap()
            .push(transaction_id.to_string());
        self.answer()
    }
}

pub fn test_key() -> EncryptionKey {
    EncryptionKey::from_hex(TEST_KEY_HEX).unwrap()
}

pub fn create_test_app(gateway: &ScriptedGateway) -> Router {
    create_test_app_with_details(gateway, false)
}

pub fn create_test_app_with_details(gateway: &ScriptedGateway, expose_details: bool) -> Router {
    let checkout = CheckoutService::new(Box::new(gateway.clone()), CardCipher::new(test_key()));
    create_router(Arc::new(AppState::new(checkout, Mode::Test, expose_details)))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// An `MM/YY` expiry one month from now, always in the future.
pub fn next_month_expiry() -> String {
    let next = Utc::now().date_naive() + Months::new(1);
    format!("{:02}/{:02}", next.month(), next.year() % 100)
}
