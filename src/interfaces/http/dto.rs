use crate::application::checkout::{Receipt, StatusReport};
use crate::domain::gateway::{GatewayResponse, TransactionStatus};
use crate::domain::validation::ValidationErrors;
use serde::Serialize;
use serde_json::Value;

/// Answer to a charge submission.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Gateway id the caller can poll the verify endpoint with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// The gateway's whole response envelope, `{status, message, data}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GatewayResponse>,
}

impl From<Receipt> for PaymentResponse {
    fn from(receipt: Receipt) -> Self {
        let transaction_id = receipt.transaction_id();
        PaymentResponse {
            success: receipt.success,
            message: receipt.message,
            transaction_id,
            data: receipt.gateway,
        }
    }
}

/// Failure body for rejected submissions and gateway errors.
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl FailureResponse {
    pub fn new(message: impl Into<String>) -> Self {
        FailureResponse {
            success: false,
            message: message.into(),
            errors: None,
        }
    }
}

impl From<ValidationErrors> for FailureResponse {
    fn from(errors: ValidationErrors) -> Self {
        FailureResponse {
            success: false,
            message: errors.summary(),
            errors: Some(errors),
        }
    }
}

/// Body for unexpected server faults and unknown routes.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error",
            message: message.into(),
            error: None,
            path: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub status: TransactionStatus,
    /// No further polling is needed once this is true.
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<StatusReport> for StatusResponse {
    fn from(report: StatusReport) -> Self {
        StatusResponse {
            success: report.gateway.is_success(),
            status: report.status,
            terminal: report.status.is_terminal(),
            data: report.gateway.data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub mode: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub mobile_money: &'static str,
    pub card_payment: &'static str,
    pub mpesa_payment: &'static str,
    pub verify_transaction: &'static str,
    pub health: &'static str,
}
