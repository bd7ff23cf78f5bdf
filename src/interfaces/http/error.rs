use crate::error::PaymentError;
use crate::interfaces::http::dto::{ErrorResponse, FailureResponse};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

const PAYMENT_FAILED: &str = "Payment failed. Please try again.";
const REQUEST_TIMEOUT: &str = "Request timeout. Please try again.";
const INTERNAL_ERROR: &str = "Internal server error";
const INVALID_BODY: &str = "Invalid request body.";

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// A payment that did not go through: `{success: false, message}`.
    Failure {
        status: StatusCode,
        body: FailureResponse,
    },
    /// A fault of the server itself: `{status: "error", message}`.
    Fault {
        status: StatusCode,
        body: ErrorResponse,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Failure {
            status: StatusCode::BAD_REQUEST,
            body: FailureResponse::new(message),
        }
    }

    pub fn invalid_body() -> Self {
        Self::bad_request(INVALID_BODY)
    }

    pub fn not_found(path: &str) -> Self {
        ApiError::Fault {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse {
                path: Some(path.to_string()),
                ..ErrorResponse::new("Endpoint not found")
            },
        }
    }

    /// Generic 500. `detail` is only shown when `expose_details` is set.
    pub fn internal(detail: impl Into<String>, expose_details: bool) -> Self {
        ApiError::Fault {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                error: expose_details.then(|| detail.into()),
                ..ErrorResponse::new(INTERNAL_ERROR)
            },
        }
    }

    /// Maps a failed checkout onto its HTTP answer and logs it.
    pub fn from_payment(err: PaymentError, expose_details: bool) -> Self {
        match err {
            PaymentError::Validation(errors) => {
                tracing::info!(%errors, "rejected invalid submission");
                ApiError::Failure {
                    status: StatusCode::BAD_REQUEST,
                    body: FailureResponse::from(errors),
                }
            }
            PaymentError::Transport {
                detail,
                gateway_message,
            } => {
                tracing::error!(%detail, "gateway call failed");
                ApiError::Failure {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: FailureResponse::new(
                        gateway_message.unwrap_or_else(|| PAYMENT_FAILED.to_string()),
                    ),
                }
            }
            PaymentError::GatewayTimeout => {
                tracing::warn!("gateway call timed out");
                ApiError::Failure {
                    status: StatusCode::GATEWAY_TIMEOUT,
                    body: FailureResponse::new(REQUEST_TIMEOUT),
                }
            }
            err @ (PaymentError::Encryption(_) | PaymentError::Config(_)) => {
                tracing::error!(error = %err, "internal failure while processing payment");
                Self::internal(err.to_string(), expose_details)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Failure { status, .. } | ApiError::Fault { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Failure { status, body } => (status, Json(body)).into_response(),
            ApiError::Fault { status, body } => (status, Json(body)).into_response(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Failure { status, body } => write!(f, "API Error {status}: {}", body.message),
            ApiError::Fault { status, body } => write!(f, "API Error {status}: {}", body.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{Field, FieldIssue, ValidationErrors};
    use crate::error::ConfigError;

    #[test]
    fn test_payment_error_status_mapping() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Email, FieldIssue::Missing);
        assert_eq!(
            ApiError::from_payment(errors.into(), false).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from_payment(PaymentError::GatewayTimeout, false).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from_payment(
                PaymentError::Transport {
                    detail: "connection refused".into(),
                    gateway_message: None
                },
                false
            )
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transport_relays_gateway_message() {
        let err = ApiError::from_payment(
            PaymentError::Transport {
                detail: "HTTP 400".into(),
                gateway_message: Some("Invalid card".into()),
            },
            false,
        );
        match err {
            ApiError::Failure { body, .. } => assert_eq!(body.message, "Invalid card"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_internal_detail_only_when_exposed() {
        let hidden = ApiError::from_payment(ConfigError::EmptySecretKey.into(), false);
        let shown = ApiError::from_payment(ConfigError::EmptySecretKey.into(), true);
        match (hidden, shown) {
            (ApiError::Fault { body: hidden, .. }, ApiError::Fault { body: shown, .. }) => {
                assert_eq!(hidden.message, INTERNAL_ERROR);
                assert!(hidden.error.is_none());
                assert!(shown.error.unwrap().contains("secret key"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
