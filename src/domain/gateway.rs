use crate::domain::payment::{Customer, Sensitive, TransactionReference};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope status the gateway uses for an accepted request.
pub const SUCCESS_STATUS: &str = "success";

/// Charge request body sent to the gateway.
///
/// One shape covers the mobile-money, direct M-Pesa and card charges; fields
/// a path does not use are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargePayload {
    pub tx_ref: TransactionReference,
    pub amount: f64,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<Sensitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Hex IV of the card number ciphertext. The gateway contract names this
    /// field `encryption_key`, but it never carries key material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
    pub customer: Customer,
    pub customizations: Customizations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customizations {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// A card number encrypted for transmission, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedField {
    pub ciphertext: String,
    pub iv: String,
}

/// Response envelope returned by every gateway endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Gateway-side transaction id (`data.id`), used for status lookups.
    pub fn transaction_id(&self) -> Option<String> {
        match self.data.as_ref()?.get("id")? {
            Value::Number(id) => Some(id.to_string()),
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            _ => None,
        }
    }

    /// Settlement status reported in `data.status`.
    pub fn transaction_status(&self) -> TransactionStatus {
        self.data
            .as_ref()
            .and_then(|data| data.get("status"))
            .and_then(Value::as_str)
            .map(TransactionStatus::from_gateway)
            .unwrap_or(TransactionStatus::Pending)
    }

    pub fn into_outcome(self) -> ChargeOutcome {
        if self.is_success() {
            ChargeOutcome::Succeeded(self)
        } else {
            ChargeOutcome::Rejected {
                message: self.message,
            }
        }
    }
}

/// Result of a charge the gateway answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeOutcome {
    Succeeded(GatewayResponse),
    /// The gateway answered but declined; `message` is its reason, if any.
    Rejected { message: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Successful,
    Failed,
    Pending,
}

impl TransactionStatus {
    pub fn from_gateway(status: &str) -> Self {
        match status {
            "successful" => TransactionStatus::Successful,
            "failed" => TransactionStatus::Failed,
            _ => TransactionStatus::Pending,
        }
    }

    /// Whether a poller should stop asking.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}
