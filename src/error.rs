use crate::domain::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Gateway transport error: {detail}")]
    Transport {
        detail: String,
        /// Message reported by the gateway in an error body, safe to relay.
        gateway_message: Option<String>,
    },
    #[error("Gateway request timed out")]
    GatewayTimeout,
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("encryption key is not valid hex: {0}")]
    InvalidKeyEncoding(#[from] hex::FromHexError),
    #[error("encryption key must decode to 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("secret key must not be empty")]
    EmptySecretKey,
    #[error("gateway url must start with http:// or https://, got {0:?}")]
    InvalidGatewayUrl(String),
    #[error("gateway timeout must be at least one second")]
    InvalidTimeout,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
