//! Process configuration.
//!
//! Every setting is a command-line flag with an environment fallback, so the
//! service can be configured from a `.env` file, the environment, or flags.

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "https://api.flutterwave.com/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 5000;

const TEST_KEY_PREFIX: &str = "FLWSECK_TEST";
const KEY_PREVIEW_CHARS: usize = 10;
const AES_256_KEY_LENGTH: usize = 32;

#[derive(Parser, Debug)]
#[command(author, version, about = "KES checkout proxy for mobile-money and card payments", long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Gateway secret key, sent as a bearer token
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: SecretKey,

    /// Hex-encoded 32-byte key used to encrypt card numbers
    #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: EncryptionKey,

    /// Base URL of the payment gateway API
    #[arg(long, env = "GATEWAY_BASE_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    /// Upper bound on every gateway call, in seconds
    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub gateway_timeout_secs: u64,

    /// Deployment environment; development exposes error details
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Production)]
    pub environment: Environment,
}

impl Cli {
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        if self.gateway_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(ServerConfig {
            host: self.host,
            port: self.port,
            environment: self.environment,
            gateway: GatewayConfig {
                base_url: normalize_base_url(&self.gateway_url)?,
                secret_key: self.secret_key,
                encryption_key: self.encryption_key,
                timeout: Duration::from_secs(self.gateway_timeout_secs),
            },
        })
    }
}

fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidGatewayUrl(url.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn exposes_error_details(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Gateway bearer secret. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptySecretKey);
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First characters of the key, for log lines.
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(KEY_PREVIEW_CHARS).collect();
        format!("{head}...")
    }

    /// Whether this is a sandbox key.
    pub fn is_test_key(&self) -> bool {
        self.0.starts_with(TEST_KEY_PREFIX)
    }
}

impl FromStr for SecretKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", self.preview())
    }
}

/// AES-256 key for card number encryption.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; AES_256_KEY_LENGTH]);

impl EncryptionKey {
    pub const LENGTH: usize = AES_256_KEY_LENGTH;

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, ConfigError> {
        let bytes = hex::decode(hex_key.trim())?;
        let key: [u8; Self::LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ConfigError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl FromStr for EncryptionKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(**redacted**)")
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Without trailing slash, e.g. `https://api.flutterwave.com/v3`.
    pub base_url: String,
    pub secret_key: SecretKey,
    pub encryption_key: EncryptionKey,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub gateway: GatewayConfig,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
