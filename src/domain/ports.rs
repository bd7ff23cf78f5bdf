use super::gateway::{ChargeOutcome, ChargePayload, GatewayResponse};
use super::payment::ChargeType;
use crate::error::Result;
use async_trait::async_trait;

/// Outbound payment gateway.
///
/// Each call is a single attempt; implementations must not retry.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    /// Initiates a charge of the given type.
    async fn charge(&self, charge_type: ChargeType, payload: &ChargePayload)
        -> Result<ChargeOutcome>;

    /// Looks up a transaction by its gateway id.
    async fn verify(&self, transaction_id: &str) -> Result<GatewayResponse>;
}

pub type ChargeGatewayBox = Box<dyn ChargeGateway>;
