use crate::config::{GatewayConfig, SecretKey};
use crate::domain::gateway::{ChargeOutcome, ChargePayload, GatewayResponse};
use crate::domain::payment::ChargeType;
use crate::domain::ports::ChargeGateway;
use crate::error::{ConfigError, PaymentError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

/// HTTP client for the Flutterwave v3 charge and verify endpoints.
///
/// The configured timeout bounds every call, mobile money included.
#[derive(Clone)]
pub struct FlutterwaveClient {
    client: Client,
    base_url: String,
    secret_key: SecretKey,
}

impl FlutterwaveClient {
    pub fn new(config: &GatewayConfig) -> std::result::Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn charges_url(&self) -> String {
        format!("{}/charges", self.base_url)
    }

    fn verify_url(&self, transaction_id: &str) -> String {
        format!("{}/transactions/{}/verify", self.base_url, transaction_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<GatewayResponse> {
        let response = request
            .bearer_auth(self.secret_key.expose())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let gateway_message = serde_json::from_slice::<GatewayResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            tracing::warn!(
                http_status = status.as_u16(),
                gateway_message = gateway_message.as_deref().unwrap_or(""),
                "gateway returned an error status"
            );
            return Err(PaymentError::Transport {
                detail: format!("gateway responded with HTTP {status}"),
                gateway_message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| PaymentError::Transport {
            detail: format!("unreadable gateway response: {e}"),
            gateway_message: None,
        })
    }
}

fn transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::GatewayTimeout
    } else {
        PaymentError::Transport {
            detail: err.to_string(),
            gateway_message: None,
        }
    }
}

#[async_trait]
impl ChargeGateway for FlutterwaveClient {
    async fn charge(
        &self,
        charge_type: ChargeType,
        payload: &ChargePayload,
    ) -> Result<ChargeOutcome> {
        tracing::debug!(
            url = %self.charges_url(),
            %charge_type,
            tx_ref = %payload.tx_ref,
            secret_key = %self.secret_key.preview(),
            "dispatching charge"
        );

        let request = self
            .client
            .post(self.charges_url())
            .query(&[("type", charge_type.as_str())])
            .json(payload);
        let response = self.send(request).await?;

        tracing::info!(
            %charge_type,
            tx_ref = %payload.tx_ref,
            gateway_status = %response.status,
            "gateway answered charge"
        );
        Ok(response.into_outcome())
    }

    async fn verify(&self, transaction_id: &str) -> Result<GatewayResponse> {
        let request = self.client.get(self.verify_url(transaction_id));
        let response = self.send(request).await?;

        tracing::info!(
            transaction_id,
            gateway_status = %response.status,
            "gateway answered verification"
        );
        Ok(response)
    }
}
