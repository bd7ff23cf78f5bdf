use crate::application::payload::{card_payload, direct_mpesa_payload, mobile_money_payload};
use crate::domain::gateway::{ChargeOutcome, GatewayResponse, TransactionStatus};
use crate::domain::payment::{
    CardForm, ChargeType, DirectMpesaForm, MobileMoneyForm, TransactionReference,
};
use crate::domain::ports::ChargeGatewayBox;
use crate::domain::validation::{
    validate_card, validate_direct_mpesa, validate_mobile_money, validate_transaction_id,
};
use crate::error::Result;
use crate::infrastructure::cipher::CardCipher;
use chrono::{NaiveDate, Utc};

const PAYMENT_FAILED: &str = "Payment failed. Please try again.";
const INITIATION_FAILED: &str = "Failed to initiate payment. Please try again.";

/// What a submission produced once the gateway has answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub success: bool,
    pub message: Option<String>,
    /// The full gateway envelope on success.
    pub gateway: Option<GatewayResponse>,
}

impl Receipt {
    fn from_outcome(
        outcome: ChargeOutcome,
        success_message: Option<String>,
        fallback_failure: &str,
    ) -> Self {
        match outcome {
            ChargeOutcome::Succeeded(response) => Receipt {
                success: true,
                message: success_message,
                gateway: Some(response),
            },
            ChargeOutcome::Rejected { message } => Receipt {
                success: false,
                message: Some(message.unwrap_or_else(|| fallback_failure.to_string())),
                gateway: None,
            },
        }
    }

    /// Gateway id to poll the transaction status with.
    pub fn transaction_id(&self) -> Option<String> {
        self.gateway.as_ref().and_then(GatewayResponse::transaction_id)
    }
}

/// Result of a status lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: TransactionStatus,
    pub gateway: GatewayResponse,
}

/// Runs one checkout submission through validation, payload construction
/// and a single gateway call.
///
/// Holds no per-request state, so one instance serves concurrent
/// submissions.
pub struct CheckoutService {
    gateway: ChargeGatewayBox,
    cipher: CardCipher,
}

impl CheckoutService {
    /// Creates a new `CheckoutService`.
    ///
    /// # Arguments
    ///
    /// * `gateway` - The outbound payment gateway.
    /// * `cipher` - Encrypts card numbers before they leave the process.
    pub fn new(gateway: ChargeGatewayBox, cipher: CardCipher) -> Self {
        Self { gateway, cipher }
    }

    /// Initiates an M-Pesa or Airtel Money push to the payer's handset.
    pub async fn pay_mobile_money(&self, form: &MobileMoneyForm) -> Result<Receipt> {
        let payment = validate_mobile_money(form)?;
        let payload = mobile_money_payload(&payment, TransactionReference::generate());

        tracing::info!(
            tx_ref = %payload.tx_ref,
            network = payment.network.as_str(),
            phone = %payment.phone,
            amount = %payment.amount,
            "initiating mobile money charge"
        );

        let outcome = self
            .gateway
            .charge(ChargeType::from(payment.network), &payload)
            .await?;
        let success_message = format!(
            "Please check your phone for the {} prompt to complete the payment.",
            payment.network.label()
        );
        Ok(Receipt::from_outcome(
            outcome,
            Some(success_message),
            PAYMENT_FAILED,
        ))
    }

    pub async fn pay_card(&self, form: &CardForm) -> Result<Receipt> {
        self.pay_card_on(form, Utc::now().date_naive()).await
    }

    /// Card charge with expiry checked against `today`.
    pub async fn pay_card_on(&self, form: &CardForm, today: NaiveDate) -> Result<Receipt> {
        let payment = validate_card(form, today)?;
        let encrypted = self.cipher.encrypt(payment.number.expose())?;
        let payload = card_payload(&payment, encrypted, TransactionReference::generate());

        tracing::info!(
            tx_ref = %payload.tx_ref,
            email = %payment.email,
            amount = %payment.amount,
            "initiating card charge"
        );

        let outcome = self.gateway.charge(ChargeType::Card, &payload).await?;
        match &outcome {
            ChargeOutcome::Succeeded(_) => {
                tracing::info!(tx_ref = %payload.tx_ref, "card payment initiated")
            }
            ChargeOutcome::Rejected { message } => tracing::warn!(
                tx_ref = %payload.tx_ref,
                reason = message.as_deref().unwrap_or(""),
                "card payment rejected"
            ),
        }
        Ok(Receipt::from_outcome(outcome, None, PAYMENT_FAILED))
    }

    /// Initiates an M-Pesa charge for a caller that supplies its own customer
    /// details.
    pub async fn pay_direct_mpesa(&self, form: &DirectMpesaForm) -> Result<Receipt> {
        let payment = validate_direct_mpesa(form)?;
        let payload = direct_mpesa_payload(&payment, TransactionReference::generate());

        tracing::info!(
            tx_ref = %payload.tx_ref,
            phone = %payment.phone_number,
            amount = %payment.amount,
            "initiating direct M-Pesa charge"
        );

        let outcome = self.gateway.charge(ChargeType::Mpesa, &payload).await?;
        Ok(Receipt::from_outcome(
            outcome,
            Some("Please check your phone for the M-Pesa prompt to complete the payment.".into()),
            INITIATION_FAILED,
        ))
    }

    /// Looks up the settlement status of an initiated transaction.
    pub async fn verify_transaction(&self, transaction_id: &str) -> Result<StatusReport> {
        let transaction_id = validate_transaction_id(transaction_id)?;
        let gateway = self.gateway.verify(transaction_id).await?;
        Ok(StatusReport {
            status: gateway.transaction_status(),
            gateway,
        })
    }
}
