use crate::domain::validation::FieldIssue;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Currency of every charge issued by this service.
pub const CURRENCY: &str = "KES";

/// Represents a chargeable amount in KES.
///
/// This is a wrapper around `rust_decimal::Decimal` that can only be built
/// from a value of at least one shilling.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const MIN: Decimal = Decimal::ONE;

    pub fn new(value: Decimal) -> Result<Self, FieldIssue> {
        if value >= Self::MIN {
            Ok(Self(value))
        } else {
            Err(FieldIssue::Invalid("Amount must be at least 1 KES."))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Floating point form used on the gateway wire.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = FieldIssue;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {CURRENCY}", self.0)
    }
}

/// A string that must reach the gateway but never a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive(String);

impl Sensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sensitive(**redacted**)")
    }
}

impl Serialize for Sensitive {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobileNetwork {
    Mpesa,
    Airtel,
}

impl MobileNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            MobileNetwork::Mpesa => "mpesa",
            MobileNetwork::Airtel => "airtel",
        }
    }

    /// Upper-case label shown to the payer, e.g. `MPESA`.
    pub fn label(&self) -> &'static str {
        match self {
            MobileNetwork::Mpesa => "MPESA",
            MobileNetwork::Airtel => "AIRTEL",
        }
    }
}

impl FromStr for MobileNetwork {
    type Err = FieldIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpesa" => Ok(MobileNetwork::Mpesa),
            "airtel" => Ok(MobileNetwork::Airtel),
            _ => Err(FieldIssue::Invalid(
                "Network must be either mpesa or airtel.",
            )),
        }
    }
}

/// Value of the `type` query parameter on the gateway charge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeType {
    Mpesa,
    Airtel,
    Card,
}

impl ChargeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeType::Mpesa => "mpesa",
            ChargeType::Airtel => "airtel",
            ChargeType::Card => "card",
        }
    }
}

impl From<MobileNetwork> for ChargeType {
    fn from(network: MobileNetwork) -> Self {
        match network {
            MobileNetwork::Mpesa => ChargeType::Mpesa,
            MobileNetwork::Airtel => ChargeType::Airtel,
        }
    }
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlation token sent to the gateway as `tx_ref`.
///
/// Built from the current time in milliseconds plus a random suffix so that
/// two submissions landing in the same millisecond stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionReference(String);

impl TransactionReference {
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::random();
        Self(format!("tx-{millis}-{suffix:08x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payer details echoed to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /api/pay`.
///
/// All fields are optional so that a missing field surfaces as a validation
/// error rather than a body rejection. `amount` may be a number or a numeric
/// string, as HTML number inputs submit strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobileMoneyForm {
    pub amount: Option<Value>,
    pub phone: Option<String>,
    pub network: Option<String>,
    pub email: Option<String>,
}

/// Body of `POST /api/card-pay`.
#[derive(Clone, Default, Deserialize)]
pub struct CardForm {
    pub amount: Option<Value>,
    pub number: Option<String>,
    pub cvv: Option<String>,
    pub expiry: Option<String>,
    pub email: Option<String>,
}

impl fmt::Debug for CardForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardForm")
            .field("amount", &self.amount)
            .field("expiry", &self.expiry)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/mpesa-pay`, sent by callers that already hold the
/// number in international form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectMpesaForm {
    pub amount: Option<Value>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MobileMoneyPayment {
    pub amount: Amount,
    /// International form, e.g. `254712345678`.
    pub phone: String,
    pub network: MobileNetwork,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardPayment {
    pub amount: Amount,
    /// Digits only.
    pub number: Sensitive,
    pub cvv: Sensitive,
    /// `MM/YY`
    pub expiry: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectMpesaPayment {
    pub amount: Amount,
    pub phone_number: String,
    pub email: Option<String>,
    pub customer: Customer,
}
