//! Field rules for checkout submissions.
//!
//! This is the only place the format rules live. Form validation is
//! exhaustive: every field is checked and every failure is collected into a
//! [`ValidationErrors`] set before anything is reported.

use crate::domain::format::format_phone_international;
use crate::domain::payment::{
    Amount, CardForm, CardPayment, Customer, DirectMpesaForm, DirectMpesaPayment,
    MobileMoneyForm, MobileMoneyPayment, MobileNetwork, Sensitive,
};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static LOCAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|0)[17][0-9]{8}$").expect("phone pattern"));
static INTERNATIONAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^254[17][0-9]{8}$").expect("international phone pattern"));
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("card pattern"));
static EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})$").expect("expiry pattern"));
static CVV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvv pattern"));
static TRANSACTION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("transaction id pattern"));

const INVALID_AMOUNT: &str = "Please enter a valid amount.";
const INVALID_EMAIL: &str = "Invalid email address.";
const INVALID_PHONE: &str = "Invalid phone number format.";
const INVALID_CARD_NUMBER: &str = "Invalid card number.";
const INVALID_EXPIRY: &str = "Invalid expiry date.";
const INVALID_CVV: &str = "Invalid CVV.";
const INVALID_TRANSACTION_ID: &str = "Invalid transaction id.";

/// Submission fields, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    Email,
    Phone,
    PhoneNumber,
    Network,
    Number,
    Expiry,
    Cvv,
    TransactionId,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::PhoneNumber => "phone_number",
            Field::Network => "network",
            Field::Number => "number",
            Field::Expiry => "expiry",
            Field::Cvv => "cvv",
            Field::TransactionId => "transaction_id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    Missing,
    Invalid(&'static str),
}

/// Field-level failures of one validation pass.
///
/// Failures are remembered in the order they were found, so the summary
/// names the first field the form checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: BTreeMap<Field, FieldIssue>,
    order: Vec<Field>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, issue: FieldIssue) {
        if self.issues.insert(field, issue).is_none() {
            self.order.push(field);
        }
    }

    /// Drops the failure recorded for `field`, e.g. once the user edits it.
    pub fn clear(&mut self, field: Field) {
        self.issues.remove(&field);
        self.order.retain(|f| *f != field);
    }

    pub fn get(&self, field: Field) -> Option<&FieldIssue> {
        self.issues.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Message for a single field, e.g. `"email is required."`.
    pub fn message(&self, field: Field) -> Option<String> {
        self.issues.get(&field).map(|issue| match issue {
            FieldIssue::Missing => format!("{field} is required."),
            FieldIssue::Invalid(reason) => (*reason).to_string(),
        })
    }

    /// One-line summary for the response `message`: the first failure
    /// found, or the missing-fields notice when anything is absent.
    pub fn summary(&self) -> String {
        if self.issues.values().any(|i| *i == FieldIssue::Missing) {
            return "Missing required fields.".to_string();
        }
        self.order
            .first()
            .and_then(|field| self.message(*field))
            .unwrap_or_else(|| "Invalid request.".to_string())
    }

    /// Records the failure of `result` under `field`, passing a success
    /// through.
    fn check<T>(&mut self, field: Field, result: Result<T, FieldIssue>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(issue) => {
                self.insert(field, issue);
                None
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(
            self.issues
                .keys()
                .filter_map(|field| self.message(*field).map(|msg| (field.as_str(), msg))),
        )
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Kenyan mobile number in local (`07…`, `01…`) or `+254` form.
pub fn is_valid_phone(phone: &str) -> bool {
    LOCAL_PHONE.is_match(phone)
}

/// Kenyan mobile number already in gateway form (`2547…`, `2541…`).
pub fn is_valid_international_phone(phone: &str) -> bool {
    INTERNATIONAL_PHONE.is_match(phone)
}

pub fn is_valid_card_number(number: &str) -> bool {
    let compact: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    CARD_NUMBER.is_match(&compact)
}

/// Checks an `MM/YY` expiry against the month containing `today`.
///
/// Years are compared in two-digit form, so a card expiring in the current
/// month is still accepted.
pub fn is_valid_expiry(expiry: &str, today: NaiveDate) -> bool {
    let Some(caps) = EXPIRY.captures(expiry) else {
        return false;
    };
    let (Ok(month), Ok(year)) = (caps[1].parse::<u32>(), caps[2].parse::<i32>()) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    let current_year = today.year() % 100;
    let current_month = today.month();
    year > current_year || (year == current_year && month >= current_month)
}

pub fn is_valid_cvv(cvv: &str) -> bool {
    CVV.is_match(cvv)
}

pub fn is_valid_transaction_id(id: &str) -> bool {
    TRANSACTION_ID.is_match(id)
}

/// Parses a submitted amount, accepting JSON numbers and numeric strings.
pub fn validate_amount(raw: Option<&Value>) -> Result<Amount, FieldIssue> {
    let value = match raw {
        None | Some(Value::Null) => return Err(FieldIssue::Missing),
        Some(Value::String(s)) if s.trim().is_empty() => return Err(FieldIssue::Missing),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(_) => None,
    };
    Amount::new(value.ok_or(FieldIssue::Invalid(INVALID_AMOUNT))?)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    // Exact parsing: rounding could lift a sub-minimum amount over the bar.
    Decimal::from_str_exact(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn required<'a>(value: Option<&'a str>) -> Result<&'a str, FieldIssue> {
    value.filter(|v| !v.is_empty()).ok_or(FieldIssue::Missing)
}

fn matching<'a>(
    value: Option<&'a str>,
    is_valid: impl Fn(&str) -> bool,
    reason: &'static str,
) -> Result<&'a str, FieldIssue> {
    let value = required(value)?;
    if is_valid(value) {
        Ok(value)
    } else {
        Err(FieldIssue::Invalid(reason))
    }
}

pub fn validate_mobile_money(
    form: &MobileMoneyForm,
) -> Result<MobileMoneyPayment, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let phone = errors.check(
        Field::Phone,
        matching(form.phone.as_deref(), is_valid_phone, INVALID_PHONE),
    );
    let email = errors.check(
        Field::Email,
        matching(form.email.as_deref(), is_valid_email, INVALID_EMAIL),
    );
    let amount = errors.check(Field::Amount, validate_amount(form.amount.as_ref()));
    let network = errors.check(
        Field::Network,
        required(form.network.as_deref()).and_then(|n| n.parse::<MobileNetwork>()),
    );

    match (amount, email, phone, network) {
        (Some(amount), Some(email), Some(phone), Some(network)) => Ok(MobileMoneyPayment {
            amount,
            phone: format_phone_international(phone),
            network,
            email: email.to_string(),
        }),
        _ => Err(errors),
    }
}

pub fn validate_card(form: &CardForm, today: NaiveDate) -> Result<CardPayment, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let number = errors.check(
        Field::Number,
        matching(
            form.number.as_deref(),
            is_valid_card_number,
            INVALID_CARD_NUMBER,
        ),
    );
    let expiry = errors.check(
        Field::Expiry,
        matching(
            form.expiry.as_deref(),
            |e| is_valid_expiry(e, today),
            INVALID_EXPIRY,
        ),
    );
    let cvv = errors.check(
        Field::Cvv,
        matching(form.cvv.as_deref(), is_valid_cvv, INVALID_CVV),
    );
    let email = errors.check(
        Field::Email,
        matching(form.email.as_deref(), is_valid_email, INVALID_EMAIL),
    );
    let amount = errors.check(Field::Amount, validate_amount(form.amount.as_ref()));

    match (amount, email, number, expiry, cvv) {
        (Some(amount), Some(email), Some(number), Some(expiry), Some(cvv)) => Ok(CardPayment {
            amount,
            number: Sensitive::new(number.chars().filter(|c| !c.is_whitespace()).collect::<String>()),
            cvv: Sensitive::new(cvv),
            expiry: expiry.to_string(),
            email: email.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Validates a direct M-Pesa submission.
///
/// The phone number may arrive in local or international form; the email is
/// optional but must be well formed when present.
pub fn validate_direct_mpesa(
    form: &DirectMpesaForm,
) -> Result<DirectMpesaPayment, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let phone_number = errors.check(
        Field::PhoneNumber,
        matching(
            form.phone_number.as_deref(),
            |p| is_valid_international_phone(p) || is_valid_phone(p),
            INVALID_PHONE,
        ),
    );
    let email = match form.email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) if !is_valid_email(email) => {
            errors.insert(Field::Email, FieldIssue::Invalid(INVALID_EMAIL));
            None
        }
        email => email.map(str::to_string),
    };
    let amount = errors.check(Field::Amount, validate_amount(form.amount.as_ref()));

    match (amount, phone_number) {
        (Some(amount), Some(phone_number)) if errors.is_empty() => {
            let phone_number = format_phone_international(phone_number);
            let supplied = form.customer.clone().unwrap_or_default();
            let customer = Customer {
                email: supplied.email.or_else(|| email.clone()),
                phone_number: supplied.phone_number.or_else(|| Some(phone_number.clone())),
                name: supplied.name.or_else(|| Some("Customer".to_string())),
            };
            Ok(DirectMpesaPayment {
                amount,
                phone_number,
                email,
                customer,
            })
        }
        _ => Err(errors),
    }
}

/// Checks a gateway transaction id before it is placed in a URL path.
pub fn validate_transaction_id(id: &str) -> Result<&str, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match errors.check(
        Field::TransactionId,
        matching(Some(id), is_valid_transaction_id, INVALID_TRANSACTION_ID),
    ) {
        Some(id) => Ok(id),
        None => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_amount_boundaries() {
        assert!(validate_amount(Some(&json!(1))).is_ok());
        assert!(validate_amount(Some(&json!("1"))).is_ok());
        assert!(validate_amount(Some(&json!(100.5))).is_ok());
        assert_eq!(
            validate_amount(Some(&json!(0))),
            Err(FieldIssue::Invalid("Amount must be at least 1 KES."))
        );
        assert!(matches!(
            validate_amount(Some(&json!(-10))),
            Err(FieldIssue::Invalid(_))
        ));
        assert_eq!(
            validate_amount(Some(&json!("ten"))),
            Err(FieldIssue::Invalid(INVALID_AMOUNT))
        );
        assert_eq!(
            validate_amount(Some(&json!(true))),
            Err(FieldIssue::Invalid(INVALID_AMOUNT))
        );
        assert_eq!(
            validate_amount(Some(&json!("0.99999999999999999999999999999"))),
            Err(FieldIssue::Invalid(INVALID_AMOUNT))
        );
        assert!(validate_amount(Some(&json!("1e3"))).is_ok());
        assert_eq!(validate_amount(None), Err(FieldIssue::Missing));
        assert_eq!(validate_amount(Some(&json!(""))), Err(FieldIssue::Missing));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("jane.doe@mail.example.co.ke"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn test_phone_pattern() {
        assert!(is_valid_phone("0712345678"));
        assert!(is_valid_phone("0112345678"));
        assert!(is_valid_phone("+254712345678"));
        assert!(!is_valid_phone("254712345678"));
        assert!(!is_valid_phone("0812345678"));
        assert!(!is_valid_phone("071234567"));
        assert!(is_valid_international_phone("254712345678"));
        assert!(!is_valid_international_phone("0712345678"));
    }

    #[test]
    fn test_local_phone_formats_to_international() {
        for prefix in ["07", "01"] {
            for tail in ["00000000", "12345678", "99999999"] {
                let local = format!("{prefix}{tail}");
                assert!(is_valid_phone(&local));
                let formatted = format_phone_international(&local);
                assert!(formatted.starts_with("254"));
                assert_eq!(formatted.len(), 12);
            }
        }
    }

    #[test]
    fn test_card_number_ignores_spaces() {
        assert!(is_valid_card_number("4111111111111111"));
        assert!(is_valid_card_number("4111 1111 1111 1111"));
        assert!(!is_valid_card_number("4111 1111 1111 111"));
        assert!(!is_valid_card_number("4111-1111-1111-1111"));
    }

    #[test]
    fn test_expiry_boundaries() {
        let today = date(2026, 10, 19);
        assert!(is_valid_expiry("10/26", today));
        assert!(is_valid_expiry("11/26", today));
        assert!(is_valid_expiry("01/27", today));
        assert!(!is_valid_expiry("09/26", today));
        assert!(!is_valid_expiry("12/25", today));
        assert!(!is_valid_expiry("13/27", today));
        assert!(!is_valid_expiry("00/27", today));
        assert!(!is_valid_expiry("1/27", today));
        assert!(!is_valid_expiry("10/2027", today));
    }

    #[test]
    fn test_cvv_pattern() {
        assert!(is_valid_cvv("123"));
        assert!(is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12"));
        assert!(!is_valid_cvv("12a"));
    }

    #[test]
    fn test_mobile_money_collects_every_failure() {
        let form = MobileMoneyForm {
            amount: Some(json!(0)),
            phone: Some("12345".into()),
            network: Some("telkom".into()),
            email: None,
        };
        let errors = validate_mobile_money(&form).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::Email), Some(&FieldIssue::Missing));
        assert_eq!(errors.summary(), "Missing required fields.");
        assert_eq!(errors.message(Field::Phone).unwrap(), INVALID_PHONE);
    }

    #[test]
    fn test_mobile_money_formats_phone() {
        let form = MobileMoneyForm {
            amount: Some(json!("100")),
            phone: Some("0712345678".into()),
            network: Some("mpesa".into()),
            email: Some("a@b.com".into()),
        };
        let payment = validate_mobile_money(&form).unwrap();
        assert_eq!(payment.phone, "254712345678");
        assert_eq!(payment.network, MobileNetwork::Mpesa);
    }

    #[test]
    fn test_card_validation_strips_number() {
        let form = CardForm {
            amount: Some(json!(50)),
            number: Some("4111 1111 1111 1111".into()),
            cvv: Some("123".into()),
            expiry: Some("12/30".into()),
            email: Some("a@b.com".into()),
        };
        let payment = validate_card(&form, date(2026, 10, 19)).unwrap();
        assert_eq!(payment.number.expose(), "4111111111111111");
        assert_eq!(payment.expiry, "12/30");
    }

    #[test]
    fn test_card_summary_uses_first_invalid_field() {
        let form = CardForm {
            amount: Some(json!(50)),
            number: Some("4111".into()),
            cvv: Some("1".into()),
            expiry: Some("12/30".into()),
            email: Some("a@b.com".into()),
        };
        let errors = validate_card(&form, date(2026, 10, 19)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.summary(), INVALID_CARD_NUMBER);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, json!({"number": INVALID_CARD_NUMBER, "cvv": INVALID_CVV}));
    }

    #[test]
    fn test_card_summary_follows_check_order() {
        let form = CardForm {
            amount: Some(json!(0)),
            number: Some("4111".into()),
            cvv: Some("123".into()),
            expiry: Some("12/30".into()),
            email: Some("a@b.com".into()),
        };
        let errors = validate_card(&form, date(2026, 10, 19)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.summary(), INVALID_CARD_NUMBER);
    }

    #[test]
    fn test_mobile_money_summary_reports_phone_before_amount() {
        let form = MobileMoneyForm {
            amount: Some(json!(0)),
            phone: Some("12345".into()),
            network: Some("mpesa".into()),
            email: Some("nope".into()),
        };
        let errors = validate_mobile_money(&form).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.summary(), INVALID_PHONE);
    }

    #[test]
    fn test_clearing_a_field() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Email, FieldIssue::Missing);
        errors.insert(Field::Cvv, FieldIssue::Invalid(INVALID_CVV));
        errors.insert(Field::Amount, FieldIssue::Invalid(INVALID_AMOUNT));
        errors.clear(Field::Email);
        errors.clear(Field::Amount);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.summary(), INVALID_CVV);
        errors.clear(Field::Cvv);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_direct_mpesa_defaults_customer() {
        let form = DirectMpesaForm {
            amount: Some(json!(10)),
            phone_number: Some("254712345678".into()),
            email: Some("a@b.com".into()),
            customer: None,
        };
        let payment = validate_direct_mpesa(&form).unwrap();
        assert_eq!(payment.phone_number, "254712345678");
        assert_eq!(payment.customer.email.as_deref(), Some("a@b.com"));
        assert_eq!(payment.customer.name.as_deref(), Some("Customer"));
    }

    #[test]
    fn test_direct_mpesa_rejects_bad_optional_email() {
        let form = DirectMpesaForm {
            amount: Some(json!(10)),
            phone_number: Some("0712345678".into()),
            email: Some("nope".into()),
            customer: None,
        };
        let errors = validate_direct_mpesa(&form).unwrap_err();
        assert_eq!(errors.summary(), INVALID_EMAIL);
    }

    #[test]
    fn test_transaction_id() {
        assert_eq!(validate_transaction_id("288200108"), Ok("288200108"));
        assert!(validate_transaction_id("../charges").is_err());
        assert!(validate_transaction_id("").is_err());
    }
}
