use crate::domain::gateway::{ChargePayload, Customizations, EncryptedField};
use crate::domain::payment::{
    CURRENCY, CardPayment, Customer, DirectMpesaPayment, MobileMoneyPayment, TransactionReference,
};

const DEFAULT_CUSTOMER_NAME: &str = "Customer";
const GATEWAY_LOGO: &str = "https://flutterwave.com/images/logo-colored.svg";

fn customizations(method: &str) -> Customizations {
    Customizations {
        title: format!("{method} Payment"),
        description: format!("Complete your payment using {method}"),
        logo: None,
    }
}

/// Builds the charge for `POST /api/pay`.
pub fn mobile_money_payload(
    payment: &MobileMoneyPayment,
    tx_ref: TransactionReference,
) -> ChargePayload {
    ChargePayload {
        tx_ref,
        amount: payment.amount.as_f64(),
        currency: CURRENCY,
        payment_type: None,
        redirect_url: None,
        email: Some(payment.email.clone()),
        phone_number: Some(payment.phone.clone()),
        card_number: None,
        cvv: None,
        expiry: None,
        encryption_key: None,
        customer: Customer {
            email: Some(payment.email.clone()),
            phone_number: Some(payment.phone.clone()),
            name: Some(DEFAULT_CUSTOMER_NAME.to_string()),
        },
        customizations: customizations(payment.network.label()),
    }
}

/// Builds the charge for `POST /api/mpesa-pay`.
pub fn direct_mpesa_payload(
    payment: &DirectMpesaPayment,
    tx_ref: TransactionReference,
) -> ChargePayload {
    ChargePayload {
        tx_ref,
        amount: payment.amount.as_f64(),
        currency: CURRENCY,
        payment_type: Some("mpesa"),
        redirect_url: None,
        email: payment.email.clone(),
        phone_number: Some(payment.phone_number.clone()),
        card_number: None,
        cvv: None,
        expiry: None,
        encryption_key: None,
        customer: payment.customer.clone(),
        customizations: Customizations {
            logo: Some(GATEWAY_LOGO.to_string()),
            ..customizations("M-Pesa")
        },
    }
}

/// Builds the charge for `POST /api/card-pay`. The card number travels only
/// as ciphertext; its IV goes in `encryption_key`.
pub fn card_payload(
    payment: &CardPayment,
    card_number: EncryptedField,
    tx_ref: TransactionReference,
) -> ChargePayload {
    ChargePayload {
        tx_ref,
        amount: payment.amount.as_f64(),
        currency: CURRENCY,
        payment_type: Some("card"),
        redirect_url: Some(String::new()),
        email: Some(payment.email.clone()),
        phone_number: None,
        card_number: Some(card_number.ciphertext),
        cvv: Some(payment.cvv.clone()),
        expiry: Some(payment.expiry.clone()),
        encryption_key: Some(card_number.iv),
        customer: Customer {
            email: Some(payment.email.clone()),
            phone_number: None,
            name: Some(DEFAULT_CUSTOMER_NAME.to_string()),
        },
        customizations: customizations("CARD"),
    }
}
