//! Application layer orchestrating a checkout submission.
//!
//! `CheckoutService` is the entry point: it validates a form, builds the
//! gateway payload and makes exactly one gateway call through the
//! `ChargeGateway` port.

pub mod checkout;
pub mod payload;
