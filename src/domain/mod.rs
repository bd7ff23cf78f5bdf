//! Checkout domain: field formatting and validation, payment types, and the
//! gateway port.

pub mod format;
pub mod gateway;
pub mod payment;
pub mod ports;
pub mod validation;
