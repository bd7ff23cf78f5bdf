//! Adapters for the outside world: the card cipher and the HTTP gateway
//! client.

pub mod cipher;
pub mod flutterwave;
