//! JSON-over-HTTP surface of the checkout service.

mod dto;
mod error;
mod handlers;
mod router;

pub use dto::*;
pub use error::ApiError;
pub use router::{AppState, Mode, create_router};
