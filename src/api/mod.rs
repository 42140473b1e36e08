//! HTTP API module for the withholding engine.
//!
//! This module exposes `POST /calculate`, which computes one pay period's
//! source deductions against the dataset loaded at startup.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, CalculationResponse};
pub use state::AppState;
