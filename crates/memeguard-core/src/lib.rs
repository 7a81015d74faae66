//! memeguard Core
//!
//! Types and error handling shared across memeguard components.
//!
//! This crate provides:
//! - The error taxonomy and result alias used by every crate
//! - The binary moderation label and its decision threshold
//! - Request and response bodies of the prediction endpoint

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ErrorResponse, Label, PredictRequest, PredictionResponse, OFFENSIVE_THRESHOLD};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Label, PredictRequest, PredictionResponse};
}
