//! Axum building blocks shared by every slice's HTTP surface.

pub mod error;
pub mod extract;
mod health;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult, ApiSuccess};
pub use extract::Caller;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
