//! Common imports for feature slices.

pub use crate::security::{AccessControl, StaticAccessControl};
pub use stratus_domain::registry::{FeatureSlice, InitializedSlice};

#[cfg(feature = "server")]
pub use crate::server::{
    error::{ApiError, ApiResult, ApiSuccess},
    extract::Caller,
    state::{ApiState, ApiStateError},
};
