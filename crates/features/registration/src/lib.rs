//! Cloud registration feature slice.
//!
//! Registers this workspace with the cloud identity service, either through the device-code
//! handshake (`create_intent` then `poll_confirmation`) or from a manual registration blob.
//! Both paths converge on [`RegistrationStore::persist_registration`], which writes the whole
//! registration in one settings batch under a single lock.
//!
//! With the `server` feature the slice also exposes its Axum routes via [`router`].

mod cloud;
mod error;
mod flow;
mod model;
#[cfg(feature = "server")]
mod server;
mod store;

pub use crate::cloud::{CloudIdentityService, HttpCloudIdentity};
pub use crate::error::{RegistrationError, RegistrationErrorExt};
pub use crate::flow::{RegistrationFlow, WorkspaceIdentity, decode_blob};
pub use crate::model::{
    ConfirmationPollResult, IntentData, IntentRequest, RegistrationPayload, RegistrationStatus,
};
#[cfg(feature = "server")]
pub use crate::server::{
    ALREADY_REGISTERED, ConfirmationPollQuery, CreateIntentRequest, INVALID_BLOB,
    INVALID_BLOB_TYPE, INVALID_QUERY, IntentResponse, ManualRegisterRequest, PollData,
    PollResponse, RegistrationStatusResponse, router,
};
pub use crate::store::{PersistOutcome, RegistrationStore};

use std::sync::Arc;
use stratus_domain::config::ApiConfig;
use stratus_kernel::domain::registry::InitializedSlice;

/// Registration feature state
#[stratus_derive::stratus_slice]
pub struct Registration {
    pub flow: RegistrationFlow,
}

/// Initialize the registration feature.
///
/// # Errors
/// [`RegistrationError::Internal`] if no cloud URL is configured.
pub fn init(
    config: &ApiConfig,
    store: RegistrationStore,
    cloud: Arc<dyn CloudIdentityService>,
) -> Result<InitializedSlice, RegistrationError> {
    if config.cloud.url.trim().is_empty() {
        return Err(RegistrationError::Internal {
            message: "cloud.url is empty".into(),
            context: Some("Registration slice configuration".into()),
        });
    }

    let flow = RegistrationFlow::new(store, cloud, WorkspaceIdentity::from(&config.cloud));
    tracing::info!(registered = flow.status().workspace_registered, "Registration slice initialized");

    Ok(InitializedSlice::new(Registration::new(RegistrationInner { flow })))
}
