use crate::cloud::CloudIdentityService;
use crate::error::RegistrationError;
use crate::model::{
    ConfirmationPollResult, IntentData, IntentRequest, RegistrationPayload, RegistrationStatus,
};
use crate::store::{PersistOutcome, RegistrationStore};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value;
use std::sync::Arc;
use stratus_domain::config::CloudConfig;
use tracing::{debug, info, instrument, warn};

/// Standard alphabet, padding optional: blobs are often pasted with trailing `=` trimmed.
const BLOB_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How this workspace introduces itself to the cloud.
#[derive(Debug, Clone)]
pub struct WorkspaceIdentity {
    pub name: String,
    pub site_url: String,
}

impl From<&CloudConfig> for WorkspaceIdentity {
    fn from(config: &CloudConfig) -> Self {
        Self { name: config.workspace_name.clone(), site_url: config.site_url.clone() }
    }
}

/// The device-code registration handshake.
///
/// `create_intent` asks the cloud for a device code, `poll_confirmation` checks whether the
/// user confirmed it, and `manual_register` accepts an offline registration blob. Both
/// registration paths persist through [`RegistrationStore::persist_registration`].
#[derive(Debug, Clone)]
pub struct RegistrationFlow {
    store: RegistrationStore,
    cloud: Arc<dyn CloudIdentityService>,
    workspace: WorkspaceIdentity,
}

impl RegistrationFlow {
    #[must_use]
    pub fn new(
        store: RegistrationStore,
        cloud: Arc<dyn CloudIdentityService>,
        workspace: WorkspaceIdentity,
    ) -> Self {
        Self { store, cloud, workspace }
    }

    #[must_use]
    pub const fn store(&self) -> &RegistrationStore {
        &self.store
    }

    #[must_use]
    pub fn status(&self) -> RegistrationStatus {
        self.store.status()
    }

    /// Requests a device code from the cloud. Nothing local changes except, on first use,
    /// the generated workspace id.
    ///
    /// # Errors
    /// * [`RegistrationError::InvalidQuery`] for an empty email.
    /// * [`RegistrationError::Remote`] / [`RegistrationError::Http`] when the cloud rejects
    ///   the request or cannot be reached.
    #[instrument(skip(self, email))]
    pub async fn create_intent(
        &self,
        resend: bool,
        email: &str,
    ) -> Result<IntentData, RegistrationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RegistrationError::InvalidQuery {
                message: "email is required".into(),
                context: None,
            });
        }

        let request = IntentRequest {
            email: email.to_owned(),
            workspace_name: self.workspace.name.clone(),
            site_url: self.workspace.site_url.clone(),
            unique_id: self.store.unique_id().await?,
            resend,
        };

        let intent = self.cloud.create_intent(&request).await.inspect_err(|err| {
            warn!(error = %err, "Registration intent failed");
        })?;

        info!(expires_in = intent.expires_in, "Registration intent created");
        Ok(intent)
    }

    /// Asks the cloud whether `device_code` has been confirmed.
    ///
    /// Each call is a fresh lookup. A successful result is persisted before it is returned, so
    /// any status read issued afterwards sees the workspace as registered. If the workspace
    /// was registered in the meantime the existing registration is kept.
    ///
    /// # Errors
    /// * [`RegistrationError::InvalidQuery`] for an empty device code.
    /// * [`RegistrationError::Remote`] / [`RegistrationError::Http`] for cloud failures.
    /// * [`RegistrationError::Settings`] if the confirmed registration cannot be stored.
    #[instrument(skip_all)]
    pub async fn poll_confirmation(
        &self,
        device_code: &str,
    ) -> Result<ConfirmationPollResult, RegistrationError> {
        if device_code.trim().is_empty() {
            return Err(RegistrationError::InvalidQuery {
                message: "deviceCode is required".into(),
                context: None,
            });
        }

        let result = self.cloud.poll(device_code).await.inspect_err(|err| {
            warn!(error = %err, "Confirmation poll failed");
        })?;

        match &result {
            ConfirmationPollResult::Successful { payload } => {
                if self.store.persist_registration(payload).await? == PersistOutcome::AlreadyRegistered
                {
                    info!("Confirmation received for an already registered workspace; keeping it");
                }
            },
            ConfirmationPollResult::Pending => debug!("Registration still pending"),
            ConfirmationPollResult::Invalid => debug!("Device code rejected by the cloud"),
        }

        Ok(result)
    }

    /// Registers the workspace from a base64-encoded JSON blob.
    ///
    /// # Errors
    /// * [`RegistrationError::AlreadyRegistered`] if a registration exists; nothing is written.
    /// * [`RegistrationError::Decode`] for anything but base64-encoded JSON object data;
    ///   nothing is written.
    /// * [`RegistrationError::Settings`] if the registration cannot be stored.
    #[instrument(skip_all)]
    pub async fn manual_register(&self, blob: &str) -> Result<(), RegistrationError> {
        if self.store.is_registered() {
            return Err(RegistrationError::AlreadyRegistered { context: None });
        }

        let payload = decode_blob(blob)?;

        match self.store.persist_registration(&payload).await? {
            PersistOutcome::Registered => Ok(()),
            PersistOutcome::AlreadyRegistered => Err(RegistrationError::AlreadyRegistered {
                context: Some("registered concurrently".into()),
            }),
        }
    }
}

/// Decodes a manual registration blob: base64 (whitespace tolerated) of a JSON object.
///
/// # Errors
/// [`RegistrationError::Decode`] describing the first layer that failed.
pub fn decode_blob(blob: &str) -> Result<RegistrationPayload, RegistrationError> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(RegistrationError::Decode { message: "blob is empty".into(), context: None });
    }

    let bytes = BLOB_ENGINE.decode(compact.as_bytes()).map_err(|e| RegistrationError::Decode {
        message: e.to_string().into(),
        context: Some("base64".into()),
    })?;

    let value: Value = serde_json::from_slice(&bytes).map_err(|e| RegistrationError::Decode {
        message: e.to_string().into(),
        context: Some("json".into()),
    })?;

    RegistrationPayload::try_from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
    use serde_json::json;

    #[test]
    fn decodes_padded_unpadded_and_wrapped_blobs() {
        let raw = json!({ "workspaceId": "ws-1", "client_id": "c" }).to_string();

        for blob in [
            STANDARD.encode(&raw),
            STANDARD_NO_PAD.encode(&raw),
            format!("  {}\n", STANDARD.encode(&raw)),
        ] {
            let payload = decode_blob(&blob).expect("decodes");
            assert_eq!(payload.get("workspaceId"), Some(&json!("ws-1")));
        }
    }

    #[test]
    fn rejects_each_malformed_layer() {
        let not_json = STANDARD.encode("not json");
        let not_object = STANDARD.encode("[1]");

        for blob in ["", "%%% not base64 %%%", not_json.as_str(), not_object.as_str()] {
            assert!(
                matches!(decode_blob(blob), Err(RegistrationError::Decode { .. })),
                "blob {blob:?} must be a decode error"
            );
        }
    }
}
