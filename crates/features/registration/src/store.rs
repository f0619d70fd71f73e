use crate::error::{RegistrationError, RegistrationErrorExt};
use crate::model::{RegistrationPayload, RegistrationStatus};
use std::sync::Arc;
use stratus_domain::constants::settings;
use stratus_kernel::safe_nanoid;
use stratus_settings::{SettingsBatch, SettingsStore, Value};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Result of [`RegistrationStore::persist_registration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The payload was written and the workspace is now registered.
    Registered,
    /// Another registration won the race; nothing was written.
    AlreadyRegistered,
}

/// Registration state kept in the workspace settings.
///
/// Every write that depends on the current registration state goes through one lock, so the
/// "already registered" check and the write are a single step.
#[derive(Debug, Clone)]
pub struct RegistrationStore {
    settings: SettingsStore,
    write_lock: Arc<Mutex<()>>,
}

impl RegistrationStore {
    #[must_use]
    pub fn new(settings: SettingsStore) -> Self {
        Self { settings, write_lock: Arc::new(Mutex::new(())) }
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.settings.get_bool(settings::REGISTER_SERVER)
    }

    #[must_use]
    pub fn had_trial(&self) -> bool {
        self.settings.get_bool(settings::HAD_TRIAL)
    }

    #[must_use]
    pub fn status(&self) -> RegistrationStatus {
        RegistrationStatus {
            workspace_registered: self.is_registered(),
            workspace_id: self.settings.get_str(settings::WORKSPACE_ID),
            had_trial: self.had_trial(),
        }
    }

    /// Registration payload currently on record, if any.
    #[must_use]
    pub fn payload(&self) -> Option<RegistrationPayload> {
        match self.settings.get(settings::REGISTRATION_PAYLOAD) {
            Some(Value::Object(fields)) => Some(fields.into()),
            _ => None,
        }
    }

    /// Writes `payload` and marks the workspace registered, unless it already is.
    ///
    /// The whole registration lands in one settings batch: either every key is written or
    /// none is.
    ///
    /// # Errors
    /// [`RegistrationError::Settings`] if the batch cannot be persisted.
    pub async fn persist_registration(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<PersistOutcome, RegistrationError> {
        let _guard = self.write_lock.lock().await;

        if self.is_registered() {
            return Ok(PersistOutcome::AlreadyRegistered);
        }

        let batch = registration_batch(payload);
        if let Err(err) = self.settings.update(batch).await {
            error!(error = %err, "Failed to persist workspace registration");
            return Err(err).context("Persisting registration");
        }

        let workspace_id = payload.get("workspaceId").and_then(Value::as_str).unwrap_or_default();
        info!(workspace_id, "Workspace registered");
        Ok(PersistOutcome::Registered)
    }

    /// Returns the installation's stable id, generating and storing it on first use.
    ///
    /// # Errors
    /// [`RegistrationError::Settings`] if a freshly generated id cannot be persisted.
    pub async fn unique_id(&self) -> Result<String, RegistrationError> {
        if let Some(id) = self.settings.get_str(settings::UNIQUE_ID) {
            return Ok(id);
        }

        let _guard = self.write_lock.lock().await;
        if let Some(id) = self.settings.get_str(settings::UNIQUE_ID) {
            return Ok(id);
        }

        let id = safe_nanoid!(24);
        self.settings
            .set(settings::UNIQUE_ID, id.as_str())
            .await
            .context("Persisting workspace unique id")?;
        Ok(id)
    }
}

/// Settings written for a registration: the flag, the raw payload and its well-known fields.
fn registration_batch(payload: &RegistrationPayload) -> SettingsBatch {
    let mut batch = SettingsBatch::new()
        .set(settings::REGISTER_SERVER, true)
        .set(settings::REGISTRATION_PAYLOAD, payload.clone().into_value());

    for (field, key) in settings::PAYLOAD_FIELDS {
        if let Some(value) = payload.get(field) {
            batch.push(*key, value.clone());
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RegistrationPayload {
        RegistrationPayload::try_from(value).expect("object payload")
    }

    #[test]
    fn batch_maps_well_known_fields_only() {
        let batch = registration_batch(&payload(json!({
            "workspaceId": "ws-1",
            "client_id": "cid",
            "publicKey": "pk",
            "somethingElse": 1,
        })));

        let keys: Vec<_> = batch.keys().collect();
        assert_eq!(
            keys,
            [
                settings::REGISTER_SERVER,
                settings::REGISTRATION_PAYLOAD,
                settings::WORKSPACE_ID,
                settings::CLIENT_ID,
                settings::PUBLIC_KEY,
            ]
        );
    }

    #[tokio::test]
    async fn second_persist_reports_already_registered() {
        let store = RegistrationStore::new(SettingsStore::in_memory());
        let first = payload(json!({ "workspaceId": "ws-1" }));
        let second = payload(json!({ "workspaceId": "ws-2" }));

        assert_eq!(store.persist_registration(&first).await.ok(), Some(PersistOutcome::Registered));
        assert_eq!(
            store.persist_registration(&second).await.ok(),
            Some(PersistOutcome::AlreadyRegistered)
        );
        assert_eq!(store.payload(), Some(first));
        assert_eq!(store.status().workspace_id.as_deref(), Some("ws-1"));
    }

    #[tokio::test]
    async fn unique_id_is_generated_once() {
        let store = RegistrationStore::new(SettingsStore::in_memory());

        let first = store.unique_id().await.expect("generate");
        let second = store.unique_id().await.expect("reuse");
        assert_eq!(first, second);
        assert_eq!(first.len(), 24);
    }
}
