use crate::error::RegistrationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stratus_derive::api_model;

/// Whether this workspace is registered with the cloud.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationStatus {
    pub workspace_registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// A trial already ran on this workspace.
    pub had_trial: bool,
}

/// The settings blob issued by the cloud on registration, persisted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema), schema(value_type = Object))]
#[serde(transparent)]
pub struct RegistrationPayload(Map<String, Value>);

impl RegistrationPayload {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RegistrationPayload {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for RegistrationPayload {
    type Error = RegistrationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(RegistrationError::Decode {
                message: "registration payload must be a JSON object".into(),
                context: None,
            }),
        }
    }
}

/// Device-code data issued by the cloud for a registration intent.
#[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct IntentData {
    /// Opaque code to poll with
    pub device_code: String,
    /// Code the user confirms on the cloud side
    pub user_code: String,
    pub verification_url: String,
    /// Suggested polling interval, in seconds
    pub interval: u64,
    /// Lifetime of the device code, in seconds
    pub expires_in: u64,
}

/// Outcome of a single confirmation poll.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationPollResult {
    /// The user has not confirmed yet.
    Pending,
    /// Confirmed; the payload has been persisted by the time the caller sees this.
    Successful { payload: RegistrationPayload },
    /// Device code unknown or expired.
    Invalid,
}

impl ConfirmationPollResult {
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        matches!(self, Self::Successful { .. })
    }
}

/// Workspace description sent with every intent.
#[api_model]
#[derive(Clone)]
pub struct IntentRequest {
    pub email: String,
    pub workspace_name: String,
    pub site_url: String,
    /// Stable workspace id, generated once per installation
    pub unique_id: String,
    pub resend: bool,
}
