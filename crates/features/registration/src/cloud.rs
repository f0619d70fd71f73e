//! Client side of the cloud identity service.

use crate::error::{RegistrationError, RegistrationErrorExt};
use crate::model::{ConfirmationPollResult, IntentData, IntentRequest, RegistrationPayload};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;
use stratus_domain::config::CloudConfig;
use tracing::{debug, warn};

const INTENT_PATH: &str = "/api/v2/register/workspace/intent";
const POLL_PATH: &str = "/api/v2/register/workspace/poll";

/// The remote service that issues device codes and confirms registrations.
///
/// Implementations perform exactly one remote round trip per call and never retry.
#[async_trait]
pub trait CloudIdentityService: Debug + Send + Sync {
    /// Requests a new device code for `request.email`.
    async fn create_intent(&self, request: &IntentRequest) -> Result<IntentData, RegistrationError>;

    /// Looks up the confirmation state of `device_code`.
    async fn poll(&self, device_code: &str) -> Result<ConfirmationPollResult, RegistrationError>;
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    #[serde(default)]
    successful: bool,
    #[serde(default)]
    payload: Option<Value>,
}

/// [`CloudIdentityService`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpCloudIdentity {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCloudIdentity {
    /// # Errors
    /// [`RegistrationError::Http`] if the TLS backend cannot be initialized.
    pub fn new(config: &CloudConfig) -> Result<Self, RegistrationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("stratus/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Building cloud HTTP client")?;

        Ok(Self { client, base_url: config.url.trim_end_matches('/').to_owned() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl CloudIdentityService for HttpCloudIdentity {
    async fn create_intent(&self, request: &IntentRequest) -> Result<IntentData, RegistrationError> {
        let response = self
            .client
            .post(self.endpoint(INTENT_PATH))
            .query(&[("resend", request.resend)])
            .json(request)
            .send()
            .await
            .context("Sending registration intent")?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Cloud rejected registration intent");
            return Err(RegistrationError::Remote {
                message: format!("intent request returned {status}").into(),
                context: None,
            });
        }

        response.json::<IntentData>().await.context("Decoding intent data")
    }

    async fn poll(&self, device_code: &str) -> Result<ConfirmationPollResult, RegistrationError> {
        let response = self
            .client
            .get(self.endpoint(POLL_PATH))
            .query(&[("token", device_code)])
            .send()
            .await
            .context("Polling registration confirmation")?;

        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
            debug!(%status, "Device code is no longer known to the cloud");
            return Ok(ConfirmationPollResult::Invalid);
        }
        if !status.is_success() {
            warn!(%status, "Cloud rejected confirmation poll");
            return Err(RegistrationError::Remote {
                message: format!("poll request returned {status}").into(),
                context: None,
            });
        }

        let body = response.json::<PollResponse>().await.context("Decoding poll response")?;
        interpret_poll(body)
    }
}

fn interpret_poll(body: PollResponse) -> Result<ConfirmationPollResult, RegistrationError> {
    if !body.successful {
        return Ok(ConfirmationPollResult::Pending);
    }

    let payload = body.payload.ok_or_else(|| RegistrationError::Remote {
        message: "successful poll without a payload".into(),
        context: None,
    })?;

    let payload = RegistrationPayload::try_from(payload).map_err(|_| RegistrationError::Remote {
        message: "successful poll with a non-object payload".into(),
        context: None,
    })?;

    Ok(ConfirmationPollResult::Successful { payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<ConfirmationPollResult, RegistrationError> {
        interpret_poll(serde_json::from_value(body).expect("poll body"))
    }

    #[test]
    fn unsuccessful_poll_is_pending() {
        assert_eq!(parse(json!({ "successful": false })).ok(), Some(ConfirmationPollResult::Pending));
        assert_eq!(parse(json!({})).ok(), Some(ConfirmationPollResult::Pending));
    }

    #[test]
    fn successful_poll_carries_the_payload() {
        let result = parse(json!({ "successful": true, "payload": { "workspaceId": "ws-1" } }));
        match result {
            Ok(ConfirmationPollResult::Successful { payload }) => {
                assert_eq!(payload.get("workspaceId"), Some(&json!("ws-1")));
            },
            other => panic!("expected a successful poll, got {other:?}"),
        }
    }

    #[test]
    fn successful_poll_without_usable_payload_is_remote_failure() {
        assert!(matches!(
            parse(json!({ "successful": true })),
            Err(RegistrationError::Remote { .. })
        ));
        assert!(matches!(
            parse(json!({ "successful": true, "payload": "nope" })),
            Err(RegistrationError::Remote { .. })
        ));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = CloudConfig { url: "https://cloud.test/".to_owned(), ..CloudConfig::default() };
        let cloud = HttpCloudIdentity::new(&config).expect("client");
        assert_eq!(cloud.endpoint(POLL_PATH), "https://cloud.test/api/v2/register/workspace/poll");
    }
}
