#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use stratus_registration::{
    CloudIdentityService, ConfirmationPollResult, IntentData, IntentRequest, RegistrationError,
    RegistrationPayload,
};

/// Scripted stand-in for the cloud identity service.
#[derive(Debug)]
pub struct FakeCloud {
    poll: Mutex<Option<ConfirmationPollResult>>,
    reject_intents: bool,
    pub intents: Mutex<Vec<IntentRequest>>,
    pub polls: AtomicUsize,
}

impl FakeCloud {
    /// Polls answer `result`; `None` makes every poll a remote failure.
    pub fn polling(result: Option<ConfirmationPollResult>) -> Self {
        Self {
            poll: Mutex::new(result),
            reject_intents: false,
            intents: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_intents() -> Self {
        Self { reject_intents: true, ..Self::polling(None) }
    }

    pub fn set_poll(&self, result: ConfirmationPollResult) {
        *self.poll.lock().unwrap() = Some(result);
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudIdentityService for FakeCloud {
    async fn create_intent(&self, request: &IntentRequest) -> Result<IntentData, RegistrationError> {
        self.intents.lock().unwrap().push(request.clone());
        if self.reject_intents {
            return Err(RegistrationError::Remote {
                message: "intent request returned 400 Bad Request".into(),
                context: None,
            });
        }

        Ok(IntentData {
            device_code: format!("device-{}", self.intents.lock().unwrap().len()),
            user_code: "ABCD-EFGH".to_owned(),
            verification_url: "https://cloud.test/verify".to_owned(),
            interval: 5,
            expires_in: 900,
        })
    }

    async fn poll(&self, _device_code: &str) -> Result<ConfirmationPollResult, RegistrationError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.poll.lock().unwrap().clone().ok_or_else(|| RegistrationError::Remote {
            message: "poll request returned 502 Bad Gateway".into(),
            context: None,
        })
    }
}

pub fn payload(workspace_id: &str) -> RegistrationPayload {
    RegistrationPayload::try_from(registration_json(workspace_id)).unwrap()
}

pub fn registration_json(workspace_id: &str) -> Value {
    json!({
        "workspaceId": workspace_id,
        "client_name": "Acme",
        "client_id": format!("client-{workspace_id}"),
        "client_secret": "s3cr3t",
        "publicKey": "-----BEGIN PUBLIC KEY-----",
        "licenseData": "license-blob",
    })
}

pub fn blob(workspace_id: &str) -> String {
    STANDARD.encode(registration_json(workspace_id).to_string())
}
