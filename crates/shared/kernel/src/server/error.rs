//! The JSON envelope returned by every API route.
//!
//! Success: `{"success": true, ...fields}`.
//! Failure: `{"success": false, "error": "<message>", "errorType"?: "<code>"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use stratus_derive::api_model;
use tracing::error;

pub type ApiResult<T> = Result<ApiSuccess<T>, ApiError>;

pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
pub const UNAUTHENTICATED_MESSAGE: &str = "You must be logged in to do this.";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Failure body.
#[api_model]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No caller identity on the request.
    #[error("You must be logged in to do this.")]
    Unauthenticated,

    /// Caller lacks the permission or role; no detail is exposed.
    #[error("unauthorized")]
    Unauthorized,

    /// Business or input failure reported to the client as-is.
    #[error("{message}")]
    Failure { message: Cow<'static, str>, error_type: Option<Cow<'static, str>> },

    /// Anything the client cannot act on; the detail is logged, never returned.
    #[error("Internal server error: {message}")]
    Internal { message: Cow<'static, str> },
}

impl ApiError {
    pub fn failure(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Failure { message: message.into(), error_type: None }
    }

    pub fn typed_failure(
        message: impl Into<Cow<'static, str>>,
        error_type: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Failure { message: message.into(), error_type: Some(error_type.into()) }
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal { message: message.into() }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::Failure { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        let (message, error_type) = match self {
            Self::Unauthenticated => (UNAUTHENTICATED_MESSAGE.to_owned(), None),
            Self::Unauthorized => (UNAUTHORIZED_MESSAGE.to_owned(), None),
            Self::Failure { message, error_type } => {
                (message.into_owned(), error_type.map(Cow::into_owned))
            },
            Self::Internal { message } => {
                error!(%message, "Request failed with an internal error");
                (INTERNAL_MESSAGE.to_owned(), None)
            },
        };

        ErrorBody { success: false, error: message, error_type }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

/// Wraps a serializable payload in the success envelope.
///
/// The payload must serialize to an object (its fields are merged next to `success`) or to
/// `null`/unit (an empty acknowledgement).
#[derive(Debug)]
pub struct ApiSuccess<T>(pub T);

impl ApiSuccess<()> {
    #[must_use]
    pub const fn ack() -> Self {
        Self(())
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let mut body = match serde_json::to_value(self.0) {
            Ok(Value::Object(fields)) => fields,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                return ApiError::internal(format!("success payload is not an object: {other}"))
                    .into_response();
            },
            Err(err) => return ApiError::internal(err.to_string()).into_response(),
        };

        body.insert("success".to_owned(), Value::Bool(true));
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_of(response: Response) -> Value {
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn failures_use_the_error_envelope() {
        let response = ApiError::typed_failure("Invalid registration blob", "error-invalid-blob")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(response).await,
            json!({
                "success": false,
                "error": "Invalid registration blob",
                "errorType": "error-invalid-blob",
            })
        );
    }

    #[tokio::test]
    async fn unauthorized_leaks_no_detail() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_of(response).await, json!({ "success": false, "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn internal_detail_is_hidden() {
        let response = ApiError::internal("disk on fire").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["error"], "Internal server error");
    }

    #[tokio::test]
    async fn success_merges_payload_fields() {
        let response = ApiSuccess(json!({ "intentData": { "device_code": "d" } })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_of(response).await,
            json!({ "success": true, "intentData": { "device_code": "d" } })
        );

        assert_eq!(body_of(ApiSuccess::ack().into_response()).await, json!({ "success": true }));
    }
}
