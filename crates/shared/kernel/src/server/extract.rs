use super::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the caller's user id, set by the authenticating gateway in front of us.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: String,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|user_id| !user_id.is_empty())
            .map(Self::new)
            .ok_or(ApiError::Unauthenticated)
    }
}
