use crate::error::RegistrationError;
use crate::flow::RegistrationFlow;
use crate::model::{ConfirmationPollResult, IntentData, RegistrationPayload, RegistrationStatus};
use crate::Registration;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use stratus_derive::{api_handler, api_model};
use stratus_domain::constants::{CLOUD_TAG, MANAGE_CLOUD, REGISTER_ON_CLOUD};
use stratus_kernel::server::error::ErrorBody;
use stratus_kernel::server::{ApiError, ApiResult, ApiState, ApiSuccess, Caller};
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const INVALID_QUERY: &str = "Invalid query";
pub const ALREADY_REGISTERED: &str = "Workspace is already registered";
pub const INVALID_BLOB: &str = "Invalid registration blob";
pub const INVALID_BLOB_TYPE: &str = "error-invalid-blob";

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::AlreadyRegistered { .. } => Self::failure(ALREADY_REGISTERED),
            RegistrationError::InvalidQuery { .. }
            | RegistrationError::Remote { .. }
            | RegistrationError::Http { .. } => {
                warn!(error = %err, "Registration request failed");
                Self::failure(INVALID_QUERY)
            },
            RegistrationError::Decode { .. } => {
                warn!(error = %err, "Rejected registration blob");
                Self::typed_failure(INVALID_BLOB, INVALID_BLOB_TYPE)
            },
            RegistrationError::Settings { .. } | RegistrationError::Internal { .. } => {
                Self::internal(err.to_string())
            },
        }
    }
}

#[api_model]
pub struct ManualRegisterRequest {
    /// Base64-encoded JSON registration payload
    pub cloud_blob: String,
}

#[api_model]
pub struct CreateIntentRequest {
    /// Ask the cloud to send the confirmation email again
    pub resend: bool,
    pub email: String,
}

#[api_model]
#[derive(utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfirmationPollQuery {
    /// Device code returned by `cloud.createRegistrationIntent`
    pub device_code: String,
}

#[api_model]
pub struct IntentResponse {
    pub intent_data: IntentData,
}

/// Poll state as reported by the cloud.
#[api_model]
pub struct PollData {
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<RegistrationPayload>,
}

#[api_model]
pub struct PollResponse {
    pub poll_data: PollData,
}

#[api_model]
pub struct RegistrationStatusResponse {
    pub registration_status: RegistrationStatus,
}

fn flow(state: &ApiState) -> Result<&RegistrationFlow, ApiError> {
    Ok(&state.try_get_slice::<Registration>()?.flow)
}

fn invalid_input(rejection: impl std::fmt::Display) -> ApiError {
    warn!(%rejection, "Malformed registration request");
    ApiError::failure(INVALID_QUERY)
}

#[api_handler(
    post,
    path = "/api/v1/cloud.manualRegister",
    request_body = ManualRegisterRequest,
    responses(
        (status = OK, description = "Workspace registered"),
        (status = BAD_REQUEST, description = "Already registered or malformed blob", body = ErrorBody),
        (status = FORBIDDEN, description = "Missing `register-on-cloud`", body = ErrorBody),
    ),
    tag = CLOUD_TAG,
)]
pub(crate) async fn manual_register(
    State(state): State<ApiState>,
    caller: Caller,
    body: Result<Json<ManualRegisterRequest>, JsonRejection>,
) -> ApiResult<()> {
    state.require_permission(&caller, REGISTER_ON_CLOUD)?;
    let Json(body) = body.map_err(invalid_input)?;

    flow(&state)?.manual_register(&body.cloud_blob).await?;
    Ok(ApiSuccess::ack())
}

#[api_handler(
    post,
    path = "/api/v1/cloud.createRegistrationIntent",
    request_body = CreateIntentRequest,
    responses(
        (status = OK, description = "Device code issued", body = IntentResponse),
        (status = BAD_REQUEST, description = "Invalid query", body = ErrorBody),
        (status = FORBIDDEN, description = "Missing `manage-cloud`", body = ErrorBody),
    ),
    tag = CLOUD_TAG,
)]
pub(crate) async fn create_registration_intent(
    State(state): State<ApiState>,
    caller: Caller,
    body: Result<Json<CreateIntentRequest>, JsonRejection>,
) -> ApiResult<IntentResponse> {
    state.require_permission(&caller, MANAGE_CLOUD)?;
    let Json(body) = body.map_err(invalid_input)?;

    let intent_data = flow(&state)?.create_intent(body.resend, &body.email).await?;
    Ok(ApiSuccess(IntentResponse { intent_data }))
}

#[api_handler(
    get,
    path = "/api/v1/cloud.confirmationPoll",
    params(ConfirmationPollQuery),
    responses(
        (status = OK, description = "Current confirmation state", body = PollResponse),
        (status = BAD_REQUEST, description = "Invalid query or unknown device code", body = ErrorBody),
        (status = FORBIDDEN, description = "Missing `manage-cloud`", body = ErrorBody),
    ),
    tag = CLOUD_TAG,
)]
pub(crate) async fn confirmation_poll(
    State(state): State<ApiState>,
    caller: Caller,
    query: Result<Query<ConfirmationPollQuery>, QueryRejection>,
) -> ApiResult<PollResponse> {
    state.require_permission(&caller, MANAGE_CLOUD)?;
    let Query(query) = query.map_err(invalid_input)?;

    let poll_data = match flow(&state)?.poll_confirmation(&query.device_code).await? {
        ConfirmationPollResult::Successful { payload } => {
            PollData { successful: true, payload: Some(payload) }
        },
        ConfirmationPollResult::Pending => PollData { successful: false, payload: None },
        ConfirmationPollResult::Invalid => return Err(ApiError::failure(INVALID_QUERY)),
    };

    Ok(ApiSuccess(PollResponse { poll_data }))
}

#[api_handler(
    get,
    path = "/api/v1/cloud.registrationStatus",
    responses(
        (status = OK, description = "Registration status", body = RegistrationStatusResponse),
        (status = FORBIDDEN, description = "Missing `manage-cloud`", body = ErrorBody),
    ),
    tag = CLOUD_TAG,
)]
pub(crate) async fn registration_status(
    State(state): State<ApiState>,
    caller: Caller,
) -> ApiResult<RegistrationStatusResponse> {
    state.require_permission(&caller, MANAGE_CLOUD)?;

    let registration_status = flow(&state)?.status();
    Ok(ApiSuccess(RegistrationStatusResponse { registration_status }))
}

/// Cloud registration routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(manual_register))
        .routes(routes!(create_registration_intent))
        .routes(routes!(confirmation_poll))
        .routes(routes!(registration_status))
}
