use crate::Licensing;
use crate::error::LicenseError;
use crate::tab::UpgradeTabType;
use axum::extract::State;
use stratus_derive::{api_handler, api_model};
use stratus_domain::constants::{ADMIN_ROLE, CLOUD_TAG};
use stratus_kernel::server::error::ErrorBody;
use stratus_kernel::server::{ApiError, ApiResult, ApiState, ApiSuccess, Caller};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Upgrade call-to-action for the admin UI.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct UpgradeTabParams {
    #[cfg_attr(feature = "server", schema(inline))]
    pub tab_type: UpgradeTabType,
    /// Expiry of the active trial license, `YYYY-MM-DD` (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_end_date: Option<String>,
}

#[api_handler(
    get,
    path = "/api/v1/cloud.getUpgradeTabParams",
    responses(
        (status = OK, description = "Upgrade tab classification", body = UpgradeTabParams),
        (status = FORBIDDEN, description = "Caller is not an admin", body = ErrorBody),
    ),
    tag = CLOUD_TAG,
)]
pub(crate) async fn get_upgrade_tab_params(
    State(state): State<ApiState>,
    caller: Caller,
) -> ApiResult<UpgradeTabParams> {
    state.require_role(&caller, ADMIN_ROLE)?;

    let classification = state.try_get_slice::<Licensing>()?.evaluator.evaluate();
    Ok(ApiSuccess(UpgradeTabParams {
        tab_type: classification.tab_type,
        trial_end_date: classification.trial_end_date_string(),
    }))
}

/// Licensing routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(get_upgrade_tab_params))
}
