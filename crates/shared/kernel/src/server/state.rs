use super::error::ApiError;
use super::extract::Caller;
use crate::security::{AccessControl, StaticAccessControl};
use axum::extract::FromRef;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use stratus_domain::config::ApiConfig;
use stratus_domain::registry::{FeatureSlice, InitializedSlice};
use stratus_settings::SettingsStore;
use tracing::warn;

#[stratus_derive::stratus_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<ApiStateError> for ApiError {
    fn from(err: ApiStateError) -> Self {
        Self::internal(err.to_string())
    }
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub settings: SettingsStore,
    pub access: Arc<dyn AccessControl>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast_ref::<T>)
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Names of the registered slices (for diagnostics).
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(|slice| slice.name)
    }

    /// Rejects the request unless `caller` holds `permission`.
    ///
    /// # Errors
    /// [`ApiError::Unauthorized`] without detail.
    pub fn require_permission(&self, caller: &Caller, permission: &str) -> Result<(), ApiError> {
        if self.access.has_permission(caller.user_id(), permission) {
            return Ok(());
        }
        warn!(user_id = caller.user_id(), permission, "Permission denied");
        Err(ApiError::Unauthorized)
    }

    /// Rejects the request unless `caller` holds `role`.
    ///
    /// # Errors
    /// [`ApiError::Unauthorized`] without detail.
    pub fn require_role(&self, caller: &Caller, role: &str) -> Result<(), ApiError> {
        if self.access.has_role(caller.user_id(), role) {
            return Ok(());
        }
        warn!(user_id = caller.user_id(), role, "Role required");
        Err(ApiError::Unauthorized)
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for SettingsStore {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.settings.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    settings: Option<SettingsStore>,
    access: Option<Arc<dyn AccessControl>>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: SettingsStore) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Overrides the grants derived from `config.security`.
    #[must_use]
    pub fn access(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = Some(access);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id, slice);
        }
        self
    }

    /// # Errors
    /// [`ApiStateError::Validation`] when the config or the settings store is missing.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let settings = self.settings.ok_or_else(|| ApiStateError::Validation {
            message: "SettingsStore not provided".into(),
            context: None,
        })?;
        let access = self
            .access
            .unwrap_or_else(|| Arc::new(StaticAccessControl::from_config(&config.security)));

        Ok(ApiState {
            inner: Arc::new(ApiStateInner { config, settings, access, slices: self.slices }),
        })
    }
}
