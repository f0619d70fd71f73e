//! Facade crate for `Stratus` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `stratus` with the desired feature flags (`server`).
//! - Call [`init`] to register feature slices; with `server`, mount [`server::router::feature_router`].

use std::sync::Arc;
pub use stratus_domain as domain;
use stratus_domain::config::ApiConfig;
use stratus_domain::registry::InitializedSlice;
pub use stratus_kernel as kernel;
pub use stratus_settings as settings;
use stratus_settings::SettingsStore;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use stratus_kernel::server::router::system_router;
        use stratus_kernel::server::ApiState;
        use utoipa_axum::router::OpenApiRouter;

        /// Routes of every enabled feature slice.
        pub fn feature_router() -> OpenApiRouter<ApiState> {
            OpenApiRouter::new()
                .merge(crate::features::registration::router())
                .merge(crate::features::licensing::router())
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use stratus_licensing as licensing;
    pub use stratus_registration as registration;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        "registration",
        "licensing",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// External collaborators the feature slices are wired to.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub settings: SettingsStore,
    pub cloud: Arc<dyn features::registration::CloudIdentityService>,
    pub licenses: Arc<dyn features::licensing::LicenseSource>,
}

/// Initialize all enabled features.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    collaborators: Collaborators,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let Collaborators { settings, cloud, licenses } = collaborators;
    let mut slices = Vec::new();

    // Cloud registration
    let store = features::registration::RegistrationStore::new(settings.clone());
    slices.push(features::registration::init(config, store, cloud)?);

    // Licensing
    slices.push(features::licensing::init(settings, licenses));

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use features::licensing::StaticLicenseSource;
    use features::registration::HttpCloudIdentity;

    fn collaborators(config: &ApiConfig) -> Collaborators {
        Collaborators {
            settings: SettingsStore::in_memory(),
            cloud: Arc::new(HttpCloudIdentity::new(&config.cloud).unwrap()),
            licenses: Arc::new(StaticLicenseSource::default()),
        }
    }

    #[test]
    fn registers_every_slice() {
        let config = ApiConfig::default();
        let slices = init(&config, collaborators(&config)).unwrap();

        assert!(slices.iter().any(|s| s.downcast_ref::<features::registration::Registration>().is_some()));
        assert!(slices.iter().any(|s| s.downcast_ref::<features::licensing::Licensing>().is_some()));
    }

    #[test]
    fn empty_cloud_url_fails_init() {
        let mut config = ApiConfig::default();
        let collaborators = collaborators(&config);
        config.cloud.url = String::new();

        assert!(init(&config, collaborators).is_err());
    }
}
