//! # Licensing
//!
//! License records, the license store and the upgrade-tab classification engine.
//!
//! ## Architecture
//!
//! 1.  **Records ([`LicenseRecord`]):** what the license store reports for each license:
//!     validity, tag, trial flag and expiry.
//! 2.  **Store ([`LicenseSource`]):** supplies point-in-time snapshots of the records.
//!     [`StaticLicenseSource`] holds them in memory and can load a JSON file.
//! 3.  **Engine ([`classify`]):** a pure function from a snapshot, the registration flag and
//!     the trial history to a [`Classification`].
//! 4.  **Decision table ([`UpgradeTabPolicy`]):** maps the derived [`LicenseFacts`] to an
//!     [`UpgradeTabType`]. [`DefaultUpgradeTabPolicy`] is the stock table.
//!
//! With the `server` feature the slice serves `GET /api/v1/cloud.getUpgradeTabParams`.

mod classify;
mod error;
mod evaluator;
mod record;
#[cfg(feature = "server")]
mod server;
mod source;
mod tab;

pub use crate::classify::{Classification, classify, license_facts};
pub use crate::error::{LicenseError, LicenseErrorExt};
pub use crate::evaluator::UpgradeTabEvaluator;
pub use crate::record::{GOLD_TAG, LicenseMeta, LicenseRecord, LicenseTag};
#[cfg(feature = "server")]
pub use crate::server::{UpgradeTabParams, router};
pub use crate::source::{LicenseSource, StaticLicenseSource};
pub use crate::tab::{DefaultUpgradeTabPolicy, LicenseFacts, UpgradeTabPolicy, UpgradeTabType};

use std::sync::Arc;
use stratus_domain::config::ApiConfig;
use stratus_kernel::domain::registry::InitializedSlice;
use stratus_settings::SettingsStore;

/// Licensing feature state
#[stratus_derive::stratus_slice]
pub struct Licensing {
    pub evaluator: UpgradeTabEvaluator,
}

/// Builds the license store named by `licensing.licenses_file`, or an empty one.
///
/// # Errors
/// [`LicenseError::Io`] / [`LicenseError::Parse`] if the configured file cannot be loaded.
pub async fn load_source(config: &ApiConfig) -> Result<StaticLicenseSource, LicenseError> {
    match &config.licensing.licenses_file {
        Some(path) => StaticLicenseSource::from_file(path).await,
        None => {
            tracing::info!("No license file configured; starting with no licenses");
            Ok(StaticLicenseSource::default())
        },
    }
}

/// Initialize the licensing feature.
#[must_use]
pub fn init(settings: SettingsStore, source: Arc<dyn LicenseSource>) -> InitializedSlice {
    let evaluator = UpgradeTabEvaluator::new(source, settings);
    tracing::info!(licenses = evaluator.source().licenses().len(), "Licensing slice initialized");

    InitializedSlice::new(Licensing::new(LicensingInner { evaluator }))
}
