use crate::classify::{Classification, classify};
use crate::source::LicenseSource;
use crate::tab::{DefaultUpgradeTabPolicy, UpgradeTabPolicy};
use std::sync::Arc;
use stratus_domain::constants::settings;
use stratus_settings::SettingsStore;
use tracing::debug;

/// Feeds snapshots of the license store and workspace settings into [`classify`].
#[derive(Debug, Clone)]
pub struct UpgradeTabEvaluator {
    source: Arc<dyn LicenseSource>,
    settings: SettingsStore,
    policy: Arc<dyn UpgradeTabPolicy>,
}

impl UpgradeTabEvaluator {
    #[must_use]
    pub fn new(source: Arc<dyn LicenseSource>, settings: SettingsStore) -> Self {
        Self { source, settings, policy: Arc::new(DefaultUpgradeTabPolicy) }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn UpgradeTabPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn source(&self) -> &Arc<dyn LicenseSource> {
        &self.source
    }

    /// Classifies the workspace as it stands right now.
    #[must_use]
    pub fn evaluate(&self) -> Classification {
        let licenses = self.source.licenses();
        let registered = self.settings.get_bool(settings::REGISTER_SERVER);
        let had_expired_trials = self.settings.get_bool(settings::HAD_TRIAL);

        let classification = classify(&licenses, registered, had_expired_trials, self.policy.as_ref());
        debug!(
            tab_type = %classification.tab_type,
            licenses = licenses.len(),
            registered,
            had_expired_trials,
            "Upgrade tab classified"
        );
        classification
    }
}
