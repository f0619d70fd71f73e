use crate::error::{LicenseError, LicenseErrorExt};
use crate::record::LicenseRecord;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Supplies the current set of license records.
pub trait LicenseSource: Debug + Send + Sync {
    /// A point-in-time snapshot, in store order.
    fn licenses(&self) -> Arc<[LicenseRecord]>;
}

/// In-memory license store whose snapshot can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticLicenseSource {
    records: RwLock<Arc<[LicenseRecord]>>,
}

impl StaticLicenseSource {
    #[must_use]
    pub fn new(records: impl Into<Arc<[LicenseRecord]>>) -> Self {
        Self { records: RwLock::new(records.into()) }
    }

    /// Reads a JSON array of license records from `path`.
    ///
    /// # Errors
    /// * [`LicenseError::Io`] if the file cannot be read.
    /// * [`LicenseError::Parse`] if it is not an array of license records.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LicenseError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .context(format!("Reading license file {}", path.display()))?;
        let records: Vec<LicenseRecord> = serde_json::from_slice(&bytes)
            .context(format!("Parsing license file {}", path.display()))?;

        info!(path = %path.display(), count = records.len(), "License records loaded");
        Ok(Self::new(records))
    }

    /// Replaces the whole snapshot. Readers holding the previous snapshot keep it.
    pub fn replace(&self, records: impl Into<Arc<[LicenseRecord]>>) {
        *self.records.write() = records.into();
    }
}

impl LicenseSource for StaticLicenseSource {
    fn licenses(&self) -> Arc<[LicenseRecord]> {
        Arc::clone(&self.records.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_leaves_earlier_snapshots_alone() {
        let expiry = "2026-01-01T00:00:00Z".parse().unwrap();
        let source = StaticLicenseSource::new(vec![LicenseRecord::new(true, expiry)]);

        let before = source.licenses();
        source.replace(Vec::<LicenseRecord>::new());

        assert_eq!(before.len(), 1);
        assert!(source.licenses().is_empty());
    }
}
