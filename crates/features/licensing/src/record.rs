use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag name carried by gold licenses.
pub const GOLD_TAG: &str = "gold";

/// A single license as reported by the license store.
///
/// Deserializes from the flat form
/// `{"valid": true, "tag": {"name": "gold"}, "meta": {"trial": false}, "expiry": "..."}`
/// and from the nested form `{"valid": true, "license": {"tag": .., "meta": .., "expiry": ..}}`.
/// Serializes to the flat form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordRepr", rename_all = "camelCase")]
pub struct LicenseRecord {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<LicenseTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<LicenseMeta>,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTag {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseMeta {
    /// `None` when the license says nothing about trials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<bool>,
}

impl LicenseRecord {
    #[must_use]
    pub const fn new(valid: bool, expiry: DateTime<Utc>) -> Self {
        Self { valid, tag: None, meta: None, expiry }
    }

    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tag = Some(LicenseTag { name: name.into() });
        self
    }

    #[must_use]
    pub const fn with_trial(mut self, trial: Option<bool>) -> Self {
        self.meta = Some(LicenseMeta { trial });
        self
    }

    /// The trial flag exactly as recorded: absent meta and absent flag are both `None`.
    #[must_use]
    pub fn trial_flag(&self) -> Option<bool> {
        self.meta.as_ref().and_then(|meta| meta.trial)
    }

    #[must_use]
    pub fn is_gold(&self) -> bool {
        self.tag.as_ref().is_some_and(|tag| tag.name == GOLD_TAG)
    }
}

#[derive(Deserialize)]
struct LicenseBody {
    #[serde(default)]
    tag: Option<LicenseTag>,
    #[serde(default)]
    meta: Option<LicenseMeta>,
    expiry: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordRepr {
    Nested { valid: bool, license: LicenseBody },
    Flat {
        valid: bool,
        #[serde(flatten)]
        license: LicenseBody,
    },
}

impl From<RecordRepr> for LicenseRecord {
    fn from(repr: RecordRepr) -> Self {
        let (RecordRepr::Nested { valid, license } | RecordRepr::Flat { valid, license }) = repr;
        Self { valid, tag: license.tag, meta: license.meta, expiry: license.expiry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_and_flat_forms_agree() {
        let nested: LicenseRecord = serde_json::from_value(json!({
            "valid": true,
            "license": {
                "tag": { "name": "gold" },
                "meta": { "trial": false },
                "expiry": "2025-01-01T00:00:00Z",
            },
        }))
        .unwrap();
        let flat: LicenseRecord = serde_json::from_value(json!({
            "valid": true,
            "tag": { "name": "gold" },
            "meta": { "trial": false },
            "expiry": "2025-01-01T00:00:00Z",
        }))
        .unwrap();

        assert_eq!(nested, flat);
        assert!(flat.is_gold());
        assert_eq!(flat.trial_flag(), Some(false));
    }

    #[test]
    fn missing_meta_and_flag_are_unknown() {
        let bare: LicenseRecord =
            serde_json::from_value(json!({ "valid": false, "expiry": "2030-06-15T12:00:00+02:00" }))
                .unwrap();
        let empty_meta: LicenseRecord = serde_json::from_value(json!({
            "valid": true,
            "meta": {},
            "expiry": "2030-06-15T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(bare.trial_flag(), None);
        assert_eq!(empty_meta.trial_flag(), None);
        assert_eq!(bare.expiry, empty_meta.expiry);
        assert!(!bare.is_gold());
    }

    #[test]
    fn serializes_flat() {
        let record = LicenseRecord::new(true, "2025-01-01T00:00:00Z".parse().unwrap())
            .with_tag("enterprise")
            .with_trial(Some(true));

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "valid": true,
                "tag": { "name": "enterprise" },
                "meta": { "trial": true },
                "expiry": "2025-01-01T00:00:00Z",
            })
        );
    }
}
