use std::path::PathBuf;
use stratus_domain::config::ApiConfig;
use stratus_licensing::{LicenseError, LicenseSource, StaticLicenseSource, load_source};

const LICENSES: &str = r#"[
    {
        "valid": true,
        "license": {
            "tag": { "name": "gold" },
            "meta": { "trial": true },
            "expiry": "2026-11-30T18:00:00Z"
        }
    },
    { "valid": false, "expiry": "2021-01-01T00:00:00Z" }
]"#;

fn config_with(path: Option<PathBuf>) -> ApiConfig {
    let mut config = ApiConfig::default();
    config.licensing.licenses_file = path;
    config
}

#[tokio::test]
async fn loads_records_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.json");
    std::fs::write(&path, LICENSES).unwrap();

    let source = load_source(&config_with(Some(path))).await.unwrap();
    let licenses = source.licenses();

    assert_eq!(licenses.len(), 2);
    assert!(licenses[0].valid && licenses[0].is_gold());
    assert_eq!(licenses[0].trial_flag(), Some(true));
    assert!(!licenses[1].valid);
}

#[tokio::test]
async fn no_configured_file_means_no_licenses() {
    let source = load_source(&config_with(None)).await.unwrap();
    assert!(source.licenses().is_empty());
}

#[tokio::test]
async fn unreadable_or_malformed_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = StaticLicenseSource::from_file(dir.path().join("absent.json")).await;
    assert!(matches!(missing, Err(LicenseError::Io { .. })));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{ "valid": true }"#).unwrap();
    let broken = StaticLicenseSource::from_file(&path).await;
    assert!(matches!(broken, Err(LicenseError::Parse { .. })));
}
