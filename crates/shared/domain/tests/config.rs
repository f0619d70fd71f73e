use serde_json::json;
use stratus_domain::config::{ApiConfig, CloudConfig, SecurityConfig, ServerConfig};
use stratus_domain::constants::{ADMIN_ROLE, MANAGE_CLOUD, REGISTER_ON_CLOUD, settings};

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let cloud = CloudConfig::default();
    assert_eq!(cloud.url, "https://cloud.example.com");
    assert_eq!(cloud.timeout_seconds, 30);

    let security = SecurityConfig::default();
    assert!(security.users.is_empty());
    assert_eq!(
        security.roles.get(ADMIN_ROLE).map(Vec::as_slice),
        Some([REGISTER_ON_CLOUD.to_owned(), MANAGE_CLOUD.to_owned()].as_slice())
    );
}

#[test]
fn api_config_deserializes_partial_documents() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "cloud": { "url": "https://cloud.test", "workspace_name": "Acme" },
        "storage": { "data_dir": "/tmp/stratus" },
        "licensing": { "licenses_file": "/etc/stratus/licenses.json" },
        "security": { "users": { "alice": ["admin"] } }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.cloud.url, "https://cloud.test");
    assert_eq!(cfg.cloud.timeout_seconds, 30, "missing keys fall back to defaults");
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/tmp/stratus"));
    assert!(cfg.licensing.licenses_file.is_some());
    assert_eq!(cfg.security.users["alice"], vec!["admin".to_owned()]);
    assert!(cfg.security.roles.contains_key(ADMIN_ROLE), "missing roles keep the default grants");
}

#[test]
fn cloned_config_is_copy_on_write() {
    let base = ApiConfig::default();
    let mut tweaked = base.clone();
    tweaked.server.port = 9999;

    assert_eq!(base.server.port, 4583);
    assert_eq!(tweaked.server.port, 9999);
}

#[test]
fn payload_fields_target_workspace_settings() {
    assert_eq!(settings::PAYLOAD_FIELDS.len(), 8);
    assert!(settings::PAYLOAD_FIELDS.iter().all(|(_, key)| key.starts_with("Cloud_Workspace_")));
    assert!(settings::PAYLOAD_FIELDS.contains(&("workspaceId", settings::WORKSPACE_ID)));
}
