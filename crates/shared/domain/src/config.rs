use crate::constants::{ADMIN_ROLE, MANAGE_CLOUD, REGISTER_ON_CLOUD};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub cloud: CloudConfig,
    pub storage: StorageConfig,
    pub licensing: LicensingConfig,
    pub security: SecurityConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Remote cloud identity service and the workspace identity announced to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL; endpoints are resolved below `/api/v2/register/workspace`.
    pub url: String,
    pub timeout_seconds: u64,
    pub workspace_name: String,
    pub site_url: String,
}

/// Where the settings document lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LicensingConfig {
    /// JSON array of license records loaded at startup. No file means no licenses.
    pub licenses_file: Option<PathBuf>,
}

/// Static role and permission grants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// User id -> roles.
    pub users: HashMap<String, Vec<String>>,
    /// Role -> permissions.
    pub roles: HashMap<String, Vec<String>>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            url: "https://cloud.example.com".to_owned(),
            timeout_seconds: 30,
            workspace_name: "Stratus".to_owned(),
            site_url: "http://localhost:4583".to_owned(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data") }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let admin = vec![REGISTER_ON_CLOUD.to_owned(), MANAGE_CLOUD.to_owned()];
        Self { users: HashMap::new(), roles: HashMap::from([(ADMIN_ROLE.to_owned(), admin)]) }
    }
}
