use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `STRATUS__CLOUD__URL`.
pub const ENV_PREFIX: &str = "STRATUS";
const DEFAULT_CONFIG: &str = "server";

#[stratus_derive::stratus_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration file layered with environment overrides.
///
/// 1. **Base file**: `path` (any format the `config` crate recognizes by extension). Without a
///    path, an optional `server.{toml,json,yaml}` in the working directory is used, so a
///    deployment can be configured from the environment alone.
/// 2. **Environment**: variables prefixed with `STRATUS__`, nested with `__`
///    (`STRATUS__SERVER__PORT=8080` maps to `server.port`).
///
/// # Errors
/// * An explicit `path` that does not exist.
/// * Values that do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use stratus_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
