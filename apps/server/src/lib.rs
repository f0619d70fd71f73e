//! # Stratus Server
//!
//! Axum web server exposing workspace cloud registration and license evaluation.
//!
//! ## Example
//! ```no_run
//! use stratus_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stratus::Collaborators;
use stratus::domain::config::ApiConfig;
use stratus::features::licensing::{self, LicenseSource};
use stratus::features::registration::{CloudIdentityService, HttpCloudIdentity, RegistrationStore};
use stratus::kernel::server::ApiState;
use stratus::settings::SettingsStore;
use tokio::signal;
use tracing::{error, info};

/// How long in-flight requests may run after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    cloud: Option<Arc<dyn CloudIdentityService>>,
    licenses: Option<Arc<dyn LicenseSource>>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Directory holding the settings document.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.storage.data_dir = dir.into();
        self
    }

    /// Use `cloud` instead of the HTTP client built from `cloud.url`.
    pub fn cloud(mut self, cloud: Arc<dyn CloudIdentityService>) -> Self {
        self.cloud = Some(cloud);
        self
    }

    /// Use `licenses` instead of the store named by `licensing.licenses_file`.
    pub fn licenses(mut self, licenses: Arc<dyn LicenseSource>) -> Self {
        self.licenses = Some(licenses);
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    async fn collaborators(&mut self) -> Result<Collaborators> {
        let data_dir = &self.cfg.storage.data_dir;
        let settings = SettingsStore::open(data_dir)
            .await
            .with_context(|| format!("Failed to open settings in {}", data_dir.display()))?;
        RegistrationStore::new(settings.clone())
            .unique_id()
            .await
            .context("Failed to seed the workspace id")?;

        let cloud = match self.cloud.take() {
            Some(cloud) => cloud,
            None => Arc::new(
                HttpCloudIdentity::new(&self.cfg.cloud).context("Failed to build cloud client")?,
            ),
        };

        let licenses = match self.licenses.take() {
            Some(licenses) => licenses,
            None => Arc::new(
                licensing::load_source(&self.cfg).await.context("Failed to load license records")?,
            ),
        };

        Ok(Collaborators { settings, cloud, licenses })
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the SSL files, if HTTPS is configured
    /// 2. Opens the settings store in `storage.data_dir` and seeds the workspace id
    /// 3. Wires the cloud identity client and the license store
    /// 4. Initializes the feature slices and the application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * The settings document cannot be created or read
    /// * The license file is unreadable or malformed
    /// * A feature slice rejects the configuration
    pub async fn build(mut self) -> Result<Server> {
        // 1. Validate SSL Configuration
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, "Initializing server");

        // 2. Storage and external collaborators
        let collaborators = self.collaborators().await?;
        let settings = collaborators.settings.clone();

        // 3. Orchestrate Feature Slices
        let slices = stratus::init(&self.cfg, collaborators)
            .map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        // 4. Construct State using Functional Folding
        let state = slices
            .into_iter()
            .fold(ApiState::builder().config(self.cfg).settings(settings), |builder, slice| {
                builder.register_slice(slice)
            })
            .build()
            .context("Failed to finalize API state registry")?;

        info!(slices = ?state.slice_names().collect::<Vec<_>>(), "Feature slices registered");
        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router: system, registration and licensing routes plus the
    /// API reference at `/api`.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Serves HTTP, or HTTPS when `server.ssl` is set, until Ctrl+C or SIGTERM. In-flight
    /// requests get [`SHUTDOWN_GRACE`] to finish.
    ///
    /// # Errors
    /// Binding the listener, loading the TLS material or serving fails.
    pub async fn run(self) -> Result<()> {
        let server = self.state.config.server.clone();
        let address = SocketAddr::new(server.address, server.port);
        let app = self.router().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone()));

        match &server.ssl {
            Some(ssl) => {
                info!(%address, cert = %ssl.cert.display(), "Serving HTTPS");
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTPS server failed")?;
            },
            None => {
                info!(%address, "Serving HTTP");
                axum_server::bind(address)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTP server failed")?;
            },
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Waits for Ctrl+C or SIGTERM, then starts a graceful shutdown on `handle`.
async fn drain_on_signal(handle: Handle<SocketAddr>) {
    match shutdown_signal().await {
        Ok(signal) => {
            info!(signal, "Shutdown requested; draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        },
        Err(e) => error!(error = %e, "Cannot listen for shutdown signals"),
    }
}

async fn shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

        tokio::select! {
            res = signal::ctrl_c() => res.map(|()| "SIGINT").context("Failed to install Ctrl+C handler"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.context("Failed to install Ctrl+C handler")?;
        Ok("Ctrl+C")
    }
}
