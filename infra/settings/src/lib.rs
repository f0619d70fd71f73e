//! Workspace settings store.
//!
//! Settings are a flat map of keys to JSON values kept in memory and mirrored to a single
//! `settings.json` document.
//!
//! - **All-or-nothing batches**: [`SettingsStore::update`] rewrites the whole document using
//!   an atomic swap (unique temp write + `fsync` + `rename`). Readers only observe a batch
//!   once it is on disk.
//! - **Serialized writers**: batches are applied one at a time; readers never block on I/O.
//! - **Self-healing**: orphaned temp files from an interrupted write are removed on open.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use stratus_settings::{SettingsBatch, SettingsError, SettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SettingsError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let store = SettingsStore::open(tmp.path()).await?;
//!
//!     store
//!         .update(SettingsBatch::new().set("Register_Server", true).set("uniqueID", "ws-1"))
//!         .await?;
//!
//!     assert!(store.get_bool("Register_Server"));
//!     assert_eq!(store.get("uniqueID"), Some(json!("ws-1")));
//!     Ok(())
//! }
//! ```

mod error;
mod store;

pub use crate::error::{SettingsError, SettingsErrorExt};
pub use crate::store::{SETTINGS_FILE, SettingsBatch, SettingsStore};
pub use serde_json::{Map, Value};
