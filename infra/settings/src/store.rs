use crate::error::{SettingsError, SettingsErrorExt};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// File name of the settings document inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

const TMP_MARKER: &str = ".stratustmp.";

/// An ordered set of key/value writes applied by [`SettingsStore::update`] as one unit.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct SettingsBatch {
    entries: Vec<(String, Value)>,
}

impl SettingsBatch {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Queues a write; later writes to the same key win.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
struct SettingsStoreInner {
    /// `None` for an in-memory store.
    path: Option<PathBuf>,
    values: RwLock<Map<String, Value>>,
    writer: Mutex<()>,
    tmp_counter: AtomicU64,
}

/// A cheaply clonable handle to the workspace settings.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<SettingsStoreInner>,
}

impl SettingsStore {
    /// Opens (or creates) the store in `dir`, loading `settings.json` when present.
    ///
    /// # Errors
    ///
    /// * [`SettingsError::Io`] if the directory cannot be created or the file cannot be read.
    /// * [`SettingsError::Serialization`] if the document is not valid JSON.
    /// * [`SettingsError::InvalidDocument`] if the document is not a JSON object.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .context(format!("Failed to create settings directory {}", dir.display()))?;

        purge_tmp(dir).await;

        let path = dir.join(SETTINGS_FILE);
        let values = match fs::read(&path).await {
            Ok(bytes) => parse_document(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => {
                return Err(SettingsError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        info!(path = %path.display(), keys = values.len(), "Settings store opened");
        Ok(Self::with_values(Some(path), values))
    }

    /// A store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_values(None, Map::new())
    }

    fn with_values(path: Option<PathBuf>, values: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(SettingsStoreInner {
                path,
                values: RwLock::new(values),
                writer: Mutex::new(()),
                tmp_counter: AtomicU64::new(1),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.values.read().get(key).cloned()
    }

    /// Reads a flag. Absent keys and non-boolean values are `false`; the string `"true"`
    /// is accepted for settings written by older clients.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        match self.inner.values.read().get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(raw)) => raw.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.inner.values.read().get(key) {
            Some(Value::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.values.read().clone()
    }

    /// Writes a single key. Shorthand for a one-entry [`SettingsBatch`].
    ///
    /// # Errors
    ///
    /// See [`SettingsStore::update`].
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), SettingsError> {
        self.update(SettingsBatch::new().set(key, value)).await
    }

    /// Applies every write in `batch` or none of them.
    ///
    /// The next document is built from the current view, persisted, and only then published
    /// to readers. Concurrent batches are applied one after another.
    ///
    /// # Errors
    ///
    /// * [`SettingsError::Serialization`] if the document cannot be encoded.
    /// * [`SettingsError::Io`] if the temp write, `fsync` or rename fails. The in-memory view
    ///   is left untouched in that case.
    pub async fn update(&self, batch: SettingsBatch) -> Result<(), SettingsError> {
        if batch.is_empty() {
            return Ok(());
        }

        let _writer = self.inner.writer.lock().await;

        let mut next = self.inner.values.read().clone();
        for (key, value) in batch.entries {
            next.insert(key, value);
        }

        if let Some(path) = &self.inner.path {
            let document = serde_json::to_vec_pretty(&next).context("Encoding settings")?;
            self.write_atomic(path, &document).await?;
        }

        *self.inner.values.write() = next;
        Ok(())
    }

    async fn write_atomic(&self, target: &Path, data: &[u8]) -> Result<(), SettingsError> {
        let temp = self.unique_tmp_path(target);

        let written = async {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
            fs::rename(&temp, target).await.context(format!(
                "Atomic swap failed: {} -> {}",
                temp.display(),
                target.display()
            ))
        }
        .await;

        if written.is_err() {
            let _ = fs::remove_file(&temp).await;
            return written;
        }

        if let Some(parent) = target.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %target.display(), "Settings saved atomically");
        Ok(())
    }

    fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        target.with_file_name(format!("{SETTINGS_FILE}{TMP_MARKER}{counter}"))
    }
}

fn parse_document(bytes: &[u8]) -> Result<Map<String, Value>, SettingsError> {
    match serde_json::from_slice(bytes).context("Decoding settings document")? {
        Value::Object(map) => Ok(map),
        other => Err(SettingsError::InvalidDocument {
            message: format!("expected a JSON object, found {}", kind_of(&other)).into(),
            context: None,
        }),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

async fn purge_tmp(dir: &Path) {
    let Ok(mut entries) = fs::read_dir(dir).await else { return };
    let mut removed = 0usize;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_tmp = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(SETTINGS_FILE) && name.contains(TMP_MARKER));
        if !is_tmp {
            continue;
        }
        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(err) => warn!(path = %entry.path().display(), error = %err, "Temp cleanup failed"),
        }
    }

    if removed > 0 {
        info!(removed, "Cleaned up temporary settings files");
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_bool_accepts_booleans_and_true_strings() {
        let store = SettingsStore::with_values(
            None,
            json!({ "a": true, "b": false, "c": "true", "d": "yes", "e": 1 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );

        assert!(store.get_bool("a"));
        assert!(!store.get_bool("b"));
        assert!(store.get_bool("c"));
        assert!(!store.get_bool("d"));
        assert!(!store.get_bool("e"));
        assert!(!store.get_bool("missing"));
    }

    #[test]
    fn parse_document_rejects_non_objects() {
        let err = parse_document(b"[1, 2]").expect_err("arrays are not settings");
        assert!(matches!(err, SettingsError::InvalidDocument { .. }));

        let err = parse_document(b"{not json").expect_err("garbage is not settings");
        assert!(matches!(err, SettingsError::Serialization { .. }));
    }

    #[tokio::test]
    async fn later_writes_in_a_batch_win() {
        let store = SettingsStore::in_memory();
        store
            .update(SettingsBatch::new().set("k", 1).set("k", 2))
            .await
            .expect("in-memory update");

        assert_eq!(store.get("k"), Some(json!(2)));
        assert!(store.path().is_none());
    }

    #[tokio::test]
    async fn clones_share_one_view() {
        let store = SettingsStore::in_memory();
        let handle = store.clone();

        handle.set("Register_Server", true).await.expect("in-memory set");

        assert!(store.get_bool("Register_Server"));
        assert_eq!(store.snapshot(), handle.snapshot());
    }
}
