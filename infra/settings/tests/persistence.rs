use serde_json::json;
use std::sync::Arc;
use stratus_settings::{SETTINGS_FILE, SettingsBatch, SettingsError, SettingsStore};
use tempfile::TempDir;

#[tokio::test]
async fn batch_survives_reopen() {
    let temp = TempDir::new().unwrap();

    let store = SettingsStore::open(temp.path()).await.unwrap();
    store
        .update(
            SettingsBatch::new()
                .set("Register_Server", true)
                .set("Cloud_Workspace_Id", "ws-42")
                .set("Cloud_Workspace_Registration_Payload", json!({ "workspaceId": "ws-42" })),
        )
        .await
        .unwrap();

    let reopened = SettingsStore::open(temp.path()).await.unwrap();
    assert!(reopened.get_bool("Register_Server"));
    assert_eq!(reopened.get_str("Cloud_Workspace_Id").as_deref(), Some("ws-42"));
    assert_eq!(reopened.snapshot(), store.snapshot());
}

#[tokio::test]
async fn failed_write_leaves_view_untouched() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data");

    let store = SettingsStore::open(&dir).await.unwrap();
    store.set("uniqueID", "ws-1").await.unwrap();

    // Replace the data directory with a plain file so the temp write cannot be created.
    std::fs::remove_dir_all(&dir).unwrap();
    std::fs::write(&dir, b"blocker").unwrap();

    let err = store
        .update(SettingsBatch::new().set("Register_Server", true).set("uniqueID", "ws-2"))
        .await
        .expect_err("write into a file path must fail");

    assert!(matches!(err, SettingsError::Io { .. }), "got {err}");
    assert!(!store.get_bool("Register_Server"));
    assert_eq!(store.get("uniqueID"), Some(json!("ws-1")));
}

#[tokio::test]
async fn corrupt_document_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(SETTINGS_FILE), b"\"just a string\"").unwrap();

    let err = SettingsStore::open(temp.path()).await.expect_err("non-object document");
    assert!(matches!(err, SettingsError::InvalidDocument { .. }));
}

#[tokio::test]
async fn stale_temp_files_are_removed_on_open() {
    let temp = TempDir::new().unwrap();
    let orphan = temp.path().join(format!("{SETTINGS_FILE}.stratustmp.7"));
    std::fs::write(&orphan, b"{}").unwrap();

    let _store = SettingsStore::open(temp.path()).await.unwrap();
    assert!(!orphan.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batches_are_all_applied() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(SettingsStore::open(temp.path()).await.unwrap());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.set(format!("key_{i}"), i).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let reopened = SettingsStore::open(temp.path()).await.unwrap();
    assert_eq!(reopened.snapshot().len(), 16);
    assert_eq!(reopened.get("key_9"), Some(json!(9)));
}
