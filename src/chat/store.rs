use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Error, Result};
use chrono::{Local, NaiveDateTime, TimeDelta};
use tokio::sync::Mutex;

use crate::openai::Message;

/// Format of the timestamp embedded in a session filename,
/// e.g. `2025-0830-142501.json`.
const TIMESTAMP_FORMAT: &str = "%Y-%m%d-%H%M%S";

const EXTENSION: &str = "json";

/// File-backed store of chat transcripts. Each session is one JSON
/// file holding a bare array of messages, named by its creation
/// timestamp at second granularity. Cloning is cheap so handlers can
/// pull a copy out of shared state before awaiting.
#[derive(Clone)]
pub struct ChatStore {
    dir: PathBuf,
    // Serializes filename generation so two sessions created within
    // the same clock-second can't overwrite each other
    create_lock: Arc<Mutex<()>>,
}

/// Parse the timestamp out of a session filename. Returns `None` for
/// anything that isn't `<timestamp>.json`, which also keeps ids with
/// path separators from ever reaching the filesystem.
fn parse_id(id: &str) -> Option<NaiveDateTime> {
    let stem = id.strip_suffix(".json")?;
    NaiveDateTime::parse_from_str(stem, TIMESTAMP_FORMAT).ok()
}

impl ChatStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            create_lock: Arc::new(Mutex::new(())),
        })
    }

    /// List all session filenames, most recent first as determined by
    /// the timestamp embedded in the filename (not file metadata).
    /// Files that don't parse as session filenames are skipped.
    pub async fn list(&self) -> Result<Vec<String>, Error> {
        let mut sessions: Vec<(NaiveDateTime, String)> = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(ts) = parse_id(name) {
                sessions.push((ts, name.to_string()));
            }
        }

        sessions.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(sessions.into_iter().map(|(_, name)| name).collect())
    }

    /// Persist a new session and return its filename. The filename is
    /// derived from the current wall-clock time; if a session already
    /// exists for this second the timestamp is advanced until a free
    /// name is found so the id stays sortable.
    pub async fn create(&self, messages: &[Message]) -> Result<String, Error> {
        let _guard = self.create_lock.lock().await;

        let mut ts = Local::now().naive_local();
        let filename = loop {
            let filename = format!("{}.{}", ts.format(TIMESTAMP_FORMAT), EXTENSION);
            if !tokio::fs::try_exists(self.dir.join(&filename)).await? {
                break filename;
            }
            ts += TimeDelta::seconds(1);
        };

        let data = serde_json::to_vec(messages)?;
        tokio::fs::write(self.dir.join(&filename), data).await?;

        Ok(filename)
    }

    /// Read a session transcript. Returns `None` when no session
    /// exists for the id.
    pub async fn read(&self, id: &str) -> Result<Option<Vec<Message>>, Error> {
        if parse_id(id).is_none() {
            return Ok(None);
        }

        match tokio::fs::read(self.dir.join(id)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a session's transcript wholesale. Returns `false` when
    /// no session exists for the id; updates never create.
    pub async fn update(&self, id: &str, messages: &[Message]) -> Result<bool, Error> {
        if parse_id(id).is_none() {
            return Ok(false);
        }

        let path = self.dir.join(id);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }

        let data = serde_json::to_vec(messages)?;
        tokio::fs::write(path, data).await?;

        Ok(true)
    }

    /// Delete a session. Returns `false` when no session exists for
    /// the id.
    pub async fn delete(&self, id: &str) -> Result<bool, Error> {
        if parse_id(id).is_none() {
            return Ok(false);
        }

        match tokio::fs::remove_file(self.dir.join(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, ChatStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = ChatStore::new(dir.path().join("chats")).expect("Failed to create store");
        (dir, store)
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("2025-0830-142501.json").is_some());
        assert!(parse_id("2025-0830-142501").is_none());
        assert!(parse_id("2025-0830-142501.txt").is_none());
        assert!(parse_id("notes.json").is_none());
        assert!(parse_id("../2025-0830-142501.json").is_none());
        assert!(parse_id("").is_none());
    }

    #[tokio::test]
    async fn test_create_then_read_round_trips() {
        let (_dir, store) = test_store();

        let messages = vec![
            Message::new("user", "hi"),
            Message::new("system", "Hello! How can I help?"),
        ];
        let id = store.create(&messages).await.unwrap();
        assert!(id.ends_with(".json"));

        let read_back = store.read(&id).await.unwrap().unwrap();
        assert_eq!(read_back, messages);
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let (_dir, store) = test_store();
        assert!(store.read("2020-0101-000000.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_wholesale() {
        let (_dir, store) = test_store();

        let id = store.create(&[Message::new("user", "one")]).await.unwrap();

        let replacement = vec![Message::new("user", "two")];
        assert!(store.update(&id, &replacement).await.unwrap());

        // Only the new list remains, not a merge with the old
        let read_back = store.read(&id).await.unwrap().unwrap();
        assert_eq!(read_back, replacement);
    }

    #[tokio::test]
    async fn test_update_missing_does_not_create() {
        let (_dir, store) = test_store();

        let updated = store
            .update("2020-0101-000000.json", &[Message::new("user", "hi")])
            .await
            .unwrap();
        assert!(!updated);
        assert!(store.read("2020-0101-000000.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_then_read_is_none() {
        let (_dir, store) = test_store();

        let id = store.create(&[Message::new("user", "hi")]).await.unwrap();
        assert!(store.delete(&id).await.unwrap());
        assert!(store.read(&id).await.unwrap().is_none());
        // Deleting again reports missing
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_most_recent_first() {
        let (dir, store) = test_store();
        let chats = dir.path().join("chats");

        for name in [
            "2025-0102-120000.json",
            "2025-0103-120000.json",
            "2025-0101-120000.json",
        ] {
            std::fs::write(chats.join(name), b"[]").unwrap();
        }

        let listed = store.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                "2025-0103-120000.json",
                "2025-0102-120000.json",
                "2025-0101-120000.json"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_skips_unparseable_filenames() {
        let (dir, store) = test_store();
        let chats = dir.path().join("chats");

        std::fs::write(chats.join("2025-0101-120000.json"), b"[]").unwrap();
        std::fs::write(chats.join("notes.txt"), b"not a session").unwrap();
        std::fs::write(chats.join("garbage.json"), b"[]").unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec!["2025-0101-120000.json"]);
    }

    #[tokio::test]
    async fn test_create_within_same_second_yields_distinct_ids() {
        let (_dir, store) = test_store();

        let first = store.create(&[Message::new("user", "a")]).await.unwrap();
        let second = store.create(&[Message::new("user", "b")]).await.unwrap();

        assert_ne!(first, second);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(
            store.read(&first).await.unwrap().unwrap(),
            vec![Message::new("user", "a")]
        );
        assert_eq!(
            store.read(&second).await.unwrap().unwrap(),
            vec![Message::new("user", "b")]
        );
    }

    #[tokio::test]
    async fn test_persisted_format_is_a_bare_array() {
        let (dir, store) = test_store();

        let id = store.create(&[Message::new("user", "hi")]).await.unwrap();
        let raw = std::fs::read_to_string(dir.path().join("chats").join(&id)).unwrap();
        assert_eq!(raw, r#"[{"role":"user","content":"hi"}]"#);
    }
}
