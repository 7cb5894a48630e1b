use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::formats::{ReadingState, Theme};

pub const READING_STATE_KEY: &str = "thakur_reading_state";
pub const THEME_KEY: &str = "thakur_theme_settings";

/// Key-value persistence for reader state, one JSON document per key.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn put_raw(&self, key: &str, json: String) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct LocalFsStateStore {
    base_dir: PathBuf,
}

impl LocalFsStateStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StateStore for LocalFsStateStore {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read: {}", path.display())),
        }
    }

    async fn put_raw(&self, key: &str, json: String) -> anyhow::Result<()> {
        let path = self.key_path(key);
        write_atomic(&path, json.as_bytes())
            .await
            .with_context(|| format!("write: {}", path.display()))
    }
}

/// Loads a value, falling back to its default when missing or unreadable.
pub async fn load_or_default<T>(store: &dyn StateStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get_raw(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(key, err = %format!("{err:#}"), "state read failed; using defaults");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, ?err, "stored state is not valid; using defaults");
            T::default()
        }
    }
}

pub async fn save<T: Serialize + Sync>(
    store: &dyn StateStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize state json")?;
    store.put_raw(key, json).await
}

pub async fn load_reading_state(store: &dyn StateStore) -> ReadingState {
    load_or_default(store, READING_STATE_KEY).await
}

pub async fn load_theme(store: &dyn StateStore) -> Theme {
    let mut theme: Theme = load_or_default(store, THEME_KEY).await;
    theme.font_size = theme
        .font_size
        .clamp(crate::formats::MIN_FONT_SIZE, crate::formats::MAX_FONT_SIZE);
    theme
}

async fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    fs::write(&tmp_path, data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}
