use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::formats::{DEFAULT_PLACEHOLDER_IMAGE, ProductRecord};

/// Well-known slot name the catalog is stored under.
pub const CATALOG_KEY: &str = "hamesha_products";

/// Single-slot, whole-catalog persistence.
///
/// `load` distinguishes an absent slot (`Ok(None)`) from unreadable or corrupt
/// contents (`Err`). `save` always overwrites the full slot.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn load(&self) -> Result<Option<Vec<ProductRecord>>, StoreError>;
    async fn save(&self, records: &[ProductRecord]) -> Result<(), StoreError>;

    /// Copies a slot that `load` rejected aside so the next `save` cannot destroy it.
    async fn preserve_unusable(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct LocalFsCatalogStore {
    base_dir: PathBuf,
    placeholder_image: String,
}

impl LocalFsCatalogStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_owned(),
        }
    }

    /// Image used when a stored record has a blank `image`.
    pub fn with_placeholder_image(mut self, placeholder_image: impl Into<String>) -> Self {
        self.placeholder_image = placeholder_image.into();
        self
    }

    pub fn slot_path(&self) -> PathBuf {
        self.base_dir.join(format!("{CATALOG_KEY}.json"))
    }

    pub fn backup_path(&self) -> PathBuf {
        self.base_dir.join(format!("{CATALOG_KEY}.json.bak"))
    }
}

#[async_trait]
impl CatalogStore for LocalFsCatalogStore {
    async fn load(&self) -> Result<Option<Vec<ProductRecord>>, StoreError> {
        let path = self.slot_path();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        decode_catalog(&bytes, &self.placeholder_image).map(Some)
    }

    async fn save(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        let data = encode_catalog(records)?;
        write_atomic(&self.slot_path(), &data).await
    }

    async fn preserve_unusable(&self) -> Result<(), StoreError> {
        let backup = self.backup_path();
        match fs::copy(self.slot_path(), &backup).await {
            Ok(_) => {
                tracing::info!(path = %backup.display(), "kept unusable catalog aside");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: backup,
                source,
            }),
        }
    }
}

/// Keeps the slot as serialized text so tests can seed arbitrary contents.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    slot: Mutex<Option<String>>,
    backup: Mutex<Option<String>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<String> {
        lock(&self.slot).clone()
    }

    pub fn backup(&self) -> Option<String> {
        lock(&self.backup).clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn load(&self) -> Result<Option<Vec<ProductRecord>>, StoreError> {
        match lock(&self.slot).as_deref() {
            Some(raw) => decode_catalog(raw.as_bytes(), DEFAULT_PLACEHOLDER_IMAGE).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        if *lock(&self.fail_writes) {
            return Err(StoreError::Write {
                path: PathBuf::from(CATALOG_KEY),
                source: std::io::Error::other("writes disabled"),
            });
        }
        let text = serde_json::to_string(records).map_err(StoreError::Serialize)?;
        *lock(&self.slot) = Some(text);
        Ok(())
    }

    async fn preserve_unusable(&self) -> Result<(), StoreError> {
        let current = lock(&self.slot).clone();
        if current.is_some() {
            *lock(&self.backup) = current;
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Parses a stored catalog. Only undecodable JSON is corrupt: blank titles and
/// images are refilled, and records without a `url` are dropped.
pub fn decode_catalog(
    bytes: &[u8],
    placeholder_image: &str,
) -> Result<Vec<ProductRecord>, StoreError> {
    let records: Vec<ProductRecord> =
        serde_json::from_slice(bytes).map_err(|err| StoreError::Corrupt {
            reason: err.to_string(),
        })?;
    let mut kept = Vec::with_capacity(records.len());
    for (position, record) in records.into_iter().enumerate() {
        match record.repaired(placeholder_image) {
            Some(record) => kept.push(record),
            None => tracing::warn!(position, "dropping stored product without url"),
        }
    }
    Ok(kept)
}

pub fn encode_catalog(records: &[ProductRecord]) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(records).map_err(StoreError::Serialize)
}

async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let written = match fs::write(&tmp_path, data).await {
        Ok(()) => fs::rename(&tmp_path, path).await,
        Err(err) => Err(err),
    };
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StoreError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
