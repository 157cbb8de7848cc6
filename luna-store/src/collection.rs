use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use luna_shared::errors::{AppError, AppResult, ErrorCode};

/// A record type persisted in its own collection file.
///
/// `Patch` is the shallow-merge update shape: fields absent from the patch
/// are left untouched, fields present overwrite the stored value, and an
/// explicit JSON `null` clears an optional field.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Clone + PartialEq + Display + Send + Sync;
    type Patch: Serialize + Send + Sync;

    /// File stem of the collection under the store's data directory.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Synthesize an id when the caller did not supply one. Entities with
    /// externally assigned ids (users) leave this as a no-op.
    fn ensure_id(&mut self) {}
}

/// Patch type for append-only collections: serializes to nothing, so an
/// `update` with it can never change a record.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NoPatch {}

/// One durable, insertion-ordered record collection, held in memory and
/// rewritten to a JSON document on every mutation.
///
/// Each operation is an independent unit of failure: there is no
/// multi-collection transaction, and a failed write leaves both the file and
/// the in-memory state untouched. A single `RwLock` serializes writers, so
/// within one session writes apply in invocation order.
pub struct Collection<T: Entity> {
    path: PathBuf,
    records: RwLock<Vec<T>>,
}

impl<T: Entity> Collection<T> {
    /// Open (or initialize empty) the collection file under `dir`.
    pub async fn open(dir: &Path) -> AppResult<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.json", T::COLLECTION));

        let records: Vec<T> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            collection = T::COLLECTION,
            records = records.len(),
            "collection opened"
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Every record, in insertion order.
    pub async fn all(&self) -> AppResult<Vec<T>> {
        Ok(self.records.read().await.clone())
    }

    pub async fn get(&self, id: &T::Id) -> AppResult<Option<T>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id() == *id)
            .cloned())
    }

    /// Append a record, synthesizing an id when the entity did not supply
    /// one. Fails on a duplicate id.
    pub async fn create(&self, mut entity: T) -> AppResult<T> {
        entity.ensure_id();

        let mut guard = self.records.write().await;
        if guard.iter().any(|r| r.id() == entity.id()) {
            return Err(AppError::new(
                ErrorCode::DuplicateId,
                format!("{} record {} already exists", T::COLLECTION, entity.id()),
            ));
        }

        let mut next = guard.clone();
        next.push(entity.clone());
        self.persist(&next).await?;
        *guard = next;

        tracing::debug!(collection = T::COLLECTION, id = %entity.id(), "record created");
        Ok(entity)
    }

    /// Shallow-merge `patch` into the stored record and return the merged
    /// result. Fails `NotFound` on an unknown id; never silently no-ops.
    pub async fn update(&self, id: &T::Id, patch: T::Patch) -> AppResult<T> {
        let mut guard = self.records.write().await;
        let index = guard
            .iter()
            .position(|r| r.id() == *id)
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::NotFound,
                    format!("{} record {id} not found", T::COLLECTION),
                )
            })?;

        let merged = merge_patch(&guard[index], &patch)?;

        let mut next = guard.clone();
        next[index] = merged.clone();
        self.persist(&next).await?;
        *guard = next;

        tracing::debug!(collection = T::COLLECTION, id = %id, "record updated");
        Ok(merged)
    }

    async fn persist(&self, records: &[T]) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

/// Field-level shallow merge: overlay the patch's serialized object onto the
/// record's. Keys present in the patch win, an explicit `null` clears the
/// field, everything else is preserved.
fn merge_patch<T: Entity>(current: &T, patch: &T::Patch) -> AppResult<T> {
    let mut base = serde_json::to_value(current)?;
    let overlay = serde_json::to_value(patch)?;

    if let (Value::Object(base_map), Value::Object(overlay_map)) = (&mut base, overlay) {
        for (key, value) in overlay_map {
            base_map.insert(key, value);
        }
    }

    Ok(serde_json::from_value(base)?)
}
