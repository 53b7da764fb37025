use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, instrument};

use pawtale_core::ids::is_valid_session_id;
use pawtale_core::{SessionId, SessionSnapshot};

use crate::error::StoreError;
use crate::record::SessionRecord;

/// One JSON document per session under a single directory.
///
/// Writes go to a temporary file that is then renamed over the record.
/// There is no cross-process locking: the last write wins.
#[derive(Clone, Debug)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &SessionId) -> Result<PathBuf, StoreError> {
        if !is_valid_session_id(id.as_str()) {
            return Err(StoreError::InvalidId(id.as_str().to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id.as_str())))
    }

    /// Load the raw record, timestamp included.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn load_record(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let path = self.record_path(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no record on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice::<SessionRecord>(&bytes).map_err(|e| {
            StoreError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Some(record))
    }

    pub async fn load(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, StoreError> {
        match self.load_record(id).await? {
            Some(record) => record.into_snapshot(id.as_str()),
            None => Ok(None),
        }
    }

    /// Persist the snapshot, stamping `last_updated`.
    #[instrument(skip(self, snapshot), fields(session_id = %id))]
    pub async fn save(
        &self,
        id: &SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<SessionRecord, StoreError> {
        let path = self.record_path(id)?;
        let record = SessionRecord::from_snapshot(snapshot, Utc::now());
        let data = serde_json::to_vec_pretty(&record)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        write_atomic(&path, &data).await?;
        debug!(bytes = data.len(), "record saved");
        Ok(record)
    }

    /// Delete the record. A missing record is not an error.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn reset(&self, id: &SessionId) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `data` next to `path` and rename it into place.
pub async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::Io(format!("bad path: {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7()));

    if let Err(e) = tokio::fs::write(&tmp, data).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}
