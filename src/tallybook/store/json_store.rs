use super::backend::StorageBackend;
use super::DataFile;
use crate::error::Result;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A file whose whole contents are one JSON array.
pub struct JsonDocStore<'a, T, B> {
    backend: &'a B,
    file: DataFile,
    backups: bool,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T, B> JsonDocStore<'a, T, B>
where
    T: Serialize + DeserializeOwned,
    B: StorageBackend,
{
    pub fn new(backend: &'a B, file: DataFile) -> Self {
        Self {
            backend,
            file,
            backups: false,
            _record: PhantomData,
        }
    }

    /// Copy the previous file into the backup directory before every save.
    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backups = enabled;
        self
    }

    /// Read the array. Returns None when the file is missing or unreadable
    /// as JSON, so callers can fall back to their own defaults.
    pub fn load_opt(&self) -> Result<Option<Vec<T>>> {
        let Some(content) = self.backend.read(self.file)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<T>>(&content) {
            Ok(items) => {
                debug!("loaded {} items from {}", items.len(), self.file.file_name());
                Ok(Some(items))
            }
            Err(e) => {
                warn!("{} is not a valid JSON array: {}", self.file.file_name(), e);
                Ok(None)
            }
        }
    }

    pub fn load(&self) -> Result<Vec<T>> {
        Ok(self.load_opt()?.unwrap_or_default())
    }

    pub fn save(&self, items: &[T]) -> Result<()> {
        if self.backups {
            self.append_backup();
        }
        let content = serde_json::to_string_pretty(items)?;
        self.backend.write(self.file, &content)?;
        debug!("saved {} items to {}", items.len(), self.file.file_name());
        Ok(())
    }

    /// Best-effort: a failed backup never blocks the save.
    fn append_backup(&self) {
        match self.backend.backup(self.file) {
            Ok(Some(path)) => debug!("backed up {} to {}", self.file.file_name(), path.display()),
            Ok(None) => {}
            Err(e) => warn!("backup of {} failed: {}", self.file.file_name(), e),
        }
    }
}
