use super::DataFile;
use crate::error::Result;
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
///
/// Backends move whole files around; they know nothing about records. The
/// stores in [`line_store`](super::line_store) and
/// [`json_store`](super::json_store) handle the encoding.
pub trait StorageBackend {
    /// Read the full contents of a file.
    /// Returns Ok(None) if the file does not exist yet.
    fn read(&self, file: DataFile) -> Result<Option<String>>;

    /// Replace the contents of a file, creating parent directories as needed.
    fn write(&self, file: DataFile, contents: &str) -> Result<()>;

    /// Append to a file, creating it if absent.
    fn append(&self, file: DataFile, contents: &str) -> Result<()>;

    /// Copy the current contents of a file to a timestamped backup.
    /// Returns Ok(None) when there is nothing to back up.
    fn backup(&self, file: DataFile) -> Result<Option<PathBuf>>;

    /// Where the file lives. For MemBackend this is a virtual path.
    fn path(&self, file: DataFile) -> PathBuf;
}
