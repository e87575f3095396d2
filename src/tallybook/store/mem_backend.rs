use super::backend::StorageBackend;
use super::DataFile;
use crate::error::{Result, TallyError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` so the `StorageBackend` trait can take `&self` everywhere.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<HashMap<DataFile, String>>,
    backups: RefCell<Vec<(DataFile, String)>>,
    simulate_backup_error: RefCell<bool>,
    simulate_write_error: RefCell<Option<DataFile>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with raw contents.
    pub fn with_file(self, file: DataFile, contents: &str) -> Self {
        self.files.borrow_mut().insert(file, contents.to_string());
        self
    }

    /// Raw contents of a file, if it was ever written.
    pub fn contents(&self, file: DataFile) -> Option<String> {
        self.files.borrow().get(&file).cloned()
    }

    /// Backups taken so far, oldest first.
    pub fn backups(&self) -> Vec<(DataFile, String)> {
        self.backups.borrow().clone()
    }

    pub fn set_simulate_backup_error(&self, simulate: bool) {
        *self.simulate_backup_error.borrow_mut() = simulate;
    }

    /// Make writes and appends to `file` fail.
    pub fn set_simulate_write_error(&self, file: Option<DataFile>) {
        *self.simulate_write_error.borrow_mut() = file;
    }

    fn check_writable(&self, file: DataFile) -> Result<()> {
        if *self.simulate_write_error.borrow() == Some(file) {
            return Err(TallyError::Io(io::Error::other(format!(
                "simulated write failure for {}",
                file.file_name()
            ))));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, file: DataFile) -> Result<Option<String>> {
        Ok(self.contents(file))
    }

    fn write(&self, file: DataFile, contents: &str) -> Result<()> {
        self.check_writable(file)?;
        self.files.borrow_mut().insert(file, contents.to_string());
        Ok(())
    }

    fn append(&self, file: DataFile, contents: &str) -> Result<()> {
        self.check_writable(file)?;
        self.files
            .borrow_mut()
            .entry(file)
            .or_default()
            .push_str(contents);
        Ok(())
    }

    fn backup(&self, file: DataFile) -> Result<Option<PathBuf>> {
        if *self.simulate_backup_error.borrow() {
            return Err(TallyError::Io(io::Error::other("simulated backup failure")));
        }
        let Some(current) = self.contents(file) else {
            return Ok(None);
        };
        let mut backups = self.backups.borrow_mut();
        backups.push((file, current));
        Ok(Some(PathBuf::from(format!(
            "mem://backups/{}.{}",
            file.file_name(),
            backups.len()
        ))))
    }

    fn path(&self, file: DataFile) -> PathBuf {
        PathBuf::from(format!("mem://{}", file.file_name()))
    }
}
