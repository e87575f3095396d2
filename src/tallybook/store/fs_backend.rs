use super::backend::StorageBackend;
use super::DataFile;
use crate::error::{Result, TallyError};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const BACKUP_DIR: &str = "backups";

pub struct FsBackend {
    root: PathBuf,
    backup_dir: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        let backup_dir = root.join(BACKUP_DIR);
        Self { root, backup_dir }
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(TallyError::Io)?;
        }
        Ok(())
    }

    fn backup_name(file: DataFile) -> String {
        let name = Path::new(file.file_name());
        let stem = name.file_stem().and_then(|s| s.to_str()).unwrap_or("data");
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        match name.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}-{stamp}.{ext}"),
            None => format!("{stem}-{stamp}"),
        }
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, file: DataFile) -> Result<Option<String>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(TallyError::Io)?;
        Ok(Some(content))
    }

    fn write(&self, file: DataFile, contents: &str) -> Result<()> {
        self.ensure_dir(&self.root)?;
        fs::write(self.path(file), contents).map_err(TallyError::Io)?;
        Ok(())
    }

    fn append(&self, file: DataFile, contents: &str) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(file))
            .map_err(TallyError::Io)?;
        handle
            .write_all(contents.as_bytes())
            .map_err(TallyError::Io)?;
        Ok(())
    }

    fn backup(&self, file: DataFile) -> Result<Option<PathBuf>> {
        let source = self.path(file);
        if !source.exists() {
            return Ok(None);
        }
        self.ensure_dir(&self.backup_dir)?;
        let target = self.backup_dir.join(Self::backup_name(file));
        fs::copy(&source, &target).map_err(TallyError::Io)?;
        Ok(Some(target))
    }

    fn path(&self, file: DataFile) -> PathBuf {
        self.root.join(file.file_name())
    }
}
