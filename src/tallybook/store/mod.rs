//! # Storage Layer
//!
//! Every tracker keeps its records in one flat file. This module owns the
//! mapping from records to those files.
//!
//! ## Pieces
//!
//! - [`backend::StorageBackend`]: raw whole-file I/O keyed by [`DataFile`].
//!   - [`fs_backend::FsBackend`]: production, files under a data directory.
//!   - [`mem_backend::MemBackend`]: in-memory, for tests.
//! - [`line_store::LineStore`]: one record per line through a
//!   [`LineCodec`](crate::codec::LineCodec).
//! - [`json_store::JsonDocStore`]: the whole file is one JSON array, with an
//!   optional best-effort backup of the previous contents before each save.
//!
//! ## Persistence Model
//!
//! Stores never write on their own. A caller loads the full collection,
//! mutates it in memory, and calls `save` which overwrites the file. Writes
//! go straight to the target file: a crash mid-write can leave a truncated
//! file. Two processes saving the same file race and the last save wins.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── config.json
//! ├── expenses.txt        category,amount,note,day
//! ├── students.txt        id,name,age,grade
//! ├── results.txt         one JSON quiz attempt per line
//! ├── tasks.json          JSON array of tasks
//! ├── categories.json     JSON array of category names
//! ├── report.txt          last text analysis report
//! └── backups/            tasks-YYYYmmdd-HHMMSS.json
//! ```

pub mod backend;
pub mod fs_backend;
pub mod json_store;
pub mod line_store;
pub mod mem_backend;

pub use backend::StorageBackend;

/// The files a tracker data directory may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFile {
    Expenses,
    Students,
    QuizResults,
    Tasks,
    Categories,
    Report,
}

impl DataFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            DataFile::Expenses => "expenses.txt",
            DataFile::Students => "students.txt",
            DataFile::QuizResults => "results.txt",
            DataFile::Tasks => "tasks.json",
            DataFile::Categories => "categories.json",
            DataFile::Report => "report.txt",
        }
    }

    pub fn all() -> &'static [DataFile] {
        &[
            DataFile::Expenses,
            DataFile::Students,
            DataFile::QuizResults,
            DataFile::Tasks,
            DataFile::Categories,
            DataFile::Report,
        ]
    }
}

/// What to do with a line that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Drop the line, log a warning, keep reading.
    #[default]
    Lenient,
    /// Abort the whole load with the first malformed line.
    Strict,
}

impl LoadPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        }
    }
}

/// Records read from a file plus the number of lines that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}
