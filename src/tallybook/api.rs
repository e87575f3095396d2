//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all tallybook operations, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Carries session state**: the storage backend and the loaded [`TallyConfig`]
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal I/O**: no stdout, stderr or formatting
//!
//! ## Generic Over StorageBackend
//!
//! `TallyApi<B: StorageBackend>`:
//! - Production: `TallyApi<FsBackend>`
//! - Testing: `TallyApi<MemBackend>`
//!
//! Every mutating method is one load → change → save cycle. When a command
//! fails nothing is written.

use crate::commands::{
    self, expenses, export, quiz, students, tasks, text, CmdResult, ExpenseFilter, StatusFilter,
    StudentSort,
};
use crate::config::{TallyConfig, CONFIG_KEYS};
use crate::error::Result;
use crate::store::StorageBackend;
use std::borrow::Cow;
use std::path::PathBuf;

pub use crate::commands::text::TextSource;

/// The main API facade.
pub struct TallyApi<B: StorageBackend> {
    backend: B,
    config: TallyConfig,
    config_dir: PathBuf,
    strict_override: bool,
}

impl<B: StorageBackend> TallyApi<B> {
    pub fn new(backend: B, config: TallyConfig, config_dir: PathBuf) -> Self {
        Self {
            backend,
            config,
            config_dir,
            strict_override: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    /// Force strict loads for this session without touching `config.json`.
    pub fn set_strict(&mut self, strict: bool) {
        if strict {
            self.strict_override = true;
        }
    }

    /// Config as commands see it, with session overrides applied.
    fn effective(&self) -> Cow<'_, TallyConfig> {
        if self.strict_override && !self.config.strict_load {
            let mut config = self.config.clone();
            config.strict_load = true;
            Cow::Owned(config)
        } else {
            Cow::Borrowed(&self.config)
        }
    }

    // --- expenses ---

    pub fn add_expense(
        &self,
        category: &str,
        amount: &str,
        note: &str,
        day: &str,
    ) -> Result<CmdResult> {
        expenses::add(&self.backend, &self.effective(), category, amount, note, day)
    }

    pub fn list_expenses(&self, filter: &ExpenseFilter) -> Result<CmdResult> {
        expenses::list(&self.backend, &self.effective(), filter)
    }

    pub fn remove_expense(&self, position: usize) -> Result<CmdResult> {
        expenses::remove(&self.backend, &self.effective(), position)
    }

    // --- students ---

    pub fn add_student(&self, name: &str, age: &str, grade: &str) -> Result<CmdResult> {
        students::add(&self.backend, &self.effective(), name, age, grade)
    }

    pub fn list_students(&self, sort: Option<StudentSort>) -> Result<CmdResult> {
        students::list(&self.backend, &self.effective(), sort)
    }

    pub fn edit_student(
        &self,
        position: usize,
        name: Option<&str>,
        age: Option<&str>,
        grade: Option<&str>,
    ) -> Result<CmdResult> {
        students::edit(&self.backend, &self.effective(), position, name, age, grade)
    }

    pub fn remove_student(&self, position: usize) -> Result<CmdResult> {
        students::remove(&self.backend, &self.effective(), position)
    }

    pub fn sort_students(&self, by: StudentSort) -> Result<CmdResult> {
        students::sort(&self.backend, &self.effective(), by)
    }

    pub fn clear_students(&self) -> Result<CmdResult> {
        students::clear(&self.backend)
    }

    pub fn export_students(&self, dest: Option<PathBuf>) -> Result<CmdResult> {
        students::export_csv(&self.backend, &self.effective(), dest)
    }

    // --- tasks ---

    pub fn add_task(&self, title: &str, category: &str) -> Result<CmdResult> {
        tasks::add(&self.backend, &self.effective(), title, category)
    }

    pub fn edit_task(
        &self,
        title: &str,
        new_title: Option<&str>,
        new_category: Option<&str>,
    ) -> Result<CmdResult> {
        tasks::edit(&self.backend, &self.effective(), title, new_title, new_category)
    }

    pub fn toggle_task(&self, title: &str, done: bool) -> Result<CmdResult> {
        tasks::toggle(&self.backend, &self.effective(), title, done)
    }

    pub fn toggle_tasks<S: AsRef<str>>(&self, titles: &[S], done: bool) -> Result<CmdResult> {
        tasks::toggle_bulk(&self.backend, &self.effective(), titles, done)
    }

    pub fn remove_task(&self, title: &str) -> Result<CmdResult> {
        tasks::remove(&self.backend, &self.effective(), title)
    }

    pub fn list_tasks(&self, category: Option<&str>, status: StatusFilter) -> Result<CmdResult> {
        tasks::list(&self.backend, &self.effective(), category, status)
    }

    pub fn task_categories(&self) -> Result<CmdResult> {
        tasks::categories(&self.backend, &self.effective())
    }

    pub fn import_tasks(&self, content: &str) -> Result<CmdResult> {
        tasks::import(&self.backend, &self.effective(), content)
    }

    pub fn export_tasks(&self, dest: Option<PathBuf>) -> Result<CmdResult> {
        tasks::export(&self.backend, &self.effective(), dest)
    }

    pub fn clear_tasks(&self) -> Result<CmdResult> {
        tasks::clear(&self.backend, &self.effective())
    }

    // --- quiz ---

    pub fn quiz_questions(&self, n: usize, shuffle: bool) -> CmdResult {
        quiz::questions(n, shuffle)
    }

    pub fn submit_quiz<S: AsRef<str>>(&self, answers: &[(u32, S)]) -> Result<CmdResult> {
        quiz::submit(&self.backend, answers)
    }

    pub fn quiz_history(&self) -> Result<CmdResult> {
        quiz::history(&self.backend, &self.effective())
    }

    // --- text ---

    pub fn analyze_text(
        &self,
        source: TextSource<'_>,
        top_n: Option<usize>,
        write_report: bool,
    ) -> Result<CmdResult> {
        text::analyze(&self.backend, &self.effective(), source, top_n, write_report)
    }

    // --- data ---

    pub fn export_all(&self, dest: Option<PathBuf>) -> Result<CmdResult> {
        export::run(&self.backend, dest)
    }

    /// Path of every data file, whether or not it exists yet.
    pub fn paths(&self) -> CmdResult {
        let paths = crate::store::DataFile::all()
            .iter()
            .map(|f| self.backend.path(*f))
            .collect();
        CmdResult::default().with_paths(paths)
    }

    // --- config ---

    /// Show one key, or the whole config when `key` is None.
    pub fn get_config(&self, key: Option<&str>) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        match key {
            Some(key) => {
                let value = self.config.get(key)?;
                result.add_message(commands::CmdMessage::info(format!("{} = {}", key, value)));
            }
            None => {
                for key in CONFIG_KEYS {
                    let value = self.config.get(key)?;
                    result.add_message(commands::CmdMessage::info(format!("{} = {}", key, value)));
                }
            }
        }
        Ok(result.with_config(self.config.clone()))
    }

    /// Set a key and persist `config.json`.
    pub fn set_config(&mut self, key: &str, value: &str) -> Result<CmdResult> {
        let mut updated = self.config.clone();
        updated.set(key, value)?;
        updated.save(&self.config_dir)?;
        self.config = updated;

        let mut result = CmdResult::default();
        result.add_message(commands::CmdMessage::success(format!(
            "{} = {}",
            key,
            self.config.get(key)?
        )));
        Ok(result.with_config(self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::store::DataFile;
    use tempfile::TempDir;

    fn api() -> TallyApi<MemBackend> {
        TallyApi::new(MemBackend::new(), TallyConfig::default(), PathBuf::from("unused"))
    }

    #[test]
    fn expense_flow() {
        let api = api();
        api.add_expense("food", "20", "lunch", "Monday").unwrap();
        api.add_expense("transport", "10", ",taxi", "Monday").unwrap();

        let result = api.list_expenses(&ExpenseFilter::default()).unwrap();
        assert_eq!(result.expense_summary.unwrap().total, 30.0);
        assert_eq!(result.expenses[1].note, ";taxi");
    }

    #[test]
    fn failed_command_writes_nothing() {
        let api = api();
        assert!(api.add_student("", "18", "10").is_err());
        assert!(api.add_task("", "work").is_err());
        assert_eq!(api.backend().contents(DataFile::Students), None);
        assert_eq!(api.backend().contents(DataFile::Tasks), None);
    }

    #[test]
    fn strict_override() {
        let mut api = TallyApi::new(
            MemBackend::new().with_file(DataFile::Students, "1,Ann,18,8.0\nbad\n"),
            TallyConfig::default(),
            PathBuf::from("unused"),
        );
        assert_eq!(api.list_students(None).unwrap().students.len(), 1);
        api.set_strict(true);
        assert!(api.list_students(None).is_err());
        assert!(!api.config().strict_load);
    }

    #[test]
    fn paths_cover_every_data_file() {
        assert_eq!(api().paths().paths.len(), DataFile::all().len());
    }

    #[test]
    fn set_config_persists() {
        let dir = TempDir::new().unwrap();
        let mut api = TallyApi::new(
            MemBackend::new(),
            TallyConfig::default(),
            dir.path().to_path_buf(),
        );
        api.set_config("fail-threshold", "12").unwrap();
        assert_eq!(api.config().fail_threshold, 12.0);
        assert_eq!(TallyConfig::load(dir.path()).unwrap().fail_threshold, 12.0);

        assert!(api.set_config("fail-threshold", "high").is_err());
        assert_eq!(api.config().fail_threshold, 12.0);

        let shown = api.get_config(None).unwrap();
        assert_eq!(shown.messages.len(), CONFIG_KEYS.len());
    }
}
