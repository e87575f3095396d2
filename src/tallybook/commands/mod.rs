use crate::aggregate::CompletionStats;
use crate::config::TallyConfig;
use crate::model::{Expense, QuizAttempt, Student, Task};
use crate::store::LoadPolicy;
use crate::text::TextReport;
use std::path::PathBuf;

pub mod expenses;
pub mod export;
pub mod quiz;
pub mod students;
pub mod tasks;
pub mod text;

pub use expenses::{ExpenseFilter, ExpenseSummary};
pub use quiz::Question;
pub use students::{StudentSort, StudentSummary};
pub use tasks::StatusFilter;

/// Load policy for a command run, taken from `strict_load`.
pub fn load_policy(config: &TallyConfig) -> LoadPolicy {
    LoadPolicy::from_strict(config.strict_load)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// Everything a command hands back to its caller. Commands fill in the
/// fields that apply to them and leave the rest empty.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub expenses: Vec<Expense>,
    pub expense_summary: Option<ExpenseSummary>,
    pub students: Vec<Student>,
    pub student_summary: Option<StudentSummary>,
    pub tasks: Vec<Task>,
    pub task_stats: Option<CompletionStats>,
    pub categories: Vec<String>,
    pub questions: Vec<Question>,
    pub attempts: Vec<QuizAttempt>,
    pub text_report: Option<TextReport>,
    pub config: Option<TallyConfig>,
    pub paths: Vec<PathBuf>,
    /// 1-based file position of each listed expense or student, the number
    /// `edit` and `remove` take.
    pub positions: Vec<usize>,
    /// Records touched by a bulk operation.
    pub changed: usize,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_expenses(mut self, expenses: Vec<Expense>) -> Self {
        self.expenses = expenses;
        self
    }

    pub fn with_students(mut self, students: Vec<Student>) -> Self {
        self.students = students;
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: TallyConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Warn about lines a lenient load dropped.
    pub(crate) fn note_skipped(&mut self, file: &str, skipped: usize) {
        if skipped > 0 {
            self.add_message(CmdMessage::warning(format!(
                "Skipped {} malformed line(s) in {}",
                skipped, file
            )));
        }
    }
}
