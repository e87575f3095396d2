//! Typed records for each tracker.
//!
//! Constructors (`Expense::new`, `Student::new`, `Task::new`) validate their
//! input and are what the `add` commands use. Records decoded from disk are
//! built directly by the codecs, which only check that fields parse.

use crate::error::{Result, TallyError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNCATEGORIZED: &str = "uncategorized";
pub const DEFAULT_TASK_CATEGORY: &str = "general";
pub const UNKNOWN_DAY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub category: String,
    pub amount: f64,
    pub note: String,
    pub day: String,
}

impl Expense {
    pub fn new(category: &str, amount: f64, note: &str, day: &str) -> Result<Self> {
        let category = category.trim();
        if category.is_empty() {
            return Err(TallyError::Validation("category cannot be empty".into()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TallyError::Validation(format!(
                "amount must be a positive number, got {amount}"
            )));
        }
        let day = match day.trim() {
            "" => UNKNOWN_DAY,
            d => d,
        };
        Ok(Self {
            category: category.to_string(),
            amount,
            note: note.trim().to_string(),
            day: day.to_string(),
        })
    }

    /// Category used for grouping; empty categories fold into "uncategorized".
    pub fn group_key(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u32,
    pub name: String,
    pub age: u32,
    pub grade: f64,
}

impl Student {
    pub fn new(id: u32, name: &str, age: u32, grade: f64) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::Validation("name cannot be empty".into()));
        }
        if name.contains(['\n', '\r']) {
            return Err(TallyError::Validation(
                "name cannot contain line breaks".into(),
            ));
        }
        if !grade.is_finite() {
            return Err(TallyError::Validation(format!("invalid grade: {grade}")));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            age,
            grade,
        })
    }
}

fn default_task_category() -> String {
    DEFAULT_TASK_CATEGORY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default = "default_task_category")]
    pub category: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub created: String,
}

impl Task {
    pub fn new(title: &str, category: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TallyError::Validation("title required".into()));
        }
        let category = match category.trim() {
            "" => DEFAULT_TASK_CATEGORY,
            c => c,
        };
        Ok(Self {
            title: title.to_string(),
            category: category.to_string(),
            done: false,
            created: now_iso(),
        })
    }

    /// Case-insensitive, whitespace-insensitive title comparison.
    pub fn matches_title(&self, title: &str) -> bool {
        normalize_title(&self.title) == normalize_title(title)
    }
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Local time, second precision, e.g. `2025-03-01T09:30:00`.
pub fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    Fail,
}

impl Grade {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else {
            Grade::Fail
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::Fail => "Fail",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question: String,
    pub given: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub score: f64,
    pub grade: Grade,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub wrong: Vec<AnswerDetail>,
    #[serde(default)]
    pub right: Vec<AnswerDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}
