//! Quiz grading and attempt history.
//!
//! Attempts are appended to `results.txt` as one JSON document per line, so a
//! damaged line only costs that one attempt.

use crate::aggregate::round1;
use crate::codec::jsonl::JsonLinesCodec;
use crate::commands::{load_policy, CmdMessage, CmdResult};
use crate::config::TallyConfig;
use crate::error::{Result, TallyError};
use crate::model::{AnswerDetail, Grade, QuizAttempt};
use crate::store::line_store::LineStore;
use crate::store::{DataFile, StorageBackend};
use chrono::Utc;
use log::info;
use rand::seq::SliceRandom;
use serde::Serialize;

pub const NO_ANSWER: &str = "(no answer)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
    pub answer: &'static str,
    /// Empty for free-text questions.
    pub choices: &'static [&'static str],
}

const fn text(id: u32, text: &'static str, answer: &'static str) -> Question {
    Question {
        id,
        text,
        answer,
        choices: &[],
    }
}

const fn choice(
    id: u32,
    text: &'static str,
    choices: &'static [&'static str],
    answer: &'static str,
) -> Question {
    Question {
        id,
        text,
        answer,
        choices,
    }
}

pub static QUESTIONS: [Question; 10] = [
    text(1, "What is the output of 2 ** 3?", "8"),
    text(2, "Which type is returned by input() ?", "string"),
    choice(3, "What keyword starts a loop in Python?", &["loop", "for", "repeat"], "for"),
    choice(4, "What method converts text to lowercase?", &["lower()", "down()", "small()"], "lower()"),
    choice(5, "Which structure uses key/value pairs?", &["list", "dict", "tuple"], "dict"),
    text(6, "What is the index of the first element in a list?", "0"),
    choice(7, "What keyword is used for conditions?", &["if", "cond", "check"], "if"),
    text(8, "len('Python') returns:", "6"),
    text(9, "What operator tests equality?", "=="),
    text(10, "What loop repeats while a condition is true?", "while"),
];

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Trimmed, case-insensitive comparison.
    pub fn accepts(&self, given: &str) -> bool {
        given.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

pub fn question(id: u32) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Up to `n` questions from the bank, in bank order unless shuffled.
pub fn select(n: usize, shuffle: bool) -> Vec<Question> {
    let mut pool: Vec<Question> = QUESTIONS.to_vec();
    if shuffle {
        pool.shuffle(&mut rand::thread_rng());
    }
    pool.truncate(n);
    pool
}

/// Percentage of correct answers rounded to one decimal; 0 with no questions.
pub fn score(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(correct as f64 / total as f64 * 100.0)
}

/// Grade `(question id, answer)` pairs. Unknown ids are rejected.
pub fn grade<S: AsRef<str>>(answers: &[(u32, S)], timestamp: String) -> Result<QuizAttempt> {
    let mut right = Vec::new();
    let mut wrong = Vec::new();
    for (id, given) in answers {
        let q = question(*id)
            .ok_or_else(|| TallyError::Validation(format!("unknown question id {}", id)))?;
        let given = given.as_ref().trim();
        let detail = AnswerDetail {
            question: q.text.to_string(),
            given: if given.is_empty() {
                NO_ANSWER.to_string()
            } else {
                given.to_string()
            },
            correct: Some(q.answer.to_string()),
        };
        if q.accepts(given) {
            right.push(detail);
        } else {
            wrong.push(detail);
        }
    }

    let correct = right.len() as u32;
    let total = answers.len() as u32;
    let score = score(correct, total);
    Ok(QuizAttempt {
        timestamp,
        score,
        grade: Grade::for_score(score),
        correct,
        total,
        wrong,
        right,
    })
}

/// UTC, second precision, `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn store<B: StorageBackend>(backend: &B) -> LineStore<'_, JsonLinesCodec<QuizAttempt>, B> {
    LineStore::new(JsonLinesCodec::new(), backend, DataFile::QuizResults)
}

pub fn questions(n: usize, shuffle: bool) -> CmdResult {
    CmdResult {
        questions: select(n, shuffle),
        ..CmdResult::default()
    }
}

/// Grade and append the attempt to the results file.
pub fn submit<B: StorageBackend, S: AsRef<str>>(
    backend: &B,
    answers: &[(u32, S)],
) -> Result<CmdResult> {
    if answers.is_empty() {
        return Err(TallyError::Validation("no answers given".into()));
    }
    let attempt = grade(answers, timestamp_now())?;
    store(backend).append(&attempt)?;
    info!("recorded quiz attempt: {} ({})", attempt.score, attempt.grade);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Score: {}/{} = {}% ({})",
        attempt.correct, attempt.total, attempt.score, attempt.grade
    )));
    result.attempts.push(attempt);
    Ok(result)
}

/// Every recorded attempt, newest first.
pub fn history<B: StorageBackend>(backend: &B, config: &TallyConfig) -> Result<CmdResult> {
    let loaded = store(backend).load_report(load_policy(config))?;
    let mut attempts = loaded.records;
    attempts.reverse();

    let mut result = CmdResult::default();
    result.note_skipped(DataFile::QuizResults.file_name(), loaded.skipped);
    if attempts.is_empty() {
        result.add_message(CmdMessage::info("No attempts yet."));
    }
    result.attempts = attempts;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn answers(right: usize) -> Vec<(u32, String)> {
        QUESTIONS
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let given = if i < right { q.answer.to_uppercase() } else { "nope".into() };
                (q.id, format!("  {} ", given))
            })
            .collect()
    }

    #[test]
    fn grade_thresholds() {
        let attempt = grade(&answers(7), "t".into()).unwrap();
        assert_eq!((attempt.correct, attempt.total), (7, 10));
        assert_eq!(attempt.score, 70.0);
        assert_eq!(attempt.grade, Grade::C);

        assert_eq!(grade(&answers(8), "t".into()).unwrap().grade, Grade::B);
        assert_eq!(grade(&answers(9), "t".into()).unwrap().grade, Grade::A);
        assert_eq!(grade(&answers(6), "t".into()).unwrap().grade, Grade::Fail);
    }

    #[test]
    fn score_rounds_to_one_decimal() {
        assert_eq!(score(2, 3), 66.7);
        assert_eq!(score(0, 0), 0.0);
    }

    #[test]
    fn blank_answers_are_recorded() {
        let attempt = grade(&[(1, "")], "t".into()).unwrap();
        assert_eq!(attempt.wrong[0].given, NO_ANSWER);
        assert_eq!(attempt.wrong[0].correct.as_deref(), Some("8"));
    }

    #[test]
    fn unknown_question_is_rejected() {
        assert!(matches!(
            grade(&[(42, "x")], "t".into()),
            Err(TallyError::Validation(_))
        ));
    }

    #[test]
    fn select_limits_and_keeps_order() {
        let picked = select(3, false);
        assert_eq!(picked.iter().map(|q| q.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(select(50, true).len(), 10);
        assert!(question(3).unwrap().is_multiple_choice());
    }

    #[test]
    fn history_is_newest_first() {
        let backend = MemBackend::new();
        submit(&backend, &[(1, "8")]).unwrap();
        submit(&backend, &[(1, "9")]).unwrap();

        let result = history(&backend, &TallyConfig::default()).unwrap();
        assert_eq!(result.attempts.len(), 2);
        assert_eq!(result.attempts[0].score, 0.0);
        assert_eq!(result.attempts[1].score, 100.0);
        assert!(result.attempts[0].timestamp.ends_with('Z'));
    }

    #[test]
    fn history_skips_damaged_lines() {
        let backend = MemBackend::new().with_file(
            DataFile::QuizResults,
            "{\"score\": 50.0, \"grade\": \"Fail\"}\n{broken\n",
        );
        let result = history(&backend, &TallyConfig::default()).unwrap();
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.attempts[0].total, 0);
    }
}
