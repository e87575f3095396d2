use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    /// A stored line could not be decoded. `line` is 1-based.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl TallyError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        TallyError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Re-tag a malformed record error with its position in the file.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            TallyError::MalformedRecord { reason, .. } => TallyError::MalformedRecord { line, reason },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
