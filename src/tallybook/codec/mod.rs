//! # Line Codecs
//!
//! A codec turns one record into one line of text and back. Stores are built
//! on top of a [`LineCodec`] and never look inside the line themselves.
//!
//! Two families exist:
//!
//! - [`delimited`]: comma separated columns in a fixed, per-record order.
//!   Commas inside free-text fields are replaced with [`SUBSTITUTE`] before
//!   writing. The substitution is one-way: a note written as `a,b` reads back
//!   as `a;b`.
//! - [`jsonl`]: one self-contained JSON document per line, for records with
//!   nested fields (quiz attempts).
//!
//! Decoders report failures as [`TallyError::MalformedRecord`] with line `0`;
//! the store re-tags the error with the real line number.
//!
//! [`TallyError::MalformedRecord`]: crate::error::TallyError::MalformedRecord

use crate::error::Result;

pub mod delimited;
pub mod jsonl;

pub const DELIMITER: char = ',';
pub const SUBSTITUTE: char = ';';

pub trait LineCodec {
    type Record;

    /// Encode a record as a single line, without the trailing newline.
    fn encode(&self, record: &Self::Record) -> Result<String>;

    /// Decode a single line (already stripped of its line terminator).
    fn decode(&self, line: &str) -> Result<Self::Record>;
}

/// Make a free-text value safe for a delimited column.
///
/// Delimiters become [`SUBSTITUTE`]; line breaks become spaces since every
/// record must stay on one line.
pub fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            DELIMITER => SUBSTITUTE,
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}
