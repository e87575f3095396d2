//! Word frequency and small text statistics.
//!
//! Text is normalized before counting: lowercased, diacritics stripped
//! (`é` → `e`), every character other than `a-z`, `0-9` and `'` turned into a
//! space, then split on whitespace. `"L'Été, déjà!"` yields `["l'ete", "deja"]`.

use crate::aggregate::{extremum, Extremum};
use crate::model::WordCount;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const FRENCH: &[&str] = &[
    "le", "la", "les", "de", "des", "un", "une", "et", "du", "en", "a", "au", "aux", "ce", "ces",
    "dans", "par", "pour", "sur", "est", "qui", "se", "sont", "il", "elle", "je", "tu", "nous",
    "vous", "ne", "pas", "mais", "ou", "avec", "donc", "or", "ni", "car", "l", "d", "s", "c",
];

static FRENCH_STOPWORDS: Lazy<HashSet<String>> =
    Lazy::new(|| FRENCH.iter().map(|w| w.to_string()).collect());

/// Words left out of frequency rankings.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn none() -> Self {
        Self::default()
    }

    /// The built-in minimal French list.
    pub fn french() -> Self {
        Self {
            words: FRENCH_STOPWORDS.clone(),
        }
    }

    /// Custom list; entries are normalized like the text they filter.
    pub fn from_list<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .flat_map(|w| tokenize(w.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

fn strip_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercase, strip accents, blank out everything but `[a-z0-9']`, and
/// collapse runs of whitespace.
pub fn normalize(text: &str) -> String {
    let stripped = strip_diacritics(&text.to_lowercase());
    let replaced: String = stripped
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn ranked(counts: HashMap<String, usize>, top_n: usize) -> Vec<WordCount> {
    let mut entries: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    entries.truncate(top_n);
    entries
}

fn count_words<'a>(words: impl Iterator<Item = &'a String>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for w in words {
        *counts.entry(w.clone()).or_insert(0) += 1;
    }
    counts
}

/// Most frequent words, highest count first, ties broken alphabetically.
pub fn word_frequency(text: &str, stopwords: &StopWords, top_n: usize) -> Vec<WordCount> {
    let words = tokenize(text);
    ranked(
        count_words(words.iter().filter(|w| !stopwords.contains(w))),
        top_n,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextReport {
    pub total_words: usize,
    pub unique_words: usize,
    pub top: Vec<WordCount>,
    pub longest: String,
    pub shortest: String,
    pub vowel_start: usize,
    pub long_words: usize,
}

/// Words of at least this many characters count as long.
pub const LONG_WORD_LEN: usize = 7;

/// Full statistics for a text. Totals, uniqueness and longest/shortest
/// consider every word; only the top list drops stop words.
pub fn analyze_text(text: &str, stopwords: &StopWords, top_n: usize) -> TextReport {
    let words = tokenize(text);
    let unique: HashSet<&String> = words.iter().collect();
    let length = |w: &String| w.chars().count() as f64;

    TextReport {
        total_words: words.len(),
        unique_words: unique.len(),
        top: ranked(
            count_words(words.iter().filter(|w| !stopwords.contains(w))),
            top_n,
        ),
        longest: extremum(&words, length, Extremum::Max)
            .cloned()
            .unwrap_or_default(),
        shortest: extremum(&words, length, Extremum::Min)
            .cloned()
            .unwrap_or_default(),
        vowel_start: words
            .iter()
            .filter(|w| w.starts_with(['a', 'e', 'i', 'o', 'u']))
            .count(),
        long_words: words
            .iter()
            .filter(|w| w.chars().count() >= LONG_WORD_LEN)
            .count(),
    }
}

impl TextReport {
    /// Plain-text report as written to `report.txt`.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Total words: {}", self.total_words),
            format!("Unique words: {}", self.unique_words),
            String::new(),
            "Top words:".to_string(),
        ];
        lines.extend(self.top.iter().map(|wc| format!("{}: {}", wc.word, wc.count)));
        lines.push(String::new());
        lines.push(format!("Longest word: {}", self.longest));
        lines.push(format!("Shortest word: {}", self.shortest));
        lines.join("\n")
    }
}
