use crate::commands::{CmdMessage, CmdResult};
use crate::config::TallyConfig;
use crate::error::{Result, TallyError};
use crate::store::{DataFile, StorageBackend};
use crate::text::analyze_text;
use log::info;
use std::fs;
use std::path::Path;

/// Where the text to analyze comes from.
#[derive(Debug, Clone, Copy)]
pub enum TextSource<'a> {
    Inline(&'a str),
    File(&'a Path),
}

impl TextSource<'_> {
    fn read(&self) -> Result<String> {
        match self {
            TextSource::Inline(text) => Ok(text.to_string()),
            TextSource::File(path) => fs::read_to_string(path).map_err(|e| {
                TallyError::Validation(format!("cannot read {}: {}", path.display(), e))
            }),
        }
    }
}

/// Analyze the text and optionally save the rendered report to `report.txt`.
pub fn analyze<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    source: TextSource<'_>,
    top_n: Option<usize>,
    write_report: bool,
) -> Result<CmdResult> {
    let text = source.read()?;
    let report = analyze_text(&text, &config.stopwords(), top_n.unwrap_or(config.top_n));

    let mut result = CmdResult::default();
    if report.total_words == 0 {
        result.add_message(CmdMessage::warning("No words found."));
    }
    if write_report {
        backend.write(DataFile::Report, &report.render())?;
        let path = backend.path(DataFile::Report);
        info!("wrote text report to {}", path.display());
        result.add_message(CmdMessage::success(format!(
            "Report written to {}",
            path.display()
        )));
        result.paths.push(path);
    }
    result.text_report = Some(report);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn inline_text_without_report() {
        let backend = MemBackend::new();
        let result = analyze(
            &backend,
            &TallyConfig::default(),
            TextSource::Inline("Le chat mange le chat"),
            None,
            false,
        )
        .unwrap();
        let report = result.text_report.unwrap();
        assert_eq!(report.top[0].word, "chat");
        assert_eq!(report.top[0].count, 2);
        assert_eq!(backend.contents(DataFile::Report), None);
    }

    #[test]
    fn report_is_written() {
        let backend = MemBackend::new();
        let result = analyze(
            &backend,
            &TallyConfig::default(),
            TextSource::Inline("un deux trois"),
            Some(1),
            true,
        )
        .unwrap();
        assert_eq!(result.text_report.as_ref().unwrap().top.len(), 1);
        let written = backend.contents(DataFile::Report).unwrap();
        assert!(written.starts_with("Total words: 3\n"));
    }

    #[test]
    fn custom_stopwords_from_config() {
        let mut config = TallyConfig::default();
        config.set("stopwords", "chat").unwrap();
        let result = analyze(
            &MemBackend::new(),
            &config,
            TextSource::Inline("Le chat mange le chat"),
            None,
            false,
        )
        .unwrap();
        let top: Vec<String> = result
            .text_report
            .unwrap()
            .top
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(top, vec!["le", "mange"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = analyze(
            &MemBackend::new(),
            &TallyConfig::default(),
            TextSource::File(Path::new("/definitely/not/here.txt")),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
    }
}
