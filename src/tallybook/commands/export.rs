use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TallyError};
use crate::store::{DataFile, StorageBackend};
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Bundle every data file that exists into a `tar.gz` archive. Without a
/// destination the archive lands in the current directory.
pub fn run<B: StorageBackend>(backend: &B, dest: Option<PathBuf>) -> Result<CmdResult> {
    let files = collect_files(backend)?;

    if files.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("Nothing to export."));
        return Ok(res);
    }

    let dest = dest.unwrap_or_else(|| {
        PathBuf::from(format!(
            "tally-{}.tar.gz",
            Utc::now().format("%Y-%m-%d_%H-%M-%S")
        ))
    });
    let file = File::create(&dest).map_err(TallyError::Io)?;
    write_archive(file, &files)?;
    info!("exported {} files to {}", files.len(), dest.display());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} file(s) to {}",
        files.len(),
        dest.display()
    )));
    Ok(result.with_paths(vec![dest]))
}

fn collect_files<B: StorageBackend>(backend: &B) -> Result<Vec<(DataFile, String)>> {
    let mut files = Vec::new();
    for &file in DataFile::all() {
        if let Some(content) = backend.read(file)? {
            files.push((file, content));
        }
    }
    Ok(files)
}

fn write_archive<W: Write>(writer: W, files: &[(DataFile, String)]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for (file, content) in files {
        let entry_name = format!("tally/{}", file.file_name());

        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, content.as_bytes())
            .map_err(TallyError::Io)?;
    }

    tar.into_inner()
        .and_then(|enc| enc.finish())
        .map_err(TallyError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn only_existing_files_are_collected() {
        let backend = MemBackend::new()
            .with_file(DataFile::Expenses, "food,1.00,x,Monday\n")
            .with_file(DataFile::Tasks, "[]");
        let files = collect_files(&backend).unwrap();
        assert_eq!(
            files.iter().map(|(f, _)| *f).collect::<Vec<_>>(),
            vec![DataFile::Expenses, DataFile::Tasks]
        );
    }

    #[test]
    fn empty_store_exports_nothing() {
        let result = run(&MemBackend::new(), None).unwrap();
        assert!(result.paths.is_empty());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn archive_contains_each_file() {
        let files = vec![(DataFile::Students, "1,Ann,18,8.0\n".to_string())];
        let mut buf = Vec::new();
        write_archive(&mut buf, &files).unwrap();
        assert_eq!(&buf[..2], &[0x1f, 0x8b]);

        let mut archive = tar::Archive::new(GzDecoder::new(&buf[..]));
        let mut entries = archive.entries().unwrap();
        let mut entry = entries.next().unwrap().unwrap();
        assert_eq!(
            entry.path().unwrap().to_string_lossy(),
            "tally/students.txt"
        );
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "1,Ann,18,8.0\n");
    }

    #[test]
    fn writes_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("backup.tar.gz");
        let backend = MemBackend::new().with_file(DataFile::Report, "Total words: 0");
        let result = run(&backend, Some(dest.clone())).unwrap();
        assert_eq!(result.paths, vec![dest.clone()]);
        assert!(dest.exists());
    }
}
