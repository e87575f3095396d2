use super::backend::StorageBackend;
use super::{DataFile, LoadPolicy, Loaded};
use crate::codec::LineCodec;
use crate::error::Result;
use log::{debug, warn};

/// A file holding one encoded record per line.
pub struct LineStore<'a, C, B> {
    codec: C,
    backend: &'a B,
    file: DataFile,
}

impl<'a, C: LineCodec, B: StorageBackend> LineStore<'a, C, B> {
    pub fn new(codec: C, backend: &'a B, file: DataFile) -> Self {
        Self {
            codec,
            backend,
            file,
        }
    }

    /// Read every record. A missing file is an empty collection.
    pub fn load(&self, policy: LoadPolicy) -> Result<Vec<C::Record>> {
        Ok(self.load_report(policy)?.records)
    }

    /// Like [`load`](Self::load), also reporting how many lines were dropped.
    pub fn load_report(&self, policy: LoadPolicy) -> Result<Loaded<C::Record>> {
        let Some(content) = self.backend.read(self.file)? else {
            debug!("{} does not exist yet", self.file.file_name());
            return Ok(Loaded {
                records: Vec::new(),
                skipped: 0,
            });
        };

        let loaded = decode_lines(&self.codec, &content, policy, self.file.file_name())?;
        debug!(
            "loaded {} records from {} ({} skipped)",
            loaded.records.len(),
            self.file.file_name(),
            loaded.skipped
        );
        Ok(loaded)
    }

    /// Overwrite the file with the given records.
    pub fn save(&self, records: &[C::Record]) -> Result<()> {
        let mut out = String::new();
        for record in records {
            out.push_str(&self.codec.encode(record)?);
            out.push('\n');
        }
        self.backend.write(self.file, &out)?;
        debug!("saved {} records to {}", records.len(), self.file.file_name());
        Ok(())
    }

    /// Add one record to the end of the file without rewriting it.
    pub fn append(&self, record: &C::Record) -> Result<()> {
        let mut line = self.codec.encode(record)?;
        line.push('\n');
        self.backend.append(self.file, &line)
    }
}

/// Decode every non-blank line of `content`. `source` names the input in
/// warnings. Under [`LoadPolicy::Strict`] the first bad line is returned as
/// an error carrying its 1-based line number.
pub fn decode_lines<C: LineCodec>(
    codec: &C,
    content: &str,
    policy: LoadPolicy,
    source: &str,
) -> Result<Loaded<C::Record>> {
    let mut records = Vec::new();
    let mut skipped = 0;
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match codec.decode(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                let e = e.at_line(i + 1);
                if policy == LoadPolicy::Strict {
                    return Err(e);
                }
                warn!("{}: skipping line: {}", source, e);
                skipped += 1;
            }
        }
    }
    Ok(Loaded { records, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::total;
    use crate::codec::delimited::{ExpenseCodec, StudentCodec};
    use crate::error::TallyError;
    use crate::model::{Expense, Student};
    use crate::store::mem_backend::MemBackend;

    fn expense_store(backend: &MemBackend) -> LineStore<'_, ExpenseCodec, MemBackend> {
        LineStore::new(ExpenseCodec, backend, DataFile::Expenses)
    }

    #[test]
    fn missing_file_loads_empty() {
        let backend = MemBackend::new();
        let records = expense_store(&backend).load(LoadPolicy::Strict).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn loads_sanitized_expense_lines() {
        let backend = MemBackend::new().with_file(
            DataFile::Expenses,
            "food,20.00,lunch,Monday\ntransport,10.00,;taxi,Monday\n",
        );
        let records = expense_store(&backend).load(LoadPolicy::Lenient).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 20.0);
        assert_eq!(records[1].amount, 10.0);
        assert_eq!(records[1].note, ";taxi");
        assert_eq!(total(&records, |e: &Expense| e.amount), 30.0);
    }

    #[test]
    fn lenient_load_skips_bad_lines() {
        let backend = MemBackend::new().with_file(
            DataFile::Expenses,
            "food,20.00,lunch,Monday\nbroken\n\nfood,abc,x,Monday\nrent,300,,Friday\n",
        );
        let loaded = expense_store(&backend)
            .load_report(LoadPolicy::Lenient)
            .unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.skipped, 2);
    }

    #[test]
    fn strict_load_fails_with_line_number() {
        let backend = MemBackend::new().with_file(
            DataFile::Expenses,
            "food,20.00,lunch,Monday\nbroken\n",
        );
        let err = expense_store(&backend)
            .load(LoadPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, TallyError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn decode_lines_numbers_bad_lines_from_one() {
        let content = "food,1.00,x,Monday\n\nbad\n";
        let loaded = decode_lines(&ExpenseCodec, content, LoadPolicy::Lenient, "input").unwrap();
        assert_eq!((loaded.records.len(), loaded.skipped), (1, 1));

        let err = decode_lines(&ExpenseCodec, content, LoadPolicy::Strict, "input").unwrap_err();
        assert!(matches!(err, TallyError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn load_is_idempotent() {
        let backend = MemBackend::new().with_file(
            DataFile::Students,
            "1,Ann,18,8.0\n2,Bob,18,12.0\n3,Cid,20,5.0\n",
        );
        let store = LineStore::new(StudentCodec, &backend, DataFile::Students);
        let first = store.load(LoadPolicy::Lenient).unwrap();
        let second = store.load(LoadPolicy::Lenient).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let backend = MemBackend::new();
        let store = LineStore::new(StudentCodec, &backend, DataFile::Students);
        let students = vec![
            Student {
                id: 1,
                name: "Ann".into(),
                age: 18,
                grade: 8.5,
            },
            Student {
                id: 2,
                name: "Bob".into(),
                age: 19,
                grade: 12.0,
            },
        ];
        store.save(&students).unwrap();
        assert_eq!(
            backend.contents(DataFile::Students).as_deref(),
            Some("1,Ann,18,8.5\n2,Bob,19,12.0\n")
        );
        assert_eq!(store.load(LoadPolicy::Strict).unwrap(), students);
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let backend =
            MemBackend::new().with_file(DataFile::Expenses, "old,1.00,x,Monday\n");
        let store = expense_store(&backend);
        store.save(&[]).unwrap();
        assert_eq!(backend.contents(DataFile::Expenses).as_deref(), Some(""));
    }
}
