use crate::aggregate::{average, count_by, extremum, round2, Extremum};
use crate::codec::delimited::StudentCodec;
use crate::codec::LineCodec;
use crate::commands::{load_policy, CmdMessage, CmdResult};
use crate::config::TallyConfig;
use crate::error::{Result, TallyError};
use crate::model::Student;
use crate::store::line_store::LineStore;
use crate::store::{DataFile, StorageBackend};
use chrono::Local;
use log::info;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const CSV_HEADER: &str = "id,name,age,grade";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSort {
    /// Highest grade first.
    Grade,
    /// Alphabetical, ignoring case.
    Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub count: usize,
    /// Rounded to two decimals.
    pub average: f64,
    pub best: Option<Student>,
    pub threshold: f64,
    pub failing: Vec<Student>,
    pub by_age: BTreeMap<u32, usize>,
}

fn store<B: StorageBackend>(backend: &B) -> LineStore<'_, StudentCodec, B> {
    LineStore::new(StudentCodec, backend, DataFile::Students)
}

/// Next id: one past the largest id on file, 1 when empty.
pub fn next_id(students: &[Student]) -> Result<u32> {
    match students.iter().map(|s| s.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| TallyError::Validation(format!("no student id left after {}", max))),
    }
}

pub fn summarize(students: &[Student], threshold: f64) -> StudentSummary {
    let grade = |s: &Student| s.grade;
    StudentSummary {
        count: students.len(),
        average: round2(average(students, grade)),
        best: extremum(students, grade, Extremum::Max).cloned(),
        threshold,
        failing: students
            .iter()
            .filter(|s| s.grade < threshold)
            .cloned()
            .collect(),
        by_age: count_by(students, |s| s.age),
    }
}

fn student_order(by: StudentSort, a: &Student, b: &Student) -> Ordering {
    match by {
        StudentSort::Grade => b.grade.total_cmp(&a.grade),
        StudentSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

/// Stable sort in place.
pub fn sort_students(students: &mut [Student], by: StudentSort) {
    students.sort_by(|a, b| student_order(by, a, b));
}

/// CSV report with a header row.
pub fn render_csv(students: &[Student]) -> Result<String> {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for student in students {
        out.push_str(&StudentCodec.encode(student)?);
        out.push('\n');
    }
    Ok(out)
}

fn parse_age(raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| TallyError::Validation(format!("age must be a whole number, got '{}'", raw)))
}

fn parse_grade(raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| TallyError::Validation(format!("grade must be a number, got '{}'", raw)))
}

fn position_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        return Err(TallyError::NotFound(format!("student #{}", position)));
    }
    Ok(position - 1)
}

pub fn add<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    name: &str,
    age: &str,
    grade: &str,
) -> Result<CmdResult> {
    let store = store(backend);
    let mut students = store.load(load_policy(config))?;

    let student = Student::new(next_id(&students)?, name, parse_age(age)?, parse_grade(grade)?)?;
    students.push(student.clone());
    store.save(&students)?;
    info!("added student {} ({})", student.id, student.name);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added student #{}: {}",
        student.id, student.name
    )));
    Ok(result.with_students(vec![student]))
}

pub fn list<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    sort: Option<StudentSort>,
) -> Result<CmdResult> {
    let loaded = store(backend).load_report(load_policy(config))?;
    let students = loaded.records;

    let mut result = CmdResult::default();
    result.note_skipped(DataFile::Students.file_name(), loaded.skipped);
    if students.is_empty() {
        result.add_message(CmdMessage::info("No students yet."));
    }
    result.student_summary = Some(summarize(&students, config.fail_threshold));

    // Display order may differ from file order; positions keep pointing
    // at the file.
    let mut rows: Vec<(usize, Student)> = students
        .into_iter()
        .enumerate()
        .map(|(i, s)| (i + 1, s))
        .collect();
    if let Some(by) = sort {
        rows.sort_by(|(_, a), (_, b)| student_order(by, a, b));
    }
    let (positions, students): (Vec<usize>, Vec<Student>) = rows.into_iter().unzip();
    result.positions = positions;
    Ok(result.with_students(students))
}

/// Replace the given fields of the student at a 1-based position.
pub fn edit<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    position: usize,
    name: Option<&str>,
    age: Option<&str>,
    grade: Option<&str>,
) -> Result<CmdResult> {
    if name.is_none() && age.is_none() && grade.is_none() {
        return Err(TallyError::Validation("nothing to change".into()));
    }
    let store = store(backend);
    let mut students = store.load(load_policy(config))?;
    let idx = position_index(position, students.len())?;

    let current = &students[idx];
    let updated = Student::new(
        current.id,
        name.unwrap_or(&current.name),
        age.map(parse_age).transpose()?.unwrap_or(current.age),
        grade.map(parse_grade).transpose()?.unwrap_or(current.grade),
    )?;
    students[idx] = updated.clone();
    store.save(&students)?;
    info!("edited student {}", updated.id);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Updated student #{}: {}",
        updated.id, updated.name
    )));
    Ok(result.with_students(vec![updated]))
}

pub fn remove<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    position: usize,
) -> Result<CmdResult> {
    let store = store(backend);
    let mut students = store.load(load_policy(config))?;
    let idx = position_index(position, students.len())?;

    let removed = students.remove(idx);
    store.save(&students)?;
    info!("removed student {}", removed.id);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Removed student #{}: {}",
        removed.id, removed.name
    )));
    Ok(result.with_students(vec![removed]))
}

/// Reorder the file itself.
pub fn sort<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    by: StudentSort,
) -> Result<CmdResult> {
    let store = store(backend);
    let mut students = store.load(load_policy(config))?;
    sort_students(&mut students, by);
    store.save(&students)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(match by {
        StudentSort::Grade => "Sorted students by grade.",
        StudentSort::Name => "Sorted students by name.",
    }));
    Ok(result.with_students(students))
}

pub fn clear<B: StorageBackend>(backend: &B) -> Result<CmdResult> {
    store(backend).save(&[])?;
    info!("cleared students");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("All students removed."));
    Ok(result)
}

/// Write a CSV report. Without a destination the file lands in the current
/// directory as `students_report_YYYYmmdd_HHMMSS.csv`.
pub fn export_csv<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    dest: Option<PathBuf>,
) -> Result<CmdResult> {
    let students = store(backend).load(load_policy(config))?;
    let dest = dest.unwrap_or_else(|| {
        PathBuf::from(format!(
            "students_report_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    fs::write(&dest, render_csv(&students)?)?;
    info!("exported {} students to {}", students.len(), dest.display());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} student(s) to {}",
        students.len(),
        dest.display()
    )));
    Ok(result.with_paths(vec![dest]))
}
