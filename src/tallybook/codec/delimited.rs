use super::{sanitize_field, LineCodec, DELIMITER};
use crate::error::{Result, TallyError};
use crate::model::{Expense, Student, Task};

/// `category,amount,note,day`
///
/// The amount is written with two decimals. Lines with more than four fields
/// come from data written before notes were sanitized: everything between the
/// amount and the last field is the note.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpenseCodec;

impl LineCodec for ExpenseCodec {
    type Record = Expense;

    fn encode(&self, e: &Expense) -> Result<String> {
        Ok(format!(
            "{},{:.2},{},{}",
            sanitize_field(&e.category),
            e.amount,
            sanitize_field(&e.note),
            sanitize_field(&e.day)
        ))
    }

    fn decode(&self, line: &str) -> Result<Expense> {
        let parts: Vec<&str> = line.split(DELIMITER).collect();
        if parts.len() < 4 {
            return Err(TallyError::malformed(
                0,
                format!("expected 4 fields, found {}", parts.len()),
            ));
        }
        let amount = parse_f64(parts[1], "amount")?;
        let last = parts.len() - 1;
        let note = if parts.len() > 4 {
            parts[2..last].join(",")
        } else {
            parts[2].to_string()
        };
        Ok(Expense {
            category: parts[0].to_string(),
            amount,
            note,
            day: parts[last].to_string(),
        })
    }
}

/// `id,name,age,grade`, quoted the way a standard CSV writer quotes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StudentCodec;

impl LineCodec for StudentCodec {
    type Record = Student;

    fn encode(&self, s: &Student) -> Result<String> {
        Ok(format!(
            "{},{},{},{:?}",
            s.id,
            csv_quote(&s.name.replace(['\n', '\r'], " ")),
            s.age,
            s.grade
        ))
    }

    fn decode(&self, line: &str) -> Result<Student> {
        let fields = split_csv_record(line)?;
        if fields.len() != 4 {
            return Err(TallyError::malformed(
                0,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        }
        Ok(Student {
            id: parse_u32(&fields[0], "id")?,
            name: fields[1].clone(),
            age: parse_u32(&fields[2], "age")?,
            grade: parse_f64(&fields[3], "grade")?,
        })
    }
}

/// `title,category,done` as written by the console to-do tracker, with
/// `done` spelled `True`/`False`. The creation time is not part of the line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskLineCodec;

impl LineCodec for TaskLineCodec {
    type Record = Task;

    fn encode(&self, t: &Task) -> Result<String> {
        Ok(format!(
            "{},{},{}",
            sanitize_field(&t.title),
            sanitize_field(&t.category),
            if t.done { "True" } else { "False" }
        ))
    }

    fn decode(&self, line: &str) -> Result<Task> {
        let parts: Vec<&str> = line.split(DELIMITER).collect();
        if parts.len() < 3 {
            return Err(TallyError::malformed(
                0,
                format!("expected 3 fields, found {}", parts.len()),
            ));
        }
        let last = parts.len() - 1;
        let done = match parts[last].trim().to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(TallyError::malformed(
                    0,
                    format!("done must be True or False, got '{other}'"),
                ))
            }
        };
        let title = parts[0].trim();
        if title.is_empty() {
            return Err(TallyError::malformed(0, "empty title"));
        }
        Ok(Task {
            title: title.to_string(),
            category: parts[1..last].join(",").trim().to_string(),
            done,
            created: String::new(),
        })
    }
}

fn parse_f64(raw: &str, field: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TallyError::malformed(
            0,
            format!("{field} is not a number: '{raw}'"),
        )),
    }
}

fn parse_u32(raw: &str, field: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        TallyError::malformed(0, format!("{field} is not a whole number: '{raw}'"))
    })
}

fn csv_quote(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split one CSV line into fields, honouring double-quoted fields with `""`
/// escapes.
fn split_csv_record(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => current.push(other),
            }
        } else {
            match c {
                '"' if current.is_empty() => in_quotes = true,
                DELIMITER => fields.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
    }
    if in_quotes {
        return Err(TallyError::malformed(0, "unterminated quoted field"));
    }
    fields.push(current);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, amount: f64, note: &str, day: &str) -> Expense {
        Expense {
            category: category.into(),
            amount,
            note: note.into(),
            day: day.into(),
        }
    }

    #[test]
    fn expense_encodes_two_decimals_and_substitutes_commas() {
        let line = ExpenseCodec
            .encode(&expense("transport", 10.0, ",taxi", "Monday"))
            .unwrap();
        assert_eq!(line, "transport,10.00,;taxi,Monday");
    }

    #[test]
    fn expense_roundtrip_without_delimiters() {
        let e = expense("food", 20.5, "lunch with Sam", "2025-03-01");
        let line = ExpenseCodec.encode(&e).unwrap();
        assert_eq!(ExpenseCodec.decode(&line).unwrap(), e);
    }

    #[test]
    fn expense_substitution_is_one_way() {
        let e = expense("food", 5.0, "bread, milk", "Monday");
        let back = ExpenseCodec
            .decode(&ExpenseCodec.encode(&e).unwrap())
            .unwrap();
        assert_eq!(back.note, "bread; milk");
    }

    #[test]
    fn expense_legacy_note_spans_middle_fields() {
        let e = ExpenseCodec
            .decode("food,7.5,bread,milk,eggs,Tuesday")
            .unwrap();
        assert_eq!(e.note, "bread,milk,eggs");
        assert_eq!(e.day, "Tuesday");
        assert_eq!(e.amount, 7.5);
    }

    #[test]
    fn expense_rejects_short_or_non_numeric_lines() {
        assert!(matches!(
            ExpenseCodec.decode("food,20.00,lunch"),
            Err(TallyError::MalformedRecord { .. })
        ));
        assert!(matches!(
            ExpenseCodec.decode("food,twenty,lunch,Monday"),
            Err(TallyError::MalformedRecord { .. })
        ));
        assert!(ExpenseCodec.decode("food,NaN,lunch,Monday").is_err());
    }

    #[test]
    fn student_quotes_names_with_commas() {
        let s = Student {
            id: 3,
            name: "Doe, \"JD\" John".into(),
            age: 21,
            grade: 12.0,
        };
        let line = StudentCodec.encode(&s).unwrap();
        assert_eq!(line, "3,\"Doe, \"\"JD\"\" John\",21,12.0");
        assert_eq!(StudentCodec.decode(&line).unwrap(), s);
    }

    #[test]
    fn student_line_never_spans_two_lines() {
        let s = Student {
            id: 1,
            name: "Ann\nMarie".into(),
            age: 18,
            grade: 12.0,
        };
        let line = StudentCodec.encode(&s).unwrap();
        assert_eq!(line.lines().count(), 1);
        assert_eq!(StudentCodec.decode(&line).unwrap().name, "Ann Marie");
    }

    #[test]
    fn student_decode_requires_numeric_fields() {
        assert!(StudentCodec.decode("x,Ann,18,12.0").is_err());
        assert!(StudentCodec.decode("1,Ann,eighteen,12.0").is_err());
        assert!(StudentCodec.decode("1,Ann,18").is_err());
        assert!(StudentCodec.decode("1,\"Ann,18,12.0").is_err());
    }

    #[test]
    fn task_line_roundtrip_and_legacy_booleans() {
        let t = Task {
            title: "Read".into(),
            category: "study".into(),
            done: true,
            created: String::new(),
        };
        let line = TaskLineCodec.encode(&t).unwrap();
        assert_eq!(line, "Read,study,True");
        assert_eq!(TaskLineCodec.decode(&line).unwrap(), t);
        assert!(TaskLineCodec.decode("Read,study,maybe").is_err());
    }
}
