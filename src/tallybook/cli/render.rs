//! # Rendering
//!
//! Turns `CmdResult` payloads into terminal text. Every `render_*` function
//! returns a `String` so output can be checked without a terminal; the
//! handlers in `commands.rs` print it.
//!
//! Column math uses display width, not byte or char counts, so names with
//! accents or CJK characters line up.

use chrono::{Local, NaiveDateTime};
use colored::*;
use std::fmt::Write as _;
use tallybook::aggregate::CompletionStats;
use tallybook::commands::{
    CmdMessage, ExpenseSummary, MessageLevel, Question, StudentSummary,
};
use tallybook::model::{Expense, QuizAttempt, Student, Task};
use tallybook::text::TextReport;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const NAME_WIDTH: usize = 24;
pub const NOTE_WIDTH: usize = 30;
pub const TIME_WIDTH: usize = 16;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

/// Truncate, then pad with spaces to exactly `width` columns.
pub fn fit(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let padding = width.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(padding))
}

pub fn money(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}

/// Row label: the record's position in its file, so it can be passed to
/// `remove`/`edit` whatever the filter or display order.
fn row_number(positions: &[usize], i: usize) -> usize {
    positions.get(i).copied().unwrap_or(i + 1)
}

pub fn render_expenses(expenses: &[Expense], positions: &[usize], currency: &str) -> String {
    let mut out = String::new();
    for (i, e) in expenses.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {:>14}  {} {}",
            row_number(positions, i),
            fit(&e.category, 14).bold(),
            money(e.amount, currency),
            fit(&e.note, NOTE_WIDTH),
            e.day.dimmed()
        );
    }
    out
}

pub fn render_expense_summary(summary: &ExpenseSummary, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total: {}  Count: {}  Average: {}",
        money(summary.total, currency).bold(),
        summary.count,
        money(summary.average, currency)
    );
    if let Some(biggest) = &summary.biggest {
        let _ = writeln!(
            out,
            "Biggest: {} ({})",
            money(biggest.amount, currency),
            biggest.category
        );
    }
    if !summary.by_category.is_empty() {
        let _ = writeln!(out, "By category:");
        for (category, amount) in &summary.by_category {
            let _ = writeln!(out, "  {} {:>14}", fit(category, 16), money(*amount, currency));
        }
    }
    out
}

pub fn render_students(students: &[Student], positions: &[usize]) -> String {
    let mut out = String::new();
    for (i, s) in students.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {} age {:>3}  grade {:>6}",
            row_number(positions, i),
            format!("#{:<4}", s.id).dimmed(),
            fit(&s.name, NAME_WIDTH),
            s.age,
            format!("{:.2}", s.grade)
        );
    }
    out
}

pub fn render_student_summary(summary: &StudentSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Students: {}  Average: {:.2}",
        summary.count, summary.average
    );
    if let Some(best) = &summary.best {
        let _ = writeln!(out, "Best: {} ({:.2})", best.name, best.grade);
    }
    if !summary.failing.is_empty() {
        let names: Vec<&str> = summary.failing.iter().map(|s| s.name.as_str()).collect();
        let _ = writeln!(
            out,
            "Below {}: {}",
            summary.threshold,
            names.join(", ").red()
        );
    }
    if !summary.by_age.is_empty() {
        let groups: Vec<String> = summary
            .by_age
            .iter()
            .map(|(age, count)| format!("{}: {}", age, count))
            .collect();
        let _ = writeln!(out, "By age: {}", groups.join(", "));
    }
    out
}

/// "3 hours ago" for a task's local creation time; empty when unparseable.
pub fn format_time_ago(created: &str) -> String {
    let Ok(then) = NaiveDateTime::parse_from_str(created, "%Y-%m-%dT%H:%M:%S") else {
        return String::new();
    };
    let duration = Local::now().naive_local().signed_duration_since(then);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}

pub fn render_tasks(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        let mark = if task.done { "[x]".green() } else { "[ ]".normal() };
        let title = fit(&task.title, 40);
        let title = if task.done { title.dimmed() } else { title.normal() };
        let _ = writeln!(
            out,
            "{} {} {} {:>width$}",
            mark,
            title,
            fit(&task.category, 12).cyan(),
            format_time_ago(&task.created).dimmed(),
            width = TIME_WIDTH
        );
    }
    out
}

pub fn render_stats(stats: &CompletionStats) -> String {
    format!(
        "{}/{} done ({:.1}%)\n",
        stats.done, stats.total, stats.percentage
    )
}

pub fn render_categories(categories: &[String]) -> String {
    categories.iter().map(|c| format!("{}\n", c)).collect()
}

pub fn render_questions(questions: &[Question]) -> String {
    let mut out = String::new();
    for q in questions {
        let _ = writeln!(out, "{} {}", format!("{:>2}.", q.id).yellow(), q.text);
        if q.is_multiple_choice() {
            let _ = writeln!(out, "    choices: {}", q.choices.join(" | ").dimmed());
        }
    }
    out
}

pub fn render_attempt(attempt: &QuizAttempt) -> String {
    let mut out = String::new();
    for detail in &attempt.wrong {
        let _ = writeln!(out, "{} {}", "✗".red(), detail.question);
        let _ = writeln!(
            out,
            "    given: {}  expected: {}",
            detail.given,
            detail.correct.as_deref().unwrap_or("?")
        );
    }
    for detail in &attempt.right {
        let _ = writeln!(out, "{} {}", "✓".green(), detail.question);
    }
    out
}

pub fn render_history(attempts: &[QuizAttempt]) -> String {
    let mut out = String::new();
    for a in attempts {
        let _ = writeln!(
            out,
            "{}  {:>5.1}%  {:<4}  {}/{}  wrong: {}",
            fit(&a.timestamp, 20).dimmed(),
            a.score,
            a.grade.to_string(),
            a.correct,
            a.total,
            a.wrong.len()
        );
    }
    out
}

pub fn render_text_report(report: &TextReport) -> String {
    let mut out = report.render();
    let _ = write!(
        out,
        "\nWords starting with a vowel: {}\nWords with 7+ letters: {}\n",
        report.vowel_start, report.long_words
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallybook::commands::expenses::summarize;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn truncates_by_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(fit("日本", 6).width(), 6);
    }

    #[test]
    fn expense_rows_are_numbered() {
        plain();
        let expenses = vec![Expense::new("food", 20.0, "lunch", "Monday").unwrap()];
        let out = render_expenses(&expenses, &[], "DH");
        assert!(out.starts_with("  1. food"));
        assert!(out.contains("20.00 DH"));
        assert!(out.contains("Monday"));
    }

    #[test]
    fn rows_show_file_positions() {
        plain();
        let expenses = vec![
            Expense::new("food", 20.0, "lunch", "Monday").unwrap(),
            Expense::new("food", 5.5, "snack", "Tuesday").unwrap(),
        ];
        let out = render_expenses(&expenses, &[1, 3], "DH");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("  1. food"));
        assert!(lines[1].starts_with("  3. food"));

        let students = vec![
            Student::new(2, "Bob", 18, 12.0).unwrap(),
            Student::new(1, "Ann", 18, 8.0).unwrap(),
        ];
        let out = render_students(&students, &[2, 1]);
        assert!(out.lines().next().unwrap().starts_with("  2. #2"));
    }

    #[test]
    fn expense_summary_lists_categories() {
        plain();
        let expenses = vec![
            Expense::new("food", 20.0, "", "Monday").unwrap(),
            Expense::new("rent", 300.0, "", "Friday").unwrap(),
        ];
        let out = render_expense_summary(&summarize(&expenses, &expenses), "DH");
        assert!(out.contains("Total: 320.00 DH"));
        assert!(out.contains("Biggest: 300.00 DH (rent)"));
        assert!(out.contains("By category:"));
    }

    #[test]
    fn unparseable_created_has_no_age() {
        assert_eq!(format_time_ago(""), "");
        assert!(!format_time_ago(&tallybook::model::now_iso()).is_empty());
    }

    #[test]
    fn stats_line() {
        let stats = CompletionStats {
            total: 4,
            done: 3,
            percentage: 75.0,
        };
        assert_eq!(render_stats(&stats), "3/4 done (75.0%)\n");
    }
}
