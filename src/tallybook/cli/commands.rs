use super::render::{
    print_messages, render_attempt, render_categories, render_expense_summary, render_expenses,
    render_history, render_questions, render_stats, render_student_summary, render_students,
    render_tasks, render_text_report,
};
use super::setup::{
    Cli, Commands, ExpenseCommands, QuizCommands, SortKey, StatusArg, StudentCommands,
    TaskCommands,
};
use clap::Parser;
use directories::ProjectDirs;
use log::warn;
use std::fs;
use std::path::PathBuf;
use tallybook::api::{TallyApi, TextSource};
use tallybook::commands::{CmdResult, ExpenseFilter, StatusFilter, StudentSort};
use tallybook::config::TallyConfig;
use tallybook::error::{Result, TallyError};
use tallybook::logging::init_logging;
use tallybook::store::fs_backend::FsBackend;

struct AppContext {
    api: TallyApi<FsBackend>,
}

impl AppContext {
    fn currency(&self) -> &str {
        &self.api.config().currency
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Warning: {}", e);
    }
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Expense(cmd) => handle_expense(&ctx, cmd),
        Commands::Student(cmd) => handle_student(&ctx, cmd),
        Commands::Task(cmd) => handle_task(&ctx, cmd),
        Commands::Quiz(cmd) => handle_quiz(&ctx, cmd),
        Commands::Text {
            text,
            file,
            top,
            report,
        } => handle_text(&ctx, text, file, top, report),
        Commands::Export { path } => {
            let result = ctx.api.export_all(path)?;
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Paths => {
            for path in &ctx.api.paths().paths {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
    }
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    ProjectDirs::from("com", "tallybook", "tallybook")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            TallyError::Config("could not determine a data directory; pass --data-dir".into())
        })
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let root = data_dir(cli)?;
    let config = TallyConfig::load(&root).unwrap_or_else(|e| {
        warn!("ignoring unreadable config: {}", e);
        TallyConfig::default()
    });

    let backend = FsBackend::new(root.clone());
    let mut api = TallyApi::new(backend, config, root);
    api.set_strict(cli.strict);
    Ok(AppContext { api })
}

fn handle_expense(ctx: &AppContext, cmd: ExpenseCommands) -> Result<()> {
    let currency = ctx.currency();
    match cmd {
        ExpenseCommands::Add {
            category,
            amount,
            note,
            day,
        } => {
            let result = ctx.api.add_expense(&category, &amount, &note, &day)?;
            print_messages(&result.messages);
        }
        ExpenseCommands::List { category, day } => {
            let result = ctx.api.list_expenses(&ExpenseFilter::new(category, day))?;
            print!(
                "{}",
                render_expenses(&result.expenses, &result.positions, currency)
            );
            if let Some(summary) = &result.expense_summary {
                if !result.expenses.is_empty() {
                    println!();
                }
                print!("{}", render_expense_summary(summary, currency));
            }
            print_messages(&result.messages);
        }
        ExpenseCommands::Summary { category, day } => {
            let result = ctx.api.list_expenses(&ExpenseFilter::new(category, day))?;
            if let Some(summary) = &result.expense_summary {
                print!("{}", render_expense_summary(summary, currency));
                if !summary.categories.is_empty() {
                    println!("Categories: {}", summary.categories.join(", "));
                }
            }
            print_messages(&result.messages);
        }
        ExpenseCommands::Remove { position } => {
            let result = ctx.api.remove_expense(position)?;
            print_messages(&result.messages);
        }
    }
    Ok(())
}

fn student_sort(key: SortKey) -> StudentSort {
    match key {
        SortKey::Grade => StudentSort::Grade,
        SortKey::Name => StudentSort::Name,
    }
}

fn handle_student(ctx: &AppContext, cmd: StudentCommands) -> Result<()> {
    let result = match cmd {
        StudentCommands::Add { name, age, grade } => ctx.api.add_student(&name, &age, &grade)?,
        StudentCommands::List { sort } => {
            let result = ctx.api.list_students(sort.map(student_sort))?;
            print!("{}", render_students(&result.students, &result.positions));
            if let Some(summary) = &result.student_summary {
                if summary.count > 0 {
                    println!();
                    print!("{}", render_student_summary(summary));
                }
            }
            result
        }
        StudentCommands::Summary => {
            let result = ctx.api.list_students(None)?;
            if let Some(summary) = &result.student_summary {
                print!("{}", render_student_summary(summary));
            }
            result
        }
        StudentCommands::Edit {
            position,
            name,
            age,
            grade,
        } => ctx.api.edit_student(
            position,
            name.as_deref(),
            age.as_deref(),
            grade.as_deref(),
        )?,
        StudentCommands::Remove { position } => ctx.api.remove_student(position)?,
        StudentCommands::Sort { by } => ctx.api.sort_students(student_sort(by))?,
        StudentCommands::Clear => ctx.api.clear_students()?,
        StudentCommands::Export { path } => ctx.api.export_students(path)?,
    };
    print_messages(&result.messages);
    Ok(())
}

fn status_filter(status: StatusArg) -> StatusFilter {
    match status {
        StatusArg::All => StatusFilter::All,
        StatusArg::Done => StatusFilter::Done,
        StatusArg::Todo => StatusFilter::Todo,
    }
}

fn toggle(ctx: &AppContext, titles: &[String], done: bool) -> Result<CmdResult> {
    match titles {
        [title] => ctx.api.toggle_task(title, done),
        _ => ctx.api.toggle_tasks(titles, done),
    }
}

fn handle_task(ctx: &AppContext, cmd: TaskCommands) -> Result<()> {
    let result = match cmd {
        TaskCommands::Add { title, category } => ctx.api.add_task(&title, &category)?,
        TaskCommands::List { category, status } => {
            let result = ctx
                .api
                .list_tasks(category.as_deref(), status_filter(status))?;
            print!("{}", render_tasks(&result.tasks));
            if let Some(stats) = &result.task_stats {
                if stats.total > 0 {
                    print!("{}", render_stats(stats));
                }
            }
            result
        }
        TaskCommands::Edit {
            title,
            new_title,
            new_category,
        } => ctx
            .api
            .edit_task(&title, new_title.as_deref(), new_category.as_deref())?,
        TaskCommands::Done { titles } => toggle(ctx, &titles, true)?,
        TaskCommands::Undo { titles } => toggle(ctx, &titles, false)?,
        TaskCommands::Remove { title } => ctx.api.remove_task(&title)?,
        TaskCommands::Stats => {
            let result = ctx.api.list_tasks(None, StatusFilter::All)?;
            if let Some(stats) = &result.task_stats {
                print!("{}", render_stats(stats));
            }
            return Ok(());
        }
        TaskCommands::Categories => {
            let result = ctx.api.task_categories()?;
            print!("{}", render_categories(&result.categories));
            result
        }
        TaskCommands::Import { file } => {
            let content = fs::read_to_string(&file).map_err(|e| {
                TallyError::Validation(format!("cannot read {}: {}", file.display(), e))
            })?;
            ctx.api.import_tasks(&content)?
        }
        TaskCommands::Export { path } => ctx.api.export_tasks(path)?,
        TaskCommands::Clear => ctx.api.clear_tasks()?,
    };
    print_messages(&result.messages);
    Ok(())
}

/// `3=for` → (3, "for"). The answer may be empty.
fn parse_answer(raw: &str) -> Result<(u32, String)> {
    let (id, answer) = raw
        .split_once('=')
        .ok_or_else(|| TallyError::Validation(format!("expected ID=ANSWER, got '{}'", raw)))?;
    let id = id
        .trim()
        .parse()
        .map_err(|_| TallyError::Validation(format!("invalid question id '{}'", id)))?;
    Ok((id, answer.to_string()))
}

fn handle_quiz(ctx: &AppContext, cmd: QuizCommands) -> Result<()> {
    match cmd {
        QuizCommands::Questions { count, shuffle } => {
            let result = ctx.api.quiz_questions(count, shuffle);
            print!("{}", render_questions(&result.questions));
        }
        QuizCommands::Submit { answers } => {
            let parsed = answers
                .iter()
                .map(|a| parse_answer(a))
                .collect::<Result<Vec<_>>>()?;
            let result = ctx.api.submit_quiz(&parsed)?;
            for attempt in &result.attempts {
                print!("{}", render_attempt(attempt));
            }
            print_messages(&result.messages);
        }
        QuizCommands::History => {
            let result = ctx.api.quiz_history()?;
            print!("{}", render_history(&result.attempts));
            print_messages(&result.messages);
        }
    }
    Ok(())
}

fn handle_text(
    ctx: &AppContext,
    text: Option<String>,
    file: Option<PathBuf>,
    top: Option<usize>,
    report: bool,
) -> Result<()> {
    let source = match (&file, &text) {
        (Some(path), _) => TextSource::File(path),
        (None, Some(text)) => TextSource::Inline(text),
        (None, None) => return Err(TallyError::Validation("no text given".into())),
    };
    let result = ctx.api.analyze_text(source, top, report)?;
    if let Some(text_report) = &result.text_report {
        print!("{}", render_text_report(text_report));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let result = match (key.as_deref(), value) {
        (Some(key), Some(value)) => ctx.api.set_config(key, &value)?,
        (key, _) => ctx.api.get_config(key)?,
    };
    for message in &result.messages {
        println!("{}", message.content);
    }
    Ok(())
}
