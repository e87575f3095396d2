use crate::aggregate::{completion_stats, filter, Predicate};
use crate::codec::delimited::TaskLineCodec;
use crate::commands::{load_policy, CmdMessage, CmdResult};
use crate::config::TallyConfig;
use crate::error::{Result, TallyError};
use crate::model::{normalize_title, now_iso, Task, DEFAULT_TASK_CATEGORY};
use crate::store::json_store::JsonDocStore;
use crate::store::line_store::decode_lines;
use crate::store::{DataFile, LoadPolicy, StorageBackend};
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_CATEGORIES: &[&str] = &["study", "work", "personal", "general"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Done,
    Todo,
}

fn task_store<'a, B: StorageBackend>(
    backend: &'a B,
    config: &TallyConfig,
) -> JsonDocStore<'a, Task, B> {
    JsonDocStore::new(backend, DataFile::Tasks).with_backups(config.backups)
}

fn category_store<B: StorageBackend>(backend: &B) -> JsonDocStore<'_, String, B> {
    JsonDocStore::new(backend, DataFile::Categories)
}

/// Position of the first task whose title matches, ignoring case and padding.
pub fn find_index(tasks: &[Task], title: &str) -> Option<usize> {
    tasks.iter().position(|t| t.matches_title(title))
}

fn find_or_not_found(tasks: &[Task], title: &str) -> Result<usize> {
    find_index(tasks, title).ok_or_else(|| TallyError::NotFound(format!("task '{}'", title.trim())))
}

/// Trimmed, non-empty, first occurrence kept.
pub fn unique_categories<I, S>(categories: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for c in categories {
        let c = c.as_ref().trim();
        if !c.is_empty() && !unique.iter().any(|u| u == c) {
            unique.push(c.to_string());
        }
    }
    unique
}

/// Saved categories followed by any category tasks use that is not saved.
pub fn merged_categories(saved: &[String], tasks: &[Task]) -> Vec<String> {
    unique_categories(
        saved
            .iter()
            .map(String::as_str)
            .chain(tasks.iter().map(|t| t.category.as_str())),
    )
}

fn load_categories<B: StorageBackend>(backend: &B) -> Result<Vec<String>> {
    Ok(category_store(backend)
        .load_opt()?
        .unwrap_or_else(|| DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()))
}

/// Persist `category` unless it is already known. Best-effort.
fn ensure_category<B: StorageBackend>(backend: &B, category: &str) {
    let category = category.trim();
    if category.is_empty() {
        return;
    }
    let outcome = load_categories(backend).and_then(|mut cats| {
        if cats.iter().any(|c| c == category) {
            return Ok(());
        }
        cats.push(category.to_string());
        category_store(backend).save(&unique_categories(&cats))
    });
    if let Err(e) = outcome {
        warn!("could not record category '{}': {}", category, e);
    }
}

pub fn add<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    title: &str,
    category: &str,
) -> Result<CmdResult> {
    let task = Task::new(title, category)?;
    let store = task_store(backend, config);
    let mut tasks = store.load()?;
    if find_index(&tasks, &task.title).is_some() {
        return Err(TallyError::Validation(format!(
            "task '{}' already exists",
            task.title
        )));
    }

    tasks.push(task.clone());
    store.save(&tasks)?;
    ensure_category(backend, &task.category);
    info!("added task '{}'", task.title);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added task: {} [{}]",
        task.title, task.category
    )));
    Ok(result.with_tasks(vec![task]))
}

/// Rename and/or recategorize. Blank values leave the field as is.
pub fn edit<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    title: &str,
    new_title: Option<&str>,
    new_category: Option<&str>,
) -> Result<CmdResult> {
    let new_title = new_title.map(str::trim).filter(|t| !t.is_empty());
    let new_category = new_category.map(str::trim).filter(|c| !c.is_empty());

    let store = task_store(backend, config);
    let mut tasks = store.load()?;
    let idx = find_or_not_found(&tasks, title)?;

    if let Some(new_title) = new_title {
        if let Some(other) = find_index(&tasks, new_title) {
            if other != idx {
                return Err(TallyError::Validation(format!(
                    "task '{}' already exists",
                    new_title
                )));
            }
        }
        tasks[idx].title = new_title.to_string();
    }
    if let Some(new_category) = new_category {
        tasks[idx].category = new_category.to_string();
    }
    store.save(&tasks)?;
    if let Some(new_category) = new_category {
        ensure_category(backend, new_category);
    }
    info!("edited task '{}'", tasks[idx].title);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Updated task: {} [{}]",
        tasks[idx].title, tasks[idx].category
    )));
    let edited = tasks[idx].clone();
    Ok(result.with_tasks(vec![edited]))
}

pub fn toggle<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    title: &str,
    done: bool,
) -> Result<CmdResult> {
    let store = task_store(backend, config);
    let mut tasks = store.load()?;
    let idx = find_or_not_found(&tasks, title)?;
    tasks[idx].done = done;
    store.save(&tasks)?;
    info!("marked '{}' done={}", tasks[idx].title, done);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{}: {}",
        if done { "Done" } else { "Reopened" },
        tasks[idx].title
    )));
    let toggled = tasks[idx].clone();
    Ok(result.with_tasks(vec![toggled]))
}

/// Set `done` on every listed title. Unknown titles are ignored; the file is
/// only rewritten when something changed.
pub fn toggle_bulk<B: StorageBackend, S: AsRef<str>>(
    backend: &B,
    config: &TallyConfig,
    titles: &[S],
    done: bool,
) -> Result<CmdResult> {
    let store = task_store(backend, config);
    let mut tasks = store.load()?;

    let mut changed = Vec::new();
    for title in titles {
        match find_index(&tasks, title.as_ref()) {
            Some(idx) if tasks[idx].done != done => {
                tasks[idx].done = done;
                changed.push(tasks[idx].clone());
            }
            Some(_) => {}
            None => warn!("no task titled '{}'", title.as_ref().trim()),
        }
    }
    if !changed.is_empty() {
        store.save(&tasks)?;
    }

    let mut result = CmdResult::default();
    result.changed = changed.len();
    result.add_message(CmdMessage::info(format!(
        "{} task(s) changed",
        changed.len()
    )));
    Ok(result.with_tasks(changed))
}

pub fn remove<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    title: &str,
) -> Result<CmdResult> {
    let store = task_store(backend, config);
    let mut tasks = store.load()?;
    let idx = find_or_not_found(&tasks, title)?;
    let removed = tasks.remove(idx);
    store.save(&tasks)?;
    info!("removed task '{}'", removed.title);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Removed task: {}", removed.title)));
    Ok(result.with_tasks(vec![removed]))
}

/// Tasks filtered by category (case-insensitive) and status. Stats and
/// categories cover every task.
pub fn list<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    category: Option<&str>,
    status: StatusFilter,
) -> Result<CmdResult> {
    let tasks = task_store(backend, config).load()?;
    let category = category.map(normalize_title).filter(|c| !c.is_empty());

    let predicate = Predicate::all()
        .and_if(category.is_some(), |t: &Task| {
            Some(normalize_title(&t.category)) == category
        })
        .and_if(status != StatusFilter::All, |t: &Task| {
            t.done == (status == StatusFilter::Done)
        });
    let selected: Vec<Task> = filter(&tasks, |t| predicate.matches(t))
        .into_iter()
        .cloned()
        .collect();

    let mut result = CmdResult::default();
    if selected.is_empty() {
        result.add_message(CmdMessage::info("No tasks found."));
    }
    result.task_stats = Some(completion_stats(&tasks, |t| t.done));
    result.categories = merged_categories(&load_categories(backend)?, &tasks);
    Ok(result.with_tasks(selected))
}

pub fn categories<B: StorageBackend>(backend: &B, config: &TallyConfig) -> Result<CmdResult> {
    let tasks = task_store(backend, config).load()?;
    let mut result = CmdResult::default();
    result.categories = merged_categories(&load_categories(backend)?, &tasks);
    Ok(result)
}

/// Tasks from a JSON array. Entries without a title are skipped, later
/// duplicates of a title are dropped, missing fields get defaults.
pub fn parse_json_tasks(content: &str) -> Result<Vec<Task>> {
    let items: Vec<Value> = serde_json::from_str(content)?;
    let mut tasks: Vec<Task> = Vec::new();
    for item in items {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let title = match obj.get("title") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        if title.is_empty() || find_index(&tasks, &title).is_some() {
            continue;
        }
        let category = obj
            .get("category")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TASK_CATEGORY);
        let created = obj
            .get("created")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(now_iso);
        tasks.push(Task {
            title,
            category: category.to_string(),
            done: obj.get("done").and_then(Value::as_bool).unwrap_or(false),
            created,
        });
    }
    Ok(tasks)
}

/// Tasks from legacy `title,category,True|False` lines. Later duplicates
/// of a title are dropped and an empty category becomes the default.
pub fn parse_task_lines(content: &str, policy: LoadPolicy) -> Result<(Vec<Task>, usize)> {
    let loaded = decode_lines(&TaskLineCodec, content, policy, "import")?;
    let mut tasks: Vec<Task> = Vec::new();
    for mut task in loaded.records {
        if find_index(&tasks, &task.title).is_some() {
            continue;
        }
        if task.category.is_empty() {
            task.category = DEFAULT_TASK_CATEGORY.to_string();
        }
        task.created = now_iso();
        tasks.push(task);
    }
    Ok((tasks, loaded.skipped))
}

/// Replace all tasks with the contents of `content`: a JSON array, or
/// legacy task lines when it does not start with `[`.
pub fn import<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    content: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let tasks = if content.trim_start().starts_with('[') {
        parse_json_tasks(content)?
    } else {
        let (tasks, skipped) = parse_task_lines(content, load_policy(config))?;
        result.note_skipped("import", skipped);
        tasks
    };

    task_store(backend, config).save(&tasks)?;
    for task in &tasks {
        ensure_category(backend, &task.category);
    }
    info!("imported {} tasks", tasks.len());

    result.changed = tasks.len();
    result.add_message(CmdMessage::success(format!(
        "Imported {} task(s)",
        tasks.len()
    )));
    Ok(result.with_tasks(tasks))
}

/// Pretty JSON of every task, as written by [`export`].
pub fn export_json<B: StorageBackend>(backend: &B, config: &TallyConfig) -> Result<String> {
    let tasks = task_store(backend, config).load()?;
    Ok(serde_json::to_string_pretty(&tasks)?)
}

pub fn export<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    dest: Option<PathBuf>,
) -> Result<CmdResult> {
    let dest = dest.unwrap_or_else(|| PathBuf::from("tasks-export.json"));
    fs::write(&dest, export_json(backend, config)?)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported tasks to {}",
        dest.display()
    )));
    Ok(result.with_paths(vec![dest]))
}

pub fn clear<B: StorageBackend>(backend: &B, config: &TallyConfig) -> Result<CmdResult> {
    task_store(backend, config).save(&[])?;
    info!("cleared tasks");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("All tasks removed."));
    Ok(result)
}
