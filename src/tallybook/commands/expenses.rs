use crate::aggregate::{average, extremum, group_total, total, Extremum, Predicate};
use crate::codec::delimited::ExpenseCodec;
use crate::commands::{load_policy, CmdMessage, CmdResult};
use crate::config::TallyConfig;
use crate::error::{Result, TallyError};
use crate::model::Expense;
use crate::store::line_store::LineStore;
use crate::store::{DataFile, StorageBackend};
use log::info;
use std::collections::BTreeSet;

/// Optional exact-match filters; both must hold when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub day: Option<String>,
}

impl ExpenseFilter {
    pub fn new(category: Option<String>, day: Option<String>) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            category: clean(category),
            day: clean(day),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.day.is_none()
    }

    pub fn predicate(&self) -> Predicate<'_, Expense> {
        Predicate::all()
            .and_if(self.category.is_some(), move |e: &Expense| {
                Some(e.category.as_str()) == self.category.as_deref()
            })
            .and_if(self.day.is_some(), move |e: &Expense| {
                Some(e.day.as_str()) == self.day.as_deref()
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    /// Per-category totals in first-seen order.
    pub by_category: Vec<(String, f64)>,
    pub biggest: Option<Expense>,
    /// Every non-empty category on file, sorted. Not affected by filters.
    pub categories: Vec<String>,
}

fn store<B: StorageBackend>(backend: &B) -> LineStore<'_, ExpenseCodec, B> {
    LineStore::new(ExpenseCodec, backend, DataFile::Expenses)
}

/// Sorted unique non-empty categories.
pub fn known_categories(expenses: &[Expense]) -> Vec<String> {
    expenses
        .iter()
        .filter(|e| !e.category.is_empty())
        .map(|e| e.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Summary of `selected`, with the category list taken from `all`.
pub fn summarize(selected: &[Expense], all: &[Expense]) -> ExpenseSummary {
    let amount = |e: &Expense| e.amount;
    ExpenseSummary {
        total: total(selected, amount),
        count: selected.len(),
        average: average(selected, amount),
        by_category: group_total(selected, |e| e.group_key().to_string(), amount),
        biggest: extremum(selected, amount, Extremum::Max).cloned(),
        categories: known_categories(all),
    }
}

fn parse_amount(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TallyError::Validation(format!("amount must be a number, got '{}'", raw)))
}

pub fn add<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    category: &str,
    amount: &str,
    note: &str,
    day: &str,
) -> Result<CmdResult> {
    let expense = Expense::new(category, parse_amount(amount)?, note, day)?;
    store(backend).append(&expense)?;
    info!("added expense {} {:.2}", expense.category, expense.amount);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added {:.2} {} to {}",
        expense.amount, config.currency, expense.category
    )));
    Ok(result.with_expenses(vec![expense]))
}

/// Expenses matching `filter` in file order, with a summary of that selection.
pub fn list<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    expense_filter: &ExpenseFilter,
) -> Result<CmdResult> {
    let loaded = store(backend).load_report(load_policy(config))?;
    let all = loaded.records;

    let predicate = expense_filter.predicate();
    let (positions, selected): (Vec<usize>, Vec<Expense>) = all
        .iter()
        .enumerate()
        .filter(|(_, e)| predicate.matches(e))
        .map(|(i, e)| (i + 1, e.clone()))
        .unzip();

    let mut result = CmdResult::default();
    result.note_skipped(DataFile::Expenses.file_name(), loaded.skipped);
    if selected.is_empty() {
        result.add_message(CmdMessage::info(if expense_filter.is_empty() {
            "No expenses yet."
        } else {
            "No expenses match the filter."
        }));
    }
    result.expense_summary = Some(summarize(&selected, &all));
    result.positions = positions;
    Ok(result.with_expenses(selected))
}

/// Remove the expense at a 1-based position.
pub fn remove<B: StorageBackend>(
    backend: &B,
    config: &TallyConfig,
    position: usize,
) -> Result<CmdResult> {
    let store = store(backend);
    let mut expenses = store.load(load_policy(config))?;
    if position == 0 || position > expenses.len() {
        return Err(TallyError::NotFound(format!("expense #{}", position)));
    }
    let removed = expenses.remove(position - 1);
    store.save(&expenses)?;
    info!("removed expense #{}", position);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Removed {:.2} {} from {}",
        removed.amount, config.currency, removed.category
    )));
    Ok(result.with_expenses(vec![removed]))
}
