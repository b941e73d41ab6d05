//! Interactive prompt layer.
//!
//! Thin wrapper over dialoguer that maps Esc/`q` to a typed
//! [`Selection::Cancelled`] outcome instead of a sentinel value, so the
//! command layer can treat cancellation as a clean abort.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{MultiSelect, Select};

/// Outcome of an interactive selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Chosen(T),
    Cancelled,
}

/// Single-choice prompt; returns the chosen index.
pub fn select_one(prompt: &str, items: &[String]) -> Result<Selection<usize>> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()?;
    Ok(match choice {
        Some(index) => Selection::Chosen(index),
        None => Selection::Cancelled,
    })
}

/// Multi-choice prompt with pre-checked defaults; returns the chosen
/// indices. An empty selection is a valid answer, not a cancellation.
pub fn select_many(prompt: &str, items: &[(String, bool)]) -> Result<Selection<Vec<usize>>> {
    let labels: Vec<&String> = items.iter().map(|(label, _)| label).collect();
    let defaults: Vec<bool> = items.iter().map(|(_, checked)| *checked).collect();
    let choice = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()?;
    Ok(match choice {
        Some(indices) => Selection::Chosen(indices),
        None => Selection::Cancelled,
    })
}
