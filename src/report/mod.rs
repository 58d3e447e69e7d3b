//! Frequency reports and category scoring over tool tables.

use anyhow::{Context, Result};
use colored::Colorize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::table::{self, ToolRow};
use crate::types::{TermAnnotation, TermCategories, TermIndex};

// ---------------------------------------------------------------------------
// Term frequencies
// ---------------------------------------------------------------------------

/// Which cell of a row a report reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermColumn {
    Topics,
    Operations,
}

impl TermColumn {
    fn cell<'a>(&self, row: &'a ToolRow) -> &'a str {
        match self {
            Self::Topics => &row.topics,
            Self::Operations => &row.operations,
        }
    }

    /// Display label used in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Topics => "Topics",
            Self::Operations => "Operations",
        }
    }

    /// The short-ID extraction pattern for this column.
    pub fn id_pattern(&self) -> &'static Regex {
        match self {
            Self::Topics => table::topic_id_regex(),
            Self::Operations => table::operation_id_regex(),
        }
    }
}

/// Count raw term strings in a column, sorted by descending count
/// (ties broken by term, for stable output).
pub fn term_frequencies(rows: &[ToolRow], column: TermColumn) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in rows {
        for term in table::split_cell(column.cell(row)) {
            *counts.entry(term.to_string()).or_insert(0) += 1;
        }
    }
    sorted_by_count(counts)
}

/// Count regex-extracted short term IDs in a column.
pub fn term_id_frequencies(rows: &[ToolRow], column: TermColumn) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in rows {
        for id in table::extract_term_ids(column.cell(row), column.id_pattern()) {
            *counts.entry(id.to_string()).or_insert(0) += 1;
        }
    }
    sorted_by_count(counts)
}

fn sorted_by_count(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut freqs: Vec<(String, usize)> = counts.into_iter().collect();
    freqs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    freqs
}

/// Print a ranked top-N listing to stdout.
///
/// With an index, entries are shown as `<name> (<id>)`, falling back to
/// `N/A` for IDs the index does not know.
pub fn print_top_terms(
    freqs: &[(String, usize)],
    top_n: usize,
    label: &str,
    index: Option<&TermIndex>,
) {
    println!("{} {} {}", "*****".bold(), format!("Top {} {}", top_n, label).bold(), "*****".bold());
    for (rank, (term, count)) in freqs.iter().take(top_n).enumerate() {
        match index {
            Some(idx) => {
                let name = idx.name_of(term).unwrap_or("N/A");
                println!("{}. {} ({}) - {}", rank + 1, name, term, count);
            }
            None => println!("{}. {} - {}", rank + 1, term, count),
        }
    }
}

// ---------------------------------------------------------------------------
// Category scoring
// ---------------------------------------------------------------------------

/// A tool row augmented with yes/maybe category counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Topics")]
    pub topics: String,
    #[serde(rename = "Operations")]
    pub operations: String,
    #[serde(rename = "TopicsYes")]
    pub topics_yes: usize,
    #[serde(rename = "TopicsMaybe")]
    pub topics_maybe: usize,
    #[serde(rename = "OperationsYes")]
    pub operations_yes: usize,
    #[serde(rename = "OperationsMaybe")]
    pub operations_maybe: usize,
    #[serde(rename = "TotalYes")]
    pub total_yes: usize,
    #[serde(rename = "TotalMaybe")]
    pub total_maybe: usize,
    #[serde(rename = "TotalTopics")]
    pub total_topics: usize,
    #[serde(rename = "TotalOperations")]
    pub total_operations: usize,
}

/// Score each row against the curated yes/maybe term lists.
pub fn count_categories(rows: &[ToolRow], categories: &TermCategories) -> Vec<CountRow> {
    rows.iter()
        .map(|row| {
            let topics = table::extract_term_ids(&row.topics, table::topic_id_regex());
            let operations =
                table::extract_term_ids(&row.operations, table::operation_id_regex());

            let topics_yes = matches(&topics, &categories.topic_yes);
            let topics_maybe = matches(&topics, &categories.topic_maybe);
            let operations_yes = matches(&operations, &categories.operation_yes);
            let operations_maybe = matches(&operations, &categories.operation_maybe);

            CountRow {
                id: row.id.clone(),
                description: row.description.clone(),
                topics: row.topics.clone(),
                operations: row.operations.clone(),
                topics_yes,
                topics_maybe,
                operations_yes,
                operations_maybe,
                total_yes: topics_yes + operations_yes,
                total_maybe: topics_maybe + operations_maybe,
                total_topics: topics_yes + topics_maybe,
                total_operations: operations_yes + operations_maybe,
            }
        })
        .collect()
}

/// How many of the short IDs appear in the category list.
///
/// Category entries may carry the full EDAM URI or just the short ID.
fn matches(ids: &[&str], category: &[TermAnnotation]) -> usize {
    ids.iter()
        .filter(|id| {
            category
                .iter()
                .any(|entry| entry.uri == **id || entry.uri.ends_with(&format!("/{}", id)))
        })
        .count()
}

/// Write the scored table to a CSV file.
pub fn write_count_table(path: &Path, rows: &[CountRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create count table {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write count table row")?;
    }
    writer.flush().context("Failed to flush count table")?;
    Ok(())
}
