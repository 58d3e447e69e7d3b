//! CSV tool tables: the tabular handoff format shared by the analysis
//! commands.
//!
//! A table row holds the tool's display ID (`"<name>\n(https://bio.tools/<id>)"`)
//! plus newline-joined Topics/Operations cells, mirroring the hand-authored
//! spreadsheets these tables replace.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use crate::types::Tool;

/// Regex extracting a short topic ID like `topic_0121` from a term cell line.
pub const TOPIC_ID_PATTERN: &str = r"\((topic_[0-9]{4})\)";

/// Regex extracting a short operation ID like `operation_3631`.
pub const OPERATION_ID_PATTERN: &str = r"\((operation_[0-9]{4})\)";

/// One row of a tool table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Topics")]
    pub topics: String,
    #[serde(rename = "Operations")]
    pub operations: String,
}

/// Compiled topic ID regex.
pub fn topic_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOPIC_ID_PATTERN).expect("valid topic pattern"))
}

/// Compiled operation ID regex.
pub fn operation_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(OPERATION_ID_PATTERN).expect("valid operation pattern"))
}

/// Derive table rows from raw tool records.
///
/// Topics keep record order; operations are the deduplicated terms of the
/// first operation of each function block.
pub fn rows_from_tools(tools: &[Tool]) -> Vec<ToolRow> {
    tools
        .iter()
        .map(|tool| {
            let topics: Vec<&str> = tool.topic.iter().map(|t| t.term.as_str()).collect();

            let operations: BTreeSet<&str> = tool
                .function
                .iter()
                .filter_map(|f| f.operation.first())
                .map(|op| op.term.as_str())
                .collect();
            let operations: Vec<&str> = operations.into_iter().collect();

            ToolRow {
                id: format!("{}\n(https://bio.tools/{})", tool.name, tool.biotools_id),
                description: tool.description.clone(),
                topics: topics.join("\n"),
                operations: operations.join("\n"),
            }
        })
        .collect()
}

/// Read a tool table from a CSV file.
pub fn read_table(path: &Path) -> Result<Vec<ToolRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open tool table {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: ToolRow = record.context("Failed to parse tool table row")?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write a tool table to a CSV file.
pub fn write_table(path: &Path, rows: &[ToolRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create tool table {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write tool table row")?;
    }
    writer.flush().context("Failed to flush tool table")?;
    Ok(())
}

/// Split a newline-joined cell into its term lines, skipping blanks.
pub fn split_cell(cell: &str) -> Vec<&str> {
    cell.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// Extract the short term IDs from a cell using the given pattern.
pub fn extract_term_ids<'a>(cell: &'a str, pattern: &Regex) -> Vec<&'a str> {
    split_cell(cell)
        .into_iter()
        .filter_map(|line| pattern.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Extract the biotools ID from an ID cell of the form
/// `"<name>\n(https://bio.tools/<id>)"`.
pub fn short_id(id_cell: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\(https://bio\.tools/(.+)\)").expect("valid ID pattern")
    });
    re.captures(id_cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TermAnnotation, ToolFunction};

    fn term(name: &str, uri: &str) -> TermAnnotation {
        TermAnnotation {
            uri: uri.into(),
            term: name.into(),
        }
    }

    #[test]
    fn derives_rows_with_first_operation_per_function() {
        let tool = Tool {
            name: "MaxQuant".into(),
            biotools_id: "maxquant".into(),
            description: "Quantitative proteomics".into(),
            topic: vec![term("Proteomics", "http://edamontology.org/topic_0121")],
            function: vec![
                ToolFunction {
                    operation: vec![
                        term("Protein quantification", "http://edamontology.org/operation_3630"),
                        term("Peak detection", "http://edamontology.org/operation_3631"),
                    ],
                    ..Default::default()
                },
                ToolFunction {
                    operation: vec![term(
                        "Protein quantification",
                        "http://edamontology.org/operation_3630",
                    )],
                    ..Default::default()
                },
            ],
            extra: Default::default(),
        };

        let rows = rows_from_tools(&[tool]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "MaxQuant\n(https://bio.tools/maxquant)");
        assert_eq!(rows[0].topics, "Proteomics");
        // Second function's first operation duplicates the first; deduped.
        assert_eq!(rows[0].operations, "Protein quantification");
    }

    #[test]
    fn table_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool_list.csv");

        let rows = vec![ToolRow {
            id: "Comet\n(https://bio.tools/comet)".into(),
            description: "Peptide database search".into(),
            topics: "Proteomics (topic_0121)\nProteomics experiment (topic_3520)".into(),
            operations: "Peptide database search (operation_3646)".into(),
        }];

        write_table(&path, &rows).unwrap();
        let loaded = read_table(&path).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn splits_cells_and_skips_blank_lines() {
        assert_eq!(
            split_cell("Proteomics\n\nSequence analysis\n"),
            vec!["Proteomics", "Sequence analysis"]
        );
        assert!(split_cell("").is_empty());
    }

    #[test]
    fn extracts_term_ids_from_annotated_cells() {
        let cell = "Proteomics (topic_0121)\nNot annotated\nSequencing (topic_3168)";
        assert_eq!(
            extract_term_ids(cell, topic_id_regex()),
            vec!["topic_0121", "topic_3168"]
        );
        // Topic pattern never matches operation IDs.
        assert!(extract_term_ids("Peak detection (operation_3631)", topic_id_regex()).is_empty());
    }

    #[test]
    fn short_id_parses_the_id_cell() {
        assert_eq!(
            short_id("Comet\n(https://bio.tools/comet)"),
            Some("comet")
        );
        assert_eq!(short_id("no link here"), None);
    }
}
