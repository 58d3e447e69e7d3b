//! One-hot encoding of term membership into binary feature matrices.
//!
//! The "fitted encoder" is a sorted vocabulary of short term IDs observed
//! across the whole table; each tool row becomes a vector of occurrence
//! counts over that vocabulary (0/1 for typical records).

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use crate::report::TermColumn;
use crate::table::{self, ToolRow};

/// A term-membership feature matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotMatrix {
    /// Row labels (biotools IDs).
    pub labels: Vec<String>,
    /// Column terms (sorted short IDs, the encoder vocabulary).
    pub terms: Vec<String>,
    /// One occurrence-count vector per row, `terms.len()` wide.
    pub rows: Vec<Vec<u32>>,
}

/// Build the sorted unique term vocabulary of a column.
pub fn vocabulary(rows: &[ToolRow], column: TermColumn) -> Vec<String> {
    let mut terms: BTreeSet<String> = BTreeSet::new();
    for row in rows {
        let cell = match column {
            TermColumn::Topics => &row.topics,
            TermColumn::Operations => &row.operations,
        };
        for id in table::extract_term_ids(cell, column.id_pattern()) {
            terms.insert(id.to_string());
        }
    }
    terms.into_iter().collect()
}

/// Encode a column of the table against its own vocabulary.
///
/// Rows with no annotated terms become all-zero vectors. Row labels are the
/// biotools IDs parsed from the ID cell, falling back to the raw cell.
pub fn encode(rows: &[ToolRow], column: TermColumn) -> OneHotMatrix {
    let terms = vocabulary(rows, column);

    let encoded = rows
        .iter()
        .map(|row| {
            let cell = match column {
                TermColumn::Topics => &row.topics,
                TermColumn::Operations => &row.operations,
            };
            let mut vector = vec![0u32; terms.len()];
            for id in table::extract_term_ids(cell, column.id_pattern()) {
                if let Ok(pos) = terms.binary_search_by(|t| t.as_str().cmp(id)) {
                    vector[pos] += 1;
                }
            }
            vector
        })
        .collect();

    let labels = rows
        .iter()
        .map(|row| {
            table::short_id(&row.id)
                .unwrap_or(row.id.as_str())
                .to_string()
        })
        .collect();

    OneHotMatrix {
        labels,
        terms,
        rows: encoded,
    }
}

impl OneHotMatrix {
    /// Write the matrix as CSV with an `ID` column followed by one column
    /// per vocabulary term.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create matrix file {}", path.display()))?;

        let mut header = vec!["ID".to_string()];
        header.extend(self.terms.iter().cloned());
        writer.write_record(&header).context("Failed to write matrix header")?;

        for (label, row) in self.labels.iter().zip(&self.rows) {
            let mut record = vec![label.clone()];
            record.extend(row.iter().map(|v| v.to_string()));
            writer.write_record(&record).context("Failed to write matrix row")?;
        }
        writer.flush().context("Failed to flush matrix file")?;
        Ok(())
    }

    /// Read a matrix written by [`write_csv`](Self::write_csv).
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open matrix file {}", path.display()))?;

        let header = reader.headers().context("Failed to read matrix header")?;
        if header.is_empty() {
            bail!("Matrix file {} has no header", path.display());
        }
        let terms: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

        let mut labels = Vec::new();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read matrix row")?;
            let mut fields = record.iter();
            let label = fields
                .next()
                .context("Matrix row is missing the ID field")?;
            let row: Vec<u32> = fields
                .map(|f| {
                    // Encoded cells may carry a float rendering like "1.0".
                    f.parse::<f64>()
                        .map(|v| v as u32)
                        .with_context(|| format!("Invalid matrix cell '{}'", f))
                })
                .collect::<Result<_>>()?;

            if row.len() != terms.len() {
                bail!(
                    "Matrix row '{}' has {} cells, expected {}",
                    label,
                    row.len(),
                    terms.len()
                );
            }

            labels.push(label.to_string());
            rows.push(row);
        }

        Ok(Self { labels, terms, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, topics: &str) -> ToolRow {
        ToolRow {
            id: format!("{}\n(https://bio.tools/{})", id, id.to_lowercase()),
            description: String::new(),
            topics: topics.into(),
            operations: String::new(),
        }
    }

    #[test]
    fn vocabulary_is_sorted_and_unique() {
        let rows = vec![
            row("A", "Sequencing (topic_3168)\nProteomics (topic_0121)"),
            row("B", "Proteomics (topic_0121)"),
        ];
        assert_eq!(
            vocabulary(&rows, TermColumn::Topics),
            vec!["topic_0121", "topic_3168"]
        );
    }

    #[test]
    fn encodes_membership_and_zero_rows() {
        let rows = vec![
            row("A", "Proteomics (topic_0121)\nSequencing (topic_3168)"),
            row("B", "Sequencing (topic_3168)"),
            row("C", "no annotations here"),
        ];
        let matrix = encode(&rows, TermColumn::Topics);

        assert_eq!(matrix.labels, vec!["a", "b", "c"]);
        assert_eq!(matrix.terms, vec!["topic_0121", "topic_3168"]);
        assert_eq!(matrix.rows, vec![vec![1, 1], vec![0, 1], vec![0, 0]]);
    }

    #[test]
    fn duplicate_terms_accumulate() {
        let rows = vec![row("A", "Proteomics (topic_0121)\nProteomics (topic_0121)")];
        let matrix = encode(&rows, TermColumn::Topics);
        assert_eq!(matrix.rows, vec![vec![2]]);
    }

    #[test]
    fn matrix_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics_1he.csv");

        let rows = vec![
            row("A", "Proteomics (topic_0121)"),
            row("B", "Sequencing (topic_3168)"),
        ];
        let matrix = encode(&rows, TermColumn::Topics);
        matrix.write_csv(&path).unwrap();

        let loaded = OneHotMatrix::read_csv(&path).unwrap();
        assert_eq!(loaded, matrix);
    }

    #[test]
    fn rejects_ragged_matrix_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        // csv is strict about field counts per record, so a ragged file
        // fails at the reader level.
        std::fs::write(&path, "ID,topic_0121,topic_3168\na,1\n").unwrap();
        assert!(OneHotMatrix::read_csv(&path).is_err());
    }
}
