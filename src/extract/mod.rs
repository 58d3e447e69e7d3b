//! EDAM term extraction from tool records.
//!
//! Maps a list of tool records to `biotools ID -> terms` for one of the four
//! annotation categories (Topic, Operation, Format, Data).

use std::collections::BTreeMap;

use crate::types::{TermAnnotation, TermCategory, Tool};

/// Terms per tool, keyed by biotools ID.
pub type TermsByTool = BTreeMap<String, Vec<TermAnnotation>>;

/// Extract the terms of the given category from each tool.
pub fn extract_terms(tools: &[Tool], category: TermCategory) -> TermsByTool {
    match category {
        TermCategory::Topic => extract_topics(tools),
        TermCategory::Operation => extract_operations(tools),
        TermCategory::Format => extract_formats(tools),
        TermCategory::Data => extract_data(tools),
    }
}

fn extract_topics(tools: &[Tool]) -> TermsByTool {
    let mut terms = TermsByTool::new();
    for tool in tools {
        terms
            .entry(tool.biotools_id.clone())
            .or_default()
            .extend(tool.topic.iter().cloned());
    }
    terms
}

fn extract_operations(tools: &[Tool]) -> TermsByTool {
    let mut terms = TermsByTool::new();
    for tool in tools {
        let operations: Vec<TermAnnotation> = tool
            .function
            .iter()
            .flat_map(|f| f.operation.iter().cloned())
            .collect();

        // Tools without any operation are left out entirely.
        if !operations.is_empty() {
            terms
                .entry(tool.biotools_id.clone())
                .or_default()
                .extend(operations);
        }
    }
    terms
}

fn extract_formats(tools: &[Tool]) -> TermsByTool {
    let mut terms = TermsByTool::new();
    for tool in tools {
        let formats: Vec<TermAnnotation> = tool
            .function
            .iter()
            .flat_map(|f| f.input.iter().chain(f.output.iter()))
            .flat_map(|io| io.format.iter().cloned())
            .collect();
        terms
            .entry(tool.biotools_id.clone())
            .or_default()
            .extend(formats);
    }
    terms
}

fn extract_data(tools: &[Tool]) -> TermsByTool {
    let mut terms = TermsByTool::new();
    for tool in tools {
        let data: Vec<TermAnnotation> = tool
            .function
            .iter()
            .flat_map(|f| f.input.iter().chain(f.output.iter()))
            .filter_map(|io| io.data.clone())
            .collect();
        terms
            .entry(tool.biotools_id.clone())
            .or_default()
            .extend(data);
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionData, ToolFunction};

    fn term(uri: &str, name: &str) -> TermAnnotation {
        TermAnnotation {
            uri: uri.into(),
            term: name.into(),
        }
    }

    fn sample_tool() -> Tool {
        Tool {
            name: "PeakFinder".into(),
            biotools_id: "peakfinder".into(),
            description: "Detects peaks in spectra".into(),
            topic: vec![term("http://edamontology.org/topic_0121", "Proteomics")],
            function: vec![
                ToolFunction {
                    operation: vec![
                        term("http://edamontology.org/operation_3631", "Peak detection"),
                        term("http://edamontology.org/operation_3767", "Protein identification"),
                    ],
                    input: vec![FunctionData {
                        data: Some(term("http://edamontology.org/data_0943", "Mass spectrum")),
                        format: vec![term("http://edamontology.org/format_3244", "mzML")],
                    }],
                    output: vec![FunctionData {
                        data: Some(term("http://edamontology.org/data_0945", "Peptide identification")),
                        format: vec![term("http://edamontology.org/format_3247", "mzIdentML")],
                    }],
                },
                ToolFunction {
                    operation: vec![term("http://edamontology.org/operation_3631", "Peak detection")],
                    ..Default::default()
                },
            ],
            extra: Default::default(),
        }
    }

    #[test]
    fn extracts_topics_per_tool() {
        let tools = vec![sample_tool()];
        let map = extract_terms(&tools, TermCategory::Topic);
        assert_eq!(map["peakfinder"], vec![term("http://edamontology.org/topic_0121", "Proteomics")]);
    }

    #[test]
    fn extracts_operations_across_functions() {
        let tools = vec![sample_tool()];
        let map = extract_terms(&tools, TermCategory::Operation);
        let names: Vec<&str> = map["peakfinder"].iter().map(|t| t.term.as_str()).collect();
        assert_eq!(
            names,
            vec!["Peak detection", "Protein identification", "Peak detection"]
        );
    }

    #[test]
    fn tools_without_operations_are_omitted() {
        let mut bare = Tool::default();
        bare.biotools_id = "bare".into();
        let map = extract_terms(&[bare], TermCategory::Operation);
        assert!(map.is_empty());
    }

    #[test]
    fn extracts_formats_from_inputs_and_outputs() {
        let tools = vec![sample_tool()];
        let map = extract_terms(&tools, TermCategory::Format);
        let names: Vec<&str> = map["peakfinder"].iter().map(|t| t.term.as_str()).collect();
        assert_eq!(names, vec!["mzML", "mzIdentML"]);
    }

    #[test]
    fn extracts_data_from_inputs_and_outputs() {
        let tools = vec![sample_tool()];
        let map = extract_terms(&tools, TermCategory::Data);
        let names: Vec<&str> = map["peakfinder"].iter().map(|t| t.term.as_str()).collect();
        assert_eq!(names, vec!["Mass spectrum", "Peptide identification"]);
    }
}
