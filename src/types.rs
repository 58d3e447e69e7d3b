//! Shared types used across the biotools-utils commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Tool records (bio.tools wire format)
// ---------------------------------------------------------------------------

/// An EDAM term annotation as it appears in tool records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAnnotation {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub term: String,
}

/// Input or output of a tool function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TermAnnotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<TermAnnotation>,
}

/// A function block of a tool record: operations plus typed inputs/outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolFunction {
    #[serde(default)]
    pub operation: Vec<TermAnnotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<FunctionData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<FunctionData>,
}

/// A tool record from the registry API.
///
/// Only the fields the utilities read are typed; the rest of the record is
/// carried through `extra` so a dump survives a round trip to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "biotoolsID", default)]
    pub biotools_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub topic: Vec<TermAnnotation>,
    #[serde(default)]
    pub function: Vec<ToolFunction>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Term categories
// ---------------------------------------------------------------------------

/// The four EDAM term categories a tool record is annotated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    Topic,
    Operation,
    Format,
    Data,
}

impl fmt::Display for TermCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => write!(f, "Topic"),
            Self::Operation => write!(f, "Operation"),
            Self::Format => write!(f, "Format"),
            Self::Data => write!(f, "Data"),
        }
    }
}

/// Raised when a term-category selector is not one of the four valid values.
#[derive(Debug, thiserror::Error)]
#[error("the term type '{0}' is not valid; must be 'Topic', 'Operation', 'Format', or 'Data'")]
pub struct InvalidTermCategory(pub String);

impl FromStr for TermCategory {
    type Err = InvalidTermCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "topic" => Ok(Self::Topic),
            "operation" => Ok(Self::Operation),
            "format" => Ok(Self::Format),
            "data" => Ok(Self::Data),
            _ => Err(InvalidTermCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Static reference tables
// ---------------------------------------------------------------------------

/// One entry of a term index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermIndexEntry {
    pub name: String,
    #[serde(default)]
    pub uri: String,
}

/// Index from short term ID (e.g. `topic_0121`) to term metadata, loaded
/// from a JSON file of shape `{"data": {"<id>": {"name": ..., "uri": ...}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermIndex {
    #[serde(default)]
    pub data: BTreeMap<String, TermIndexEntry>,
}

impl TermIndex {
    /// Human-readable name for a short term ID, if indexed.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.data.get(id).map(|e| e.name.as_str())
    }
}

/// Curated yes/maybe term lists used for per-tool category scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermCategories {
    #[serde(rename = "TopicYes", default)]
    pub topic_yes: Vec<TermAnnotation>,
    #[serde(rename = "TopicMaybe", default)]
    pub topic_maybe: Vec<TermAnnotation>,
    #[serde(rename = "OperationYes", default)]
    pub operation_yes: Vec<TermAnnotation>,
    #[serde(rename = "OperationMaybe", default)]
    pub operation_maybe: Vec<TermAnnotation>,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Registry account credentials, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
