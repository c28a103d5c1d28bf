//! Research data types and extraction schemas.

use delve_llm::Schema;
use delve_search::ResultSet;
use serde::{Deserialize, Serialize};

/// Shape of planner and evaluator output.
pub const QUERIES: Schema = Schema {
    name: "queries",
    description: "The web search queries proposed in the text, in the order given. \
                  If the text says no further searching is needed, return an empty list.",
    example: r#"{"queries": ["first search query", "second search query"]}"#,
};

/// Shape of relevance filter output.
pub const SOURCES: Schema = Schema {
    name: "sources",
    description: "The numbers of the sources chosen in the text, most relevant first.",
    example: r#"{"sources": [3, 1, 4]}"#,
};

/// Extracted list of search queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryList {
    pub queries: Vec<String>,
}

/// Extracted list of 1-based source indices. Signed so that out-of-range
/// values like 0 or -1 parse and can be dropped instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceList {
    pub sources: Vec<i64>,
}

/// What the search loop gathered.
#[derive(Debug, Clone, Default)]
pub struct ResearchOutcome {
    /// Deduplicated documents across every cycle
    pub results: ResultSet,

    /// Every query issued, in order
    pub queries_used: Vec<String>,

    /// Refinement cycles run after the initial search
    pub refinement_cycles: u32,
}

/// A source cited by a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Citation number used in the report text
    pub index: usize,
    pub title: String,
    pub url: String,
}

impl SourceRef {
    /// Number `documents` from 1 in order.
    pub fn enumerate(documents: &ResultSet) -> Vec<SourceRef> {
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| SourceRef {
                index: i + 1,
                title: doc.title.clone(),
                url: doc.url.clone(),
            })
            .collect()
    }
}

/// Final output of a research run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub topic: String,

    /// Markdown report text
    pub report: String,

    /// Sources in citation order
    pub sources: Vec<SourceRef>,

    /// Every search query issued
    pub queries: Vec<String>,

    pub refinement_cycles: u32,

    /// Synthesis re-runs triggered by user feedback
    pub feedback_rounds: u32,
}

impl ResearchReport {
    /// Report for a run that found nothing to work with.
    pub fn no_information(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            report: format!("No information could be found on \"{}\".", topic),
            topic,
            sources: Vec::new(),
            queries: Vec::new(),
            refinement_cycles: 0,
            feedback_rounds: 0,
        }
    }

    /// Whether this report carries any sources.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_search::Document;

    #[test]
    fn test_source_list_accepts_negative_indices() {
        let list: SourceList = serde_json::from_str(r#"{"sources": [-1, 0, 2]}"#).unwrap();
        assert_eq!(list.sources, vec![-1, 0, 2]);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(serde_json::from_str::<QueryList>("{}").is_err());
        assert!(serde_json::from_str::<QueryList>(r#"{"query": ["a"]}"#).is_err());
        assert!(serde_json::from_str::<SourceList>("{}").is_err());
        assert!(serde_json::from_str::<SourceList>(r#"{"source": [1]}"#).is_err());
    }

    #[test]
    fn test_no_information_report() {
        let report = ResearchReport::no_information("deep sea vents");
        assert!(report.report.contains("deep sea vents"));
        assert!(!report.has_sources());
    }

    #[test]
    fn test_enumerate_sources() {
        let docs: ResultSet = vec![
            Document::new("A", "https://a.test", ""),
            Document::new("B", "https://b.test", ""),
        ]
        .into();
        let refs = SourceRef::enumerate(&docs);
        assert_eq!(refs[1].index, 2);
        assert_eq!(refs[1].url, "https://b.test");
    }
}
