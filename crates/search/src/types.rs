//! Search result types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest query, in characters, sent to a search provider.
pub const MAX_QUERY_CHARS: usize = 400;

/// First `max_chars` characters of `text`.
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// character. Shorter text is returned unchanged.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Truncate a query to [`MAX_QUERY_CHARS`] characters.
pub fn truncate_query(query: &str) -> String {
    truncate_chars(query, MAX_QUERY_CHARS)
}

/// A fetched web document.
///
/// `url` is the identity of a document: two documents with the same URL are
/// the same source regardless of their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Page title
    pub title: String,

    /// Canonical link, used as the dedup key
    pub url: String,

    /// Text extracted by the search provider (may be empty)
    #[serde(default)]
    pub raw_text: String,

    /// Model-written summary, absent when there was no text to summarize
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Document {
    /// Create a document without a summary.
    pub fn new(title: impl Into<String>, url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            raw_text: raw_text.into(),
            summary: None,
        }
    }

    /// Attach a summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Whether the provider returned any text for this document.
    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    /// Best available content: the summary if present, else the raw text.
    pub fn content(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.raw_text)
    }
}

/// Ordered collection of documents in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    documents: Vec<Document>,
}

impl ResultSet {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `other` after the documents already held.
    ///
    /// Plain concatenation: duplicates are kept until [`ResultSet::dedup`].
    pub fn add(mut self, other: ResultSet) -> Self {
        self.documents.extend(other.documents);
        self
    }

    /// Keep the first document for every URL, preserving order.
    pub fn dedup(mut self) -> Self {
        let mut seen = HashSet::with_capacity(self.documents.len());
        self.documents.retain(|doc| seen.insert(doc.url.clone()));
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Document at a 0-based position.
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl From<Vec<Document>> for ResultSet {
    fn from(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

impl FromIterator<Document> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
