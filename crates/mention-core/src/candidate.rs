//! Mention candidates.
//!
//! The engine only needs a candidate's display text. Everything else a caller attaches (user
//! ids, URLs, avatars) is an opaque payload handed to the insertion operation unchanged.

use crate::error::MentionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Anything that can be offered as a mention suggestion.
pub trait Candidate {
    /// Text matched against the query and shown in the dropdown.
    fn text(&self) -> &str;
}

/// A JSON-shaped candidate: a `text` field plus arbitrary extra fields.
///
/// ```rust
/// use mention_core::{Candidate, MentionCandidate};
///
/// let items = MentionCandidate::list_from_json(
///     r#"[{"text": "alice", "value": "@alice:example.org"}]"#,
/// ).unwrap();
/// assert_eq!(items[0].text(), "alice");
/// assert_eq!(items[0].field("value").and_then(|v| v.as_str()), Some("@alice:example.org"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MentionCandidate {
    /// Display text.
    pub text: String,
    /// Extra fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MentionCandidate {
    /// Create a candidate without extra fields.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Look up an extra field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Parse a JSON array of candidate objects.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, MentionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON array of candidate objects from a file.
    pub fn list_from_path(path: impl AsRef<Path>) -> Result<Vec<Self>, MentionError> {
        let json = std::fs::read_to_string(path)?;
        Self::list_from_json(&json)
    }
}

impl Candidate for MentionCandidate {
    fn text(&self) -> &str {
        &self.text
    }
}

impl Candidate for String {
    fn text(&self) -> &str {
        self
    }
}

impl Candidate for &str {
    fn text(&self) -> &str {
        self
    }
}

impl From<&str> for MentionCandidate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
