//! Candidate filtering.
//!
//! Matching is plain substring containment on (optionally) lowercased text. There is no
//! ranking: the filtered list keeps the source order.

use crate::candidate::Candidate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How matching treats letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSensitivity {
    /// `"Al"` does not match `"alice"`.
    CaseSensitive,
    /// `"Al"` matches `"alice"`.
    #[default]
    CaseInsensitive,
}

impl CaseSensitivity {
    /// Build from a `case_sensitive` flag.
    pub fn from_flag(case_sensitive: bool) -> Self {
        if case_sensitive {
            Self::CaseSensitive
        } else {
            Self::CaseInsensitive
        }
    }

    /// Fold `text` for comparison: identity when case-sensitive, lowercase otherwise.
    pub fn fold<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::CaseSensitive => Cow::Borrowed(text),
            Self::CaseInsensitive => Cow::Owned(text.to_lowercase()),
        }
    }

    /// Whether `text` contains `query` under this fold. An empty query matches everything.
    pub fn contains(self, text: &str, query: &str) -> bool {
        self.fold(text).contains(self.fold(query).as_ref())
    }
}

/// Keep candidates whose text contains `query`, preserving order.
pub fn filter_candidates<C: Candidate + Clone>(
    candidates: &[C],
    query: &str,
    case: CaseSensitivity,
) -> Vec<C> {
    let query = case.fold(query);
    candidates
        .iter()
        .filter(|candidate| case.fold(candidate.text()).contains(query.as_ref()))
        .cloned()
        .collect()
}

/// Whether at least one candidate could match `query`.
///
/// This is the scanner's gate for opening a dropdown at all. It always compares
/// case-insensitively and ignores candidates with empty text.
pub fn suggestion_present<C: Candidate>(candidates: &[C], query: &str) -> bool {
    let query = query.to_lowercase();
    candidates.iter().any(|candidate| {
        let text = candidate.text();
        !text.is_empty() && text.to_lowercase().contains(&query)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::MentionCandidate;

    fn names(items: &[MentionCandidate]) -> Vec<&str> {
        items.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_filter_is_stable_and_case_insensitive_by_default() {
        let list: Vec<MentionCandidate> = ["Alice", "bob", "albert", "Sally"]
            .into_iter()
            .map(MentionCandidate::from)
            .collect();
        let out = filter_candidates(&list, "AL", CaseSensitivity::default());
        assert_eq!(names(&out), vec!["Alice", "albert", "Sally"]);
    }

    #[test]
    fn test_filter_case_sensitive() {
        let list = vec!["Alice", "albert"];
        let out = filter_candidates(&list, "Al", CaseSensitivity::CaseSensitive);
        assert_eq!(out, vec!["Alice"]);
    }

    #[test]
    fn test_empty_query_matches_all() {
        let list = vec!["a", "", "c"];
        assert_eq!(
            filter_candidates(&list, "", CaseSensitivity::CaseInsensitive),
            list
        );
    }

    #[test]
    fn test_presence_skips_empty_text() {
        assert!(!suggestion_present(&[""], ""));
        assert!(suggestion_present(&["", "x"], ""));
        assert!(suggestion_present(&["Alice"], "LI"));
        assert!(!suggestion_present(&["alice"], "bo"));
    }
}
