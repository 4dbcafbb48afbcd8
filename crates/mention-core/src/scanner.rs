//! Trigger-span detection.
//!
//! On every selection or text change the host asks, for the block holding the caret, whether
//! the caret sits inside a mention query. The answer is a [`MatchRegion`] (the span a host
//! decorates and hands to the popup as its query) or `None`.
//!
//! The scan looks back from the caret for the last separator, then gates on whether any
//! candidate could match the typed query at all, so a dropdown never opens for a query with
//! zero possible matches.

use crate::candidate::Candidate;
use crate::filter::suggestion_present;
use crate::host::{ContentBlock, SelectionState};
use crate::text::{char_len, char_prefix, char_slice};

/// A `start..end` char range inside one block's text.
///
/// Invariant: `start <= end <= block length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchRegion {
    /// Range start (inclusive).
    pub start: usize,
    /// Range end (exclusive).
    pub end: usize,
}

impl MatchRegion {
    /// Create a region; `end` is raised to `start` if smaller.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Length in chars.
    ///
    /// A region built with `end < start` through its public fields counts as empty.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the region covers no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered text of `block_text`.
    pub fn text<'a>(&self, block_text: &'a str) -> &'a str {
        char_slice(block_text, self.start, self.end)
    }
}

/// Exclusive end of the text probed for a trigger.
///
/// The caret is evaluated against the text up to and including the char just typed, i.e.
/// one char past the caret, clamped to the block.
pub fn probe_end(text_len: usize, caret: usize) -> usize {
    caret.saturating_add(1).min(text_len)
}

/// Find the mention query around the caret in `block`.
///
/// Returns `None` unless the selection is a caret inside `block`. When no separator precedes
/// the caret but the probed text is non-empty, the scan falls back to treating position `0`
/// as the separator position, so a query can start at the beginning of a block.
pub fn find_match_region<C: Candidate>(
    block: &ContentBlock,
    selection: &SelectionState,
    separator: &str,
    candidates: &[C],
) -> Option<MatchRegion> {
    if selection.anchor_key != *block.key() || !selection.is_collapsed() {
        return None;
    }

    let text = block.text();
    let end = probe_end(char_len(text), selection.focus_offset);
    let probed = char_prefix(text, end);

    let sep_index = match probed.rfind(separator) {
        Some(byte) => char_len(&probed[..byte]),
        None if !probed.is_empty() => 0,
        None => return None,
    };

    let query = char_slice(probed, sep_index + char_len(separator), end);
    if !suggestion_present(candidates, query) {
        return None;
    }

    let start = if sep_index == 0 { 0 } else { sep_index + 1 };
    Some(MatchRegion::new(start, end))
}
