//! Host editor abstraction.
//!
//! The mention engine never owns the document. It reads immutable snapshots through the
//! [`EditorState`] trait: a selection (anchor/focus block keys and offsets) plus a way to
//! resolve a block's text by key.
//!
//! [`BlockDocument`] is a small in-memory implementation of that model. Hosts with their own
//! document kernel implement [`EditorState`] directly; tests and the demo use `BlockDocument`.
//!
//! All offsets are Unicode scalar values (`char`) from the start of a block.

use crate::text::{byte_offset, char_len, split_blocks_preserve_trailing};
use std::fmt;
use std::ops::Range;

/// Stable identity of a text block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey(String);

impl BlockKey {
    /// Create a block key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A single block (paragraph) of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    key: BlockKey,
    text: String,
}

impl ContentBlock {
    /// Create a block.
    pub fn new(key: impl Into<BlockKey>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }

    /// Block key.
    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    /// Block text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Block length in `char`s.
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

/// Selection expressed as an anchor and a focus, each a (block key, offset) pair.
///
/// The focus is the end that moves; for a simple caret both ends are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    /// Block holding the anchor.
    pub anchor_key: BlockKey,
    /// Anchor offset within `anchor_key`.
    pub anchor_offset: usize,
    /// Block holding the focus.
    pub focus_key: BlockKey,
    /// Focus offset within `focus_key`.
    pub focus_offset: usize,
}

impl SelectionState {
    /// A collapsed selection (caret) at `offset` in block `key`.
    pub fn caret(key: impl Into<BlockKey>, offset: usize) -> Self {
        let key = key.into();
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
        }
    }

    /// A range selection.
    pub fn range(
        anchor_key: impl Into<BlockKey>,
        anchor_offset: usize,
        focus_key: impl Into<BlockKey>,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key: anchor_key.into(),
            anchor_offset,
            focus_key: focus_key.into(),
            focus_offset,
        }
    }

    /// Anchor and focus lie in the same block.
    pub fn is_within_single_block(&self) -> bool {
        self.anchor_key == self.focus_key
    }

    /// Anchor and focus are the same position.
    pub fn is_collapsed(&self) -> bool {
        self.is_within_single_block() && self.anchor_offset == self.focus_offset
    }
}

/// Read-only view of the host editor state.
pub trait EditorState {
    /// Current selection.
    fn selection(&self) -> &SelectionState;

    /// Resolve a block by key.
    fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock>;

    /// The block holding the selection focus, if it exists.
    fn focused_block(&self) -> Option<&ContentBlock> {
        self.block_for_key(&self.selection().focus_key)
    }
}

/// An in-memory block document with a single selection.
///
/// Block keys are generated (`b0`, `b1`, ...) and never reused, so a key stays stable while
/// its block exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDocument {
    blocks: Vec<ContentBlock>,
    selection: SelectionState,
    next_key: u64,
}

impl BlockDocument {
    /// Build a document from text, one block per line, with the caret at the very end.
    pub fn from_text(text: &str) -> Self {
        let lines = split_blocks_preserve_trailing(text);
        let mut next_key = 0u64;
        let blocks: Vec<ContentBlock> = lines
            .into_iter()
            .map(|line| {
                let key = BlockKey::new(format!("b{next_key}"));
                next_key += 1;
                ContentBlock::new(key, line)
            })
            .collect();

        // `split` always yields at least one segment.
        let last = &blocks[blocks.len() - 1];
        let selection = SelectionState::caret(last.key().clone(), last.char_len());

        Self {
            blocks,
            selection,
            next_key,
        }
    }

    /// Create an empty document (one empty block).
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// All blocks in document order.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Index of the block with `key`.
    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| block.key() == key)
    }

    /// Document text with blocks joined by `\n`.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(ContentBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the selection. Offsets are clamped to their blocks; unknown keys are ignored.
    pub fn select(&mut self, selection: SelectionState) -> bool {
        let (Some(anchor_len), Some(focus_len)) = (
            self.block_for_key(&selection.anchor_key)
                .map(ContentBlock::char_len),
            self.block_for_key(&selection.focus_key)
                .map(ContentBlock::char_len),
        ) else {
            return false;
        };

        self.selection = SelectionState {
            anchor_offset: selection.anchor_offset.min(anchor_len),
            focus_offset: selection.focus_offset.min(focus_len),
            ..selection
        };
        true
    }

    /// Place a collapsed caret at `offset` (clamped) in block `index`.
    pub fn set_caret(&mut self, index: usize, offset: usize) -> bool {
        let Some(block) = self.blocks.get(index) else {
            return false;
        };
        self.selection = SelectionState::caret(block.key().clone(), offset.min(block.char_len()));
        true
    }

    /// Caret position as (block index, offset), using the selection focus.
    pub fn caret(&self) -> (usize, usize) {
        let index = self.block_index(&self.selection.focus_key).unwrap_or(0);
        (index, self.selection.focus_offset)
    }

    /// Insert text at the caret. A non-collapsed selection within one block is replaced; a
    /// selection spanning blocks collapses to its focus first. `\n` splits blocks.
    pub fn insert_text(&mut self, text: &str) {
        let (index, mut offset) = self.caret();
        if self.selection.is_within_single_block() && !self.selection.is_collapsed() {
            let (anchor, focus) = (self.selection.anchor_offset, self.selection.focus_offset);
            let (start, end) = (anchor.min(focus), anchor.max(focus));
            self.replace_in_block(index, start..end, "");
            offset = start;
        }

        let mut segments = text.split('\n');
        if let Some(first) = segments.next() {
            offset = self.replace_in_block(index, offset..offset, first);
        }
        let (mut index, mut offset) = (index, offset);
        for segment in segments {
            self.set_caret(index, offset);
            self.split_block();
            index += 1;
            offset = self.replace_in_block(index, 0..0, segment);
        }
        self.set_caret(index, offset);
    }

    /// Split the caret block at the caret; the caret moves to the start of the new block.
    pub fn split_block(&mut self) {
        let (index, offset) = self.caret();
        let key = self.fresh_key();
        let block = &mut self.blocks[index];
        let split_at = byte_offset(&block.text, offset);
        let tail = block.text.split_off(split_at);
        self.blocks.insert(index + 1, ContentBlock::new(key, tail));
        self.set_caret(index + 1, 0);
    }

    /// Delete the char before the caret, merging with the previous block at offset 0.
    pub fn backspace(&mut self) {
        let (index, offset) = self.caret();
        if offset > 0 {
            self.replace_in_block(index, offset - 1..offset, "");
            self.set_caret(index, offset - 1);
        } else if index > 0 {
            let removed = self.blocks.remove(index);
            let previous = &mut self.blocks[index - 1];
            let join_at = previous.char_len();
            previous.text.push_str(removed.text());
            self.set_caret(index - 1, join_at);
        }
    }

    /// Replace `range` (clamped) in block `key` with `text` and put the caret after it.
    ///
    /// Returns the new caret offset, or `None` if the block does not exist.
    pub fn replace_range(
        &mut self,
        key: &BlockKey,
        range: Range<usize>,
        text: &str,
    ) -> Option<usize> {
        let index = self.block_index(key)?;
        let caret = self.replace_in_block(index, range, text);
        self.set_caret(index, caret);
        Some(caret)
    }

    /// Move the caret one char left, crossing into the previous block at its start.
    pub fn move_left(&mut self) {
        let (index, offset) = self.caret();
        if offset > 0 {
            self.set_caret(index, offset - 1);
        } else if index > 0 {
            let len = self.blocks[index - 1].char_len();
            self.set_caret(index - 1, len);
        }
    }

    /// Move the caret one char right, crossing into the next block at its end.
    pub fn move_right(&mut self) {
        let (index, offset) = self.caret();
        if offset < self.blocks[index].char_len() {
            self.set_caret(index, offset + 1);
        } else if index + 1 < self.blocks.len() {
            self.set_caret(index + 1, 0);
        }
    }

    /// Move the caret to the same offset (clamped) in the previous block.
    pub fn move_up(&mut self) {
        let (index, offset) = self.caret();
        if index > 0 {
            self.set_caret(index - 1, offset);
        }
    }

    /// Move the caret to the same offset (clamped) in the next block.
    pub fn move_down(&mut self) {
        let (index, offset) = self.caret();
        self.set_caret(index + 1, offset);
    }

    /// Move the caret to the start of its block.
    pub fn move_home(&mut self) {
        let (index, _) = self.caret();
        self.set_caret(index, 0);
    }

    /// Move the caret to the end of its block.
    pub fn move_end(&mut self) {
        let (index, _) = self.caret();
        let len = self.blocks[index].char_len();
        self.set_caret(index, len);
    }

    fn replace_in_block(&mut self, index: usize, range: Range<usize>, text: &str) -> usize {
        let block = &mut self.blocks[index];
        let len = block.char_len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        let start_byte = byte_offset(&block.text, start);
        let end_byte = byte_offset(&block.text, end);
        block.text.replace_range(start_byte..end_byte, text);
        start + char_len(text)
    }

    fn fresh_key(&mut self) -> BlockKey {
        let key = BlockKey::new(format!("b{}", self.next_key));
        self.next_key += 1;
        key
    }
}

impl Default for BlockDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl EditorState for BlockDocument {
    fn selection(&self) -> &SelectionState {
        &self.selection
    }

    fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks.iter().find(|block| block.key() == key)
    }
}
