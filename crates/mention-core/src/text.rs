//! Small `char`-offset helpers shared by the host model and the scanner.

pub(crate) fn split_blocks_preserve_trailing(text: &str) -> Vec<String> {
    // `str::split('\n')` keeps trailing empty segments: N newlines => N+1 blocks.
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Number of Unicode scalar values in `text`.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `char_offset`-th scalar value, clamped to `text.len()`.
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// The first `char_count` scalar values of `text` (the whole text if shorter).
pub(crate) fn char_prefix(text: &str, char_count: usize) -> &str {
    &text[..byte_offset(text, char_count)]
}

/// Scalar values `start..end` of `text`, clamped to the text.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    &text[start_byte..end_byte]
}
