use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while building a mention-suggestion configuration.
///
/// Runtime interaction never fails: a missing editor state, an empty candidate list or an
/// out-of-range selection all degrade to "no dropdown".
pub enum MentionError {
    #[error("separator must not be empty")]
    /// The trigger separator was an empty string.
    EmptySeparator,

    #[error("JSON parse error: {0}")]
    /// Options or candidates failed to parse.
    InvalidJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// An options or candidate file could not be read.
    Io(#[from] std::io::Error),
}
