use crate::types::StageStatus;

/// Typed failures reported by the engine.
///
/// None of these are retried internally; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-text content was passed to the differ. Diffing binary data would
    /// silently produce garbage hunks, so this fails fast instead.
    #[error("input is not text: NUL byte at offset {offset}")]
    BinaryInput { offset: usize },

    /// Hunk index not present in the current generation, typically a stale
    /// index held across a recompute.
    #[error("hunk index {index} out of range ({len} hunks in this generation)")]
    HunkOutOfRange { index: usize, len: usize },

    /// Line index not present in the addressed hunk.
    #[error("line index {line} out of range for hunk {hunk} ({len} lines)")]
    LineOutOfRange {
        hunk: usize,
        line: usize,
        len: usize,
    },

    /// The requested staging transition is not allowed, e.g. staging a line
    /// that was already discarded, or addressing a context line.
    #[error("invalid staging transition to {to:?} in hunk {hunk}: {reason}")]
    InvalidTransition {
        hunk: usize,
        to: StageStatus,
        reason: String,
    },

    /// The staging state was built for a different hunk generation than the
    /// one it is being applied to.
    #[error("staging state does not match the current hunk generation")]
    GenerationMismatch,

    /// The working-copy write-back for a discard or save failed. The staging
    /// state is left untouched when this is returned.
    #[error("failed to write back working copy")]
    WriteBack(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
