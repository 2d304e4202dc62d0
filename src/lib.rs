//! Line-oriented diff and staging engine.
//!
//! Computes minimal line diffs between two text buffers, groups the edits
//! into context-aware hunks, and tracks per-line staging state over them.
//! From that state it synthesizes both full file contents and unified-diff
//! patches, so a caller can stage an arbitrary subset of changes and hand
//! the result to `git apply --cached` (or write it into an index directly).
//!
//! [`session::DiffSession`] ties the pieces together; the lower-level
//! modules are usable on their own.

pub mod differ;
pub mod error;
pub mod grouper;
pub mod inline;
pub mod patch;
pub mod session;
pub mod staging;
pub mod types;

pub use error::{Error, Result};
pub use inline::{InlinePair, InlineSpan};
pub use patch::Selector;
pub use session::{DiffSession, FsWorkingCopy, WorkingCopy};
pub use staging::StagingState;
pub use types::{Hunk, HunkLine, HunkStageStatus, LineKind, LineOp, StageStatus};
