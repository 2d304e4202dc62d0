use std::path::PathBuf;

use tracing::debug;

use crate::differ::diff_texts;
use crate::error::{Error, Result};
use crate::grouper::group_hunks;
use crate::inline::{InlinePair, hunk_inline_pairs};
use crate::patch::{Selector, materialize, to_unified_diff};
use crate::staging::StagingState;
use crate::types::{Hunk, HunkStageStatus, StageStatus};

/// Write-back collaborator for the working copy.
///
/// The engine never resolves paths or walks directories itself; it hands a
/// fully materialized buffer to this trait. Invoked only for a hunk discard
/// or an explicit save request.
pub trait WorkingCopy {
    fn write(&mut self, contents: &str) -> std::io::Result<()>;
}

/// Filesystem-backed working copy pointing at a single file.
pub struct FsWorkingCopy {
    path: PathBuf,
}

impl FsWorkingCopy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorkingCopy for FsWorkingCopy {
    fn write(&mut self, contents: &str) -> std::io::Result<()> {
        std::fs::write(&self.path, contents)
    }
}

/// One diff snapshot with its staging state.
///
/// Owns the hunk generation computed for a single (old, new) text pair and
/// the per-line staging state that goes with it. The session is
/// single-writer: it holds no locks, so concurrent mutation must be
/// serialized by the owner. When the underlying content changes, drop the
/// session and build a new one; hunk indices do not survive recomputation.
#[derive(Debug)]
pub struct DiffSession {
    old_text: String,
    new_text: String,
    context_radius: usize,
    hunks: Vec<Hunk>,
    state: StagingState,
}

impl DiffSession {
    /// Diff two text buffers and set up fresh staging state.
    ///
    /// Fails with [`Error::BinaryInput`] when either buffer contains
    /// non-text bytes.
    pub fn new(old_text: &str, new_text: &str, context_radius: usize) -> Result<Self> {
        let ops = diff_texts(old_text, new_text)?;
        let hunks = group_hunks(&ops, context_radius);
        let state = StagingState::new(&hunks);
        debug!(
            hunks = hunks.len(),
            context_radius, "diff session created"
        );
        Ok(Self {
            old_text: old_text.to_string(),
            new_text: new_text.to_string(),
            context_radius,
            hunks,
            state,
        })
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    pub fn context_radius(&self) -> usize {
        self.context_radius
    }

    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Stage every changed line of a hunk.
    pub fn stage_hunk(&mut self, index: usize) -> Result<()> {
        self.state.set_hunk_status(index, StageStatus::Staged)
    }

    /// Unstage every changed line of a hunk.
    pub fn unstage_hunk(&mut self, index: usize) -> Result<()> {
        self.state.set_hunk_status(index, StageStatus::Unstaged)
    }

    /// Stage a single changed line.
    pub fn stage_line(&mut self, hunk: usize, line: usize) -> Result<()> {
        self.state.set_line_status(hunk, line, StageStatus::Staged)
    }

    /// Unstage a single changed line.
    pub fn unstage_line(&mut self, hunk: usize, line: usize) -> Result<()> {
        self.state.set_line_status(hunk, line, StageStatus::Unstaged)
    }

    pub fn hunk_status(&self, index: usize) -> Result<HunkStageStatus> {
        self.state.hunk_status(index)
    }

    pub fn line_status(&self, hunk: usize, line: usize) -> Result<Option<StageStatus>> {
        self.state.line_status(hunk, line)
    }

    pub fn hunk_discarded(&self, index: usize) -> Result<bool> {
        self.state.hunk_discarded(index)
    }

    /// Revert a hunk's changes in the working copy.
    ///
    /// Writes the working text with this hunk excluded, then marks the hunk
    /// Discarded. The transition commits only after the write succeeds; a
    /// failed write leaves the staging state exactly as it was, so state and
    /// file never diverge. Discarding an already-discarded hunk is a no-op
    /// and performs no write.
    pub fn discard_hunk(&mut self, index: usize, copy: &mut dyn WorkingCopy) -> Result<()> {
        if self.state.hunk_discarded(index)? {
            return Ok(());
        }

        let mut next = self.state.clone();
        next.set_hunk_status(index, StageStatus::Discarded)?;
        let text = materialize(&self.old_text, &self.hunks, &next, Selector::Working)?;
        copy.write(&text).map_err(Error::WriteBack)?;

        self.state = next;
        debug!(hunk = index, "hunk discarded and written back");
        Ok(())
    }

    /// The staged projection, i.e. what would go into an index.
    pub fn staged_text(&self) -> Result<String> {
        materialize(&self.old_text, &self.hunks, &self.state, Selector::StagedOnly)
    }

    /// The full working-file content: everything except discarded hunks.
    pub fn working_text(&self) -> Result<String> {
        materialize(&self.old_text, &self.hunks, &self.state, Selector::Working)
    }

    /// Write the materialized working text through the collaborator.
    pub fn save_working(&self, copy: &mut dyn WorkingCopy) -> Result<()> {
        let text = self.working_text()?;
        copy.write(&text).map_err(Error::WriteBack)
    }

    /// Unified diff of the included changes for the given selector.
    pub fn unified_diff(
        &self,
        selector: Selector,
        old_label: &str,
        new_label: &str,
    ) -> Result<String> {
        to_unified_diff(&self.hunks, &self.state, selector, old_label, new_label)
    }

    /// Git-style patch of the staged changes for one file path, directly
    /// consumable by `git apply --cached` or libgit2.
    ///
    /// Empty when nothing is staged.
    pub fn staged_patch(&self, path: &str) -> Result<String> {
        let body = self.unified_diff(
            Selector::StagedOnly,
            &format!("a/{path}"),
            &format!("b/{path}"),
        )?;
        if body.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("diff --git a/{path} b/{path}\n{body}"))
    }

    /// Character-level spans for the modified line pairs of a hunk.
    pub fn inline_pairs(&self, index: usize) -> Result<Vec<InlinePair>> {
        let hunk = self.hunks.get(index).ok_or(Error::HunkOutOfRange {
            index,
            len: self.hunks.len(),
        })?;
        Ok(hunk_inline_pairs(hunk))
    }
}
