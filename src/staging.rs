use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Hunk, HunkStageStatus, LineKind, StageStatus};

/// Per-generation staging state: one status slot per changed line of every
/// hunk.
///
/// Created fresh alongside each hunk generation, with every changed line
/// Unstaged. Context lines carry no status (they are treated as present on
/// both sides during synthesis). The state is owned by the session that
/// requested the diff and must be replaced whenever the hunks are
/// recomputed; it refuses to be applied to a different generation.
///
/// Staging and unstaging are pure state mutations. Marking lines Discarded
/// is also pure here; the working-copy write-back that a discard implies is
/// coordinated by [`crate::session::DiffSession`], which commits the
/// transition only after the write succeeds.
#[derive(Debug, Clone)]
pub struct StagingState {
    /// One entry per hunk; `None` slots are context lines.
    hunks: Vec<Vec<Option<StageStatus>>>,
}

impl StagingState {
    /// Fresh state for a hunk generation, everything Unstaged.
    pub fn new(hunks: &[Hunk]) -> Self {
        let hunks = hunks
            .iter()
            .map(|hunk| {
                hunk.lines
                    .iter()
                    .map(|line| match line.kind {
                        LineKind::Context => None,
                        LineKind::Added | LineKind::Removed => Some(StageStatus::Unstaged),
                    })
                    .collect()
            })
            .collect();
        Self { hunks }
    }

    pub fn hunk_count(&self) -> usize {
        self.hunks.len()
    }

    /// Whether this state was built for the given hunk generation. Checks
    /// hunk count and per-hunk line counts.
    pub fn matches(&self, hunks: &[Hunk]) -> bool {
        self.hunks.len() == hunks.len()
            && self
                .hunks
                .iter()
                .zip(hunks)
                .all(|(slots, hunk)| slots.len() == hunk.lines.len())
    }

    /// Apply a status to every changed line of a hunk, atomically.
    ///
    /// Staging or unstaging a hunk that contains any Discarded line is an
    /// invalid transition and leaves the state untouched. Discarding is
    /// idempotent and allowed from any line state.
    pub fn set_hunk_status(&mut self, hunk: usize, status: StageStatus) -> Result<()> {
        let slots = self.hunk_slots(hunk)?;

        if status != StageStatus::Discarded
            && slots.iter().flatten().any(|s| *s == StageStatus::Discarded)
        {
            return Err(Error::InvalidTransition {
                hunk,
                to: status,
                reason: "hunk contains discarded lines".to_string(),
            });
        }

        for slot in self.hunks[hunk].iter_mut().flatten() {
            *slot = status;
        }
        debug!(hunk, ?status, "hunk status set");
        Ok(())
    }

    /// Apply a status to a single changed line.
    ///
    /// Context lines cannot be addressed, and a Discarded line only accepts
    /// the (no-op) Discarded status again.
    pub fn set_line_status(&mut self, hunk: usize, line: usize, status: StageStatus) -> Result<()> {
        let slots = self.hunk_slots(hunk)?;
        let len = slots.len();
        let slot = slots
            .get(line)
            .copied()
            .ok_or(Error::LineOutOfRange { hunk, line, len })?;

        match slot {
            None => Err(Error::InvalidTransition {
                hunk,
                to: status,
                reason: format!("line {line} is a context line"),
            }),
            Some(StageStatus::Discarded) if status != StageStatus::Discarded => {
                Err(Error::InvalidTransition {
                    hunk,
                    to: status,
                    reason: format!("line {line} was already discarded"),
                })
            }
            Some(_) => {
                self.hunks[hunk][line] = Some(status);
                Ok(())
            }
        }
    }

    /// Aggregate status of a hunk.
    ///
    /// Discarded lines are excluded from the aggregation: a discard is an
    /// unstage plus a working-copy revert, so a fully discarded hunk reports
    /// Unstaged. A mix of Staged and Unstaged among the remaining lines
    /// reports PartiallyStaged.
    pub fn hunk_status(&self, hunk: usize) -> Result<HunkStageStatus> {
        let slots = self.hunk_slots(hunk)?;
        let active: Vec<StageStatus> = slots
            .iter()
            .flatten()
            .copied()
            .filter(|s| *s != StageStatus::Discarded)
            .collect();

        if active.is_empty() || active.iter().all(|s| *s == StageStatus::Unstaged) {
            Ok(HunkStageStatus::Unstaged)
        } else if active.iter().all(|s| *s == StageStatus::Staged) {
            Ok(HunkStageStatus::Staged)
        } else {
            Ok(HunkStageStatus::PartiallyStaged)
        }
    }

    /// Status of a single line; `None` for context lines.
    pub fn line_status(&self, hunk: usize, line: usize) -> Result<Option<StageStatus>> {
        let slots = self.hunk_slots(hunk)?;
        let len = slots.len();
        slots
            .get(line)
            .copied()
            .ok_or(Error::LineOutOfRange { hunk, line, len })
    }

    /// Whether every changed line of the hunk has been discarded.
    pub fn hunk_discarded(&self, hunk: usize) -> Result<bool> {
        let slots = self.hunk_slots(hunk)?;
        Ok(slots.iter().flatten().all(|s| *s == StageStatus::Discarded))
    }

    fn hunk_slots(&self, hunk: usize) -> Result<&Vec<Option<StageStatus>>> {
        self.hunks.get(hunk).ok_or(Error::HunkOutOfRange {
            index: hunk,
            len: self.hunks.len(),
        })
    }
}
