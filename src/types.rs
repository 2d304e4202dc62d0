/// A single operation in a line-level edit script.
///
/// Lines keep their terminators (`\n`, or nothing for a final unterminated
/// line) so that concatenating the old side or the new side of a script
/// reproduces the input byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp<'a> {
    /// Line present in both files.
    Equal(&'a str),
    /// Line present only in the new file.
    Insert(&'a str),
    /// Line present only in the old file.
    Delete(&'a str),
}

impl<'a> LineOp<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            LineOp::Equal(t) | LineOp::Insert(t) | LineOp::Delete(t) => t,
        }
    }
}

/// The type of a line within a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

impl LineKind {
    /// Returns the single-character prefix used in unified diff format.
    pub fn prefix(self) -> &'static str {
        match self {
            LineKind::Context => " ",
            LineKind::Added => "+",
            LineKind::Removed => "-",
        }
    }
}

/// A single line within a diff hunk.
///
/// `old_lineno` is set for Removed and Context lines, `new_lineno` for Added
/// and Context lines. Staging status is not stored here; it lives in
/// [`crate::staging::StagingState`], keyed by (hunk index, line index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkLine {
    pub kind: LineKind,
    /// Line content including its terminator, if it had one.
    pub text: String,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
}

/// A contiguous, context-bounded block of line changes between two versions
/// of a text.
///
/// Ranges follow the git unified-diff convention: 1-based starts, counts
/// that include context lines, and a start equal to the number of preceding
/// lines when the count is zero (pure insertion or deletion).
///
/// A hunk is immutable once computed. Recomputing the diff after any content
/// change produces a whole new generation of hunks; indices into the old
/// generation are stale and must not be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// The conventional `@@ -a,b +c,d @@` header for this hunk.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }

    /// Old-side lines (Context + Removed) in order.
    pub fn old_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|l| matches!(l.kind, LineKind::Context | LineKind::Removed))
            .map(|l| l.text.as_str())
    }

    /// New-side lines (Context + Added) in order.
    pub fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|l| matches!(l.kind, LineKind::Context | LineKind::Added))
            .map(|l| l.text.as_str())
    }

    /// Indices of the non-Context lines, the ones that carry staging state.
    pub fn change_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind != LineKind::Context)
            .map(|(i, _)| i)
    }
}

impl std::fmt::Display for Hunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// Staging status of a single changed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Unstaged,
    Staged,
    /// Terminal for the current hunk generation. Set only after the
    /// working-copy write-back has succeeded.
    Discarded,
}

/// Aggregate staging status of a hunk, as reported to callers.
///
/// Line-level operations can leave a hunk mixed; that state is first-class
/// rather than inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkStageStatus {
    Unstaged,
    Staged,
    PartiallyStaged,
}
