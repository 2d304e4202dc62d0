use std::fmt::Write as _;

use crate::differ::split_lines;
use crate::error::{Error, Result};
use crate::staging::StagingState;
use crate::types::{Hunk, LineKind, StageStatus};

/// Chooses which line statuses count as "included" during synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Only Staged lines: the projection that goes into an index.
    StagedOnly,
    /// Everything not Discarded: the full working-file content.
    Working,
}

impl Selector {
    pub fn includes(self, status: StageStatus) -> bool {
        match self {
            Selector::StagedOnly => status == StageStatus::Staged,
            Selector::Working => status != StageStatus::Discarded,
        }
    }
}

/// Materialize the text that results from applying the included changes to
/// `base_text`.
///
/// Walks hunks in old-file order. Included Added lines are emitted, included
/// Removed lines are dropped; excluded changes leave the base content in
/// place. Spans between hunks come from `base_text` verbatim. With every
/// line Unstaged under [`Selector::StagedOnly`] the output equals
/// `base_text` byte-for-byte; with every line Staged it equals the new text
/// the hunks were computed from.
///
/// Fails atomically: any validation error returns before a result is
/// produced, and nothing observable is mutated.
pub fn materialize(
    base_text: &str,
    hunks: &[Hunk],
    state: &StagingState,
    selector: Selector,
) -> Result<String> {
    if !state.matches(hunks) {
        return Err(Error::GenerationMismatch);
    }

    let base_lines = split_lines(base_text);
    let mut out = String::with_capacity(base_text.len());
    let mut cursor = 0usize; // 0-based index into base_lines

    for (hunk_index, hunk) in hunks.iter().enumerate() {
        let start = old_span_start(hunk);
        if start < cursor || start > base_lines.len() {
            return Err(Error::GenerationMismatch);
        }

        out.extend(base_lines[cursor..start].iter().copied());
        cursor = start;

        for (line_index, line) in hunk.lines.iter().enumerate() {
            match line.kind {
                LineKind::Context => {
                    if base_lines.get(cursor).copied() != Some(line.text.as_str()) {
                        return Err(Error::GenerationMismatch);
                    }
                    out.push_str(&line.text);
                    cursor += 1;
                }
                LineKind::Removed => {
                    if base_lines.get(cursor).copied() != Some(line.text.as_str()) {
                        return Err(Error::GenerationMismatch);
                    }
                    let status = state
                        .line_status(hunk_index, line_index)?
                        .ok_or(Error::GenerationMismatch)?;
                    if !selector.includes(status) {
                        out.push_str(&line.text);
                    }
                    cursor += 1;
                }
                LineKind::Added => {
                    let status = state
                        .line_status(hunk_index, line_index)?
                        .ok_or(Error::GenerationMismatch)?;
                    if selector.includes(status) {
                        out.push_str(&line.text);
                    }
                }
            }
        }
    }

    out.extend(base_lines[cursor..].iter().copied());
    Ok(out)
}

/// Render the included changes as a unified diff against the base text.
///
/// Excluded Removed lines degrade to context, excluded Added lines drop out
/// entirely, and later hunk headers shift by the cumulative line delta of
/// the included changes before them. Hunks with nothing included are
/// omitted; if nothing at all is included the result is the empty string.
/// Lines without a trailing newline get the conventional
/// `\ No newline at end of file` marker.
pub fn to_unified_diff(
    hunks: &[Hunk],
    state: &StagingState,
    selector: Selector,
    old_label: &str,
    new_label: &str,
) -> Result<String> {
    if !state.matches(hunks) {
        return Err(Error::GenerationMismatch);
    }

    let mut body = String::new();
    let mut offset = 0i64;

    for (hunk_index, hunk) in hunks.iter().enumerate() {
        let mut context = 0i64;
        let mut removed_total = 0i64;
        let mut removed_included = 0i64;
        let mut added_included = 0i64;

        let mut included = vec![false; hunk.lines.len()];
        for (line_index, line) in hunk.lines.iter().enumerate() {
            match line.kind {
                LineKind::Context => context += 1,
                LineKind::Removed | LineKind::Added => {
                    let status = state
                        .line_status(hunk_index, line_index)?
                        .ok_or(Error::GenerationMismatch)?;
                    included[line_index] = selector.includes(status);
                    if line.kind == LineKind::Removed {
                        removed_total += 1;
                        if included[line_index] {
                            removed_included += 1;
                        }
                    } else if included[line_index] {
                        added_included += 1;
                    }
                }
            }
        }

        if removed_included + added_included == 0 {
            continue;
        }

        let old_count = context + removed_total;
        let new_count = context + (removed_total - removed_included) + added_included;
        let old_start = i64::from(hunk.old_start);
        let new_start = if new_count == 0 {
            old_start + offset - 1
        } else if old_count == 0 {
            old_start + offset + 1
        } else {
            old_start + offset
        };

        let _ = writeln!(
            body,
            "@@ -{old_start},{old_count} +{new_start},{new_count} @@"
        );

        for (line_index, line) in hunk.lines.iter().enumerate() {
            let prefix = match line.kind {
                LineKind::Context => " ",
                LineKind::Removed if included[line_index] => "-",
                LineKind::Removed => " ", // excluded removal stays as context
                LineKind::Added if included[line_index] => "+",
                LineKind::Added => continue,
            };
            body.push_str(prefix);
            body.push_str(&line.text);
            if !line.text.ends_with('\n') {
                body.push_str("\n\\ No newline at end of file\n");
            }
        }

        offset += added_included - removed_included;
    }

    if body.is_empty() {
        return Ok(String::new());
    }

    Ok(format!("--- {old_label}\n+++ {new_label}\n{body}"))
}

/// 0-based index of the first base line covered by the hunk. For a
/// zero-count old range the start field already names the line before the
/// insertion point.
fn old_span_start(hunk: &Hunk) -> usize {
    if hunk.old_count > 0 {
        hunk.old_start as usize - 1
    } else {
        hunk.old_start as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::diff_texts;
    use crate::grouper::group_hunks;

    fn session_parts(old: &str, new: &str, radius: usize) -> (Vec<Hunk>, StagingState) {
        let ops = diff_texts(old, new).unwrap();
        let hunks = group_hunks(&ops, radius);
        let state = StagingState::new(&hunks);
        (hunks, state)
    }

    #[test]
    fn test_all_unstaged_reproduces_old() {
        let old = "a\nb\nc\nd\n";
        let new = "a\nx\nc\ny\n";
        let (hunks, state) = session_parts(old, new, 1);
        let out = materialize(old, &hunks, &state, Selector::StagedOnly).unwrap();
        assert_eq!(out, old);
    }

    #[test]
    fn test_all_staged_reproduces_new() {
        let old = "a\nb\nc\nd\n";
        let new = "a\nx\nc\ny\nz\n";
        let (hunks, mut state) = session_parts(old, new, 1);
        for i in 0..hunks.len() {
            state.set_hunk_status(i, StageStatus::Staged).unwrap();
        }
        let out = materialize(old, &hunks, &state, Selector::StagedOnly).unwrap();
        assert_eq!(out, new);
    }

    #[test]
    fn test_working_selector_excludes_only_discarded() {
        let old: String = (1..=20).map(|i| format!("line{i}\n")).collect();
        let new = old.replace("line4\n", "LINE4\n").replace("line15\n", "LINE15\n");
        let (hunks, mut state) = session_parts(&old, &new, 2);
        assert_eq!(hunks.len(), 2);

        state.set_hunk_status(0, StageStatus::Discarded).unwrap();
        let out = materialize(&old, &hunks, &state, Selector::Working).unwrap();
        assert!(out.contains("line4\n"), "discarded hunk reverts");
        assert!(out.contains("LINE15\n"), "other hunk kept");
    }

    #[test]
    fn test_stage_one_of_two_hunks() {
        let old: String = (1..=20).map(|i| format!("line{i}\n")).collect();
        let new = old.replace("line4\n", "LINE4\n").replace("line15\n", "LINE15\n");
        let (hunks, mut state) = session_parts(&old, &new, 2);
        state.set_hunk_status(1, StageStatus::Staged).unwrap();

        let out = materialize(&old, &hunks, &state, Selector::StagedOnly).unwrap();
        let expected = old.replace("line15\n", "LINE15\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_line_level_partial_materialization() {
        let old = "a\nb\nc\n";
        let new = "a\nX\nY\nc\n";
        let (hunks, mut state) = session_parts(old, new, 0);
        // Hunk lines: Removed b, Added X, Added Y. Stage only the removal
        // and the first insertion.
        state.set_line_status(0, 0, StageStatus::Staged).unwrap();
        state.set_line_status(0, 1, StageStatus::Staged).unwrap();

        let out = materialize(old, &hunks, &state, Selector::StagedOnly).unwrap();
        assert_eq!(out, "a\nX\nc\n");
    }

    #[test]
    fn test_unterminated_final_line_round_trip() {
        let old = "a\nb";
        let new = "a\nB";
        let (hunks, mut state) = session_parts(old, new, 0);

        let out = materialize(old, &hunks, &state, Selector::StagedOnly).unwrap();
        assert_eq!(out, old);

        state.set_hunk_status(0, StageStatus::Staged).unwrap();
        let out = materialize(old, &hunks, &state, Selector::StagedOnly).unwrap();
        assert_eq!(out, new);
    }

    #[test]
    fn test_materialize_rejects_wrong_generation() {
        let (hunks, _) = session_parts("a\nb\n", "a\nx\n", 0);
        let (_, other_state) = session_parts("a\nb\nc\n", "a\nx\nc\n", 1);
        let err = materialize("a\nb\n", &hunks, &other_state, Selector::Working).unwrap_err();
        assert!(matches!(err, Error::GenerationMismatch));
    }

    #[test]
    fn test_materialize_rejects_wrong_base() {
        let (hunks, state) = session_parts("a\nb\nc\n", "a\nx\nc\n", 1);
        let err = materialize("totally\ndifferent\n", &hunks, &state, Selector::Working).unwrap_err();
        assert!(matches!(err, Error::GenerationMismatch));
    }

    #[test]
    fn test_unified_diff_all_staged_single_hunk() {
        let old = "a\nb\nc\n";
        let new = "a\nx\nc\n";
        let (hunks, mut state) = session_parts(old, new, 1);
        state.set_hunk_status(0, StageStatus::Staged).unwrap();

        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        assert_eq!(
            patch,
            "--- a/f\n+++ b/f\n@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n"
        );
    }

    #[test]
    fn test_unified_diff_nothing_included_is_empty() {
        let (hunks, state) = session_parts("a\nb\n", "a\nx\n", 1);
        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_unified_diff_offsets_shift_later_hunks() {
        let old: String = (1..=20).map(|i| format!("line{i}\n")).collect();
        // First hunk inserts a line, second modifies one further down.
        let new = old
            .replace("line4\n", "line4\nline4b\n")
            .replace("line15\n", "LINE15\n");
        let (hunks, mut state) = session_parts(&old, &new, 1);
        assert_eq!(hunks.len(), 2);
        for i in 0..hunks.len() {
            state.set_hunk_status(i, StageStatus::Staged).unwrap();
        }

        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        assert!(patch.contains("@@ -4,2 +4,3 @@"));
        // Second hunk's new side is shifted down by the inserted line.
        assert!(patch.contains("@@ -14,3 +15,3 @@"));
    }

    #[test]
    fn test_unified_diff_partial_hunk_degrades_excluded_lines() {
        let old = "a\nb\nc\n";
        let new = "a\nX\nY\nc\n";
        let (hunks, mut state) = session_parts(old, new, 0);
        // Lines: Removed b, Added X, Added Y. Stage only the added X.
        state.set_line_status(0, 1, StageStatus::Staged).unwrap();

        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        // The unstaged removal shows as context; the unstaged Y is absent.
        assert_eq!(
            patch,
            "--- a/f\n+++ b/f\n@@ -2,1 +2,2 @@\n b\n+X\n"
        );
    }

    #[test]
    fn test_unified_diff_no_newline_marker() {
        let old = "a\nb";
        let new = "a\nB";
        let (hunks, mut state) = session_parts(old, new, 0);
        state.set_hunk_status(0, StageStatus::Staged).unwrap();

        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        assert_eq!(
            patch,
            "--- a/f\n+++ b/f\n@@ -2,1 +2,1 @@\n-b\n\\ No newline at end of file\n+B\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn test_unified_diff_pure_insertion_header() {
        let old = "a\nb\n";
        let new = "a\nb\nc\n";
        let (hunks, mut state) = session_parts(old, new, 0);
        state.set_hunk_status(0, StageStatus::Staged).unwrap();

        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        assert_eq!(patch, "--- a/f\n+++ b/f\n@@ -2,0 +3,1 @@\n+c\n");
    }

    #[test]
    fn test_unified_diff_pure_deletion_header() {
        let old = "a\nb\n";
        let new = "b\n";
        let (hunks, mut state) = session_parts(old, new, 0);
        state.set_hunk_status(0, StageStatus::Staged).unwrap();

        let patch = to_unified_diff(&hunks, &state, Selector::StagedOnly, "a/f", "b/f").unwrap();
        assert_eq!(patch, "--- a/f\n+++ b/f\n@@ -1,1 +0,0 @@\n-a\n");
    }
}
