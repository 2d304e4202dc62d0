use similar::{Algorithm, DiffOp, capture_diff_slices};

use crate::types::{Hunk, LineKind};

/// A fragment of a line, flagged as changed or unchanged relative to its
/// partner line. Concatenating a line's spans in order reproduces the line
/// exactly, with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    pub text: String,
    pub changed: bool,
}

/// Character-level spans for a modified line pair.
///
/// The paired (Removed, Added) line indices within a hunk, plus the spans
/// for each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePair {
    pub removed_line: usize,
    pub added_line: usize,
    pub removed_spans: Vec<InlineSpan>,
    pub added_spans: Vec<InlineSpan>,
}

/// Compute character-level change spans for a (removed, added) line pair.
///
/// Same Myers edit-script technique as the line differ, over characters.
/// Both returned span sequences cover their input completely.
pub fn inline_spans(removed: &str, added: &str) -> (Vec<InlineSpan>, Vec<InlineSpan>) {
    let old_chars: Vec<char> = removed.chars().collect();
    let new_chars: Vec<char> = added.chars().collect();

    let mut removed_spans = Vec::new();
    let mut added_spans = Vec::new();

    for op in capture_diff_slices(Algorithm::Myers, &old_chars, &new_chars) {
        match op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                push_span(&mut removed_spans, &old_chars[old_index..old_index + len], false);
                push_span(&mut added_spans, &new_chars[new_index..new_index + len], false);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                push_span(&mut removed_spans, &old_chars[old_index..old_index + old_len], true);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                push_span(&mut added_spans, &new_chars[new_index..new_index + new_len], true);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                push_span(&mut removed_spans, &old_chars[old_index..old_index + old_len], true);
                push_span(&mut added_spans, &new_chars[new_index..new_index + new_len], true);
            }
        }
    }

    (removed_spans, added_spans)
}

/// Pair up modified lines within a hunk and compute their spans.
///
/// Lines are paired by position: each maximal Removed run that is
/// immediately followed by an Added run contributes `min(run lengths)`
/// pairs. Surplus lines on the longer side get no spans; callers render
/// them as plain Removed/Added blocks. No alignment beyond position is
/// attempted, best-effort highlighting is acceptable here.
pub fn hunk_inline_pairs(hunk: &Hunk) -> Vec<InlinePair> {
    let mut pairs = Vec::new();
    let lines = &hunk.lines;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].kind != LineKind::Removed {
            i += 1;
            continue;
        }

        let removed_start = i;
        while i < lines.len() && lines[i].kind == LineKind::Removed {
            i += 1;
        }
        let added_start = i;
        while i < lines.len() && lines[i].kind == LineKind::Added {
            i += 1;
        }

        let removed_len = added_start - removed_start;
        let added_len = i - added_start;
        for offset in 0..removed_len.min(added_len) {
            let removed_line = removed_start + offset;
            let added_line = added_start + offset;
            let (removed_spans, added_spans) =
                inline_spans(&lines[removed_line].text, &lines[added_line].text);
            pairs.push(InlinePair {
                removed_line,
                added_line,
                removed_spans,
                added_spans,
            });
        }
    }

    pairs
}

/// Append a span, merging into the previous one when the changed flag
/// matches.
fn push_span(spans: &mut Vec<InlineSpan>, chars: &[char], changed: bool) {
    if chars.is_empty() {
        return;
    }
    let text: String = chars.iter().collect();
    match spans.last_mut() {
        Some(last) if last.changed == changed => last.text.push_str(&text),
        _ => spans.push(InlineSpan { text, changed }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::diff_texts;
    use crate::grouper::group_hunks;

    fn concat(spans: &[InlineSpan]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_spans_cover_input_exactly() {
        let (removed, added) = inline_spans("let x = old_value;", "let x = new_value;");
        assert_eq!(concat(&removed), "let x = old_value;");
        assert_eq!(concat(&added), "let x = new_value;");
    }

    #[test]
    fn test_changed_region_is_flagged() {
        let (removed, added) = inline_spans("abcdef", "abXYef");
        assert_eq!(
            removed,
            vec![
                InlineSpan { text: "ab".into(), changed: false },
                InlineSpan { text: "cd".into(), changed: true },
                InlineSpan { text: "ef".into(), changed: false },
            ]
        );
        assert_eq!(
            added,
            vec![
                InlineSpan { text: "ab".into(), changed: false },
                InlineSpan { text: "XY".into(), changed: true },
                InlineSpan { text: "ef".into(), changed: false },
            ]
        );
    }

    #[test]
    fn test_identical_lines_single_unchanged_span() {
        let (removed, added) = inline_spans("same", "same");
        assert_eq!(removed.len(), 1);
        assert!(!removed[0].changed);
        assert_eq!(added, removed);
    }

    #[test]
    fn test_completely_different_lines() {
        let (removed, added) = inline_spans("aaa", "zzz");
        assert_eq!(concat(&removed), "aaa");
        assert_eq!(concat(&added), "zzz");
        assert!(removed.iter().all(|s| s.changed));
        assert!(added.iter().all(|s| s.changed));
    }

    #[test]
    fn test_empty_sides() {
        let (removed, added) = inline_spans("", "added");
        assert!(removed.is_empty());
        assert_eq!(concat(&added), "added");

        let (removed, added) = inline_spans("gone", "");
        assert_eq!(concat(&removed), "gone");
        assert!(added.is_empty());
    }

    #[test]
    fn test_multibyte_content() {
        let (removed, added) = inline_spans("héllo wörld", "héllo wørld");
        assert_eq!(concat(&removed), "héllo wörld");
        assert_eq!(concat(&added), "héllo wørld");
    }

    #[test]
    fn test_pairing_equal_runs() {
        let ops = diff_texts("a\nb\nc\n", "a\nB\nC\n").unwrap();
        let hunks = group_hunks(&ops, 0);
        let pairs = hunk_inline_pairs(&hunks[0]);
        // Two removed lines followed by two added lines: two pairs.
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].removed_line, pairs[0].added_line), (0, 2));
        assert_eq!((pairs[1].removed_line, pairs[1].added_line), (1, 3));
    }

    #[test]
    fn test_pairing_uneven_runs_leaves_surplus_unpaired() {
        let ops = diff_texts("a\nb\nc\n", "a\nB\n").unwrap();
        let hunks = group_hunks(&ops, 0);
        let pairs = hunk_inline_pairs(&hunks[0]);
        // Removed run of 2, added run of 1: only one pair.
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_no_pairs_for_pure_insertion() {
        let ops = diff_texts("a\n", "a\nb\n").unwrap();
        let hunks = group_hunks(&ops, 0);
        assert!(hunk_inline_pairs(&hunks[0]).is_empty());
    }
}
