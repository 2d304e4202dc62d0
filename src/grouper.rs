use crate::types::{Hunk, HunkLine, LineKind, LineOp};

/// Group an edit script into hunks with up to `context_radius` Equal lines
/// of context on each side.
///
/// A change run is a maximal contiguous subsequence of non-Equal ops. Two
/// runs share a hunk when the Equal gap between them is at most
/// `2 * context_radius`, i.e. when their expanded context windows would
/// touch or overlap. Context is clamped at the buffer bounds. Equal inputs
/// produce no hunks.
pub fn group_hunks(ops: &[LineOp<'_>], context_radius: usize) -> Vec<Hunk> {
    let entries = annotate(ops);

    let runs = change_runs(&entries);
    if runs.is_empty() {
        return Vec::new();
    }

    let mut hunks = Vec::new();
    let mut group_start = runs[0].0;
    let mut group_end = runs[0].1;

    for &(start, end) in &runs[1..] {
        let gap = start - group_end - 1;
        if gap <= 2 * context_radius {
            group_end = end;
        } else {
            hunks.push(build_hunk(&entries, group_start, group_end, context_radius));
            group_start = start;
            group_end = end;
        }
    }
    hunks.push(build_hunk(&entries, group_start, group_end, context_radius));

    hunks
}

/// An edit-script entry annotated with line numbers on both sides.
struct Annotated<'a> {
    kind: LineKind,
    text: &'a str,
    old_lineno: Option<u32>,
    new_lineno: Option<u32>,
    /// Old/new lines consumed strictly before this entry. Used as the range
    /// start for hunks that have no lines on that side.
    old_before: u32,
    new_before: u32,
}

fn annotate<'a>(ops: &[LineOp<'a>]) -> Vec<Annotated<'a>> {
    let mut old_lineno = 1u32;
    let mut new_lineno = 1u32;
    ops.iter()
        .map(|op| match *op {
            LineOp::Equal(text) => {
                let entry = Annotated {
                    kind: LineKind::Context,
                    text,
                    old_lineno: Some(old_lineno),
                    new_lineno: Some(new_lineno),
                    old_before: old_lineno - 1,
                    new_before: new_lineno - 1,
                };
                old_lineno += 1;
                new_lineno += 1;
                entry
            }
            LineOp::Delete(text) => {
                let entry = Annotated {
                    kind: LineKind::Removed,
                    text,
                    old_lineno: Some(old_lineno),
                    new_lineno: None,
                    old_before: old_lineno - 1,
                    new_before: new_lineno - 1,
                };
                old_lineno += 1;
                entry
            }
            LineOp::Insert(text) => {
                let entry = Annotated {
                    kind: LineKind::Added,
                    text,
                    old_lineno: None,
                    new_lineno: Some(new_lineno),
                    old_before: old_lineno - 1,
                    new_before: new_lineno - 1,
                };
                new_lineno += 1;
                entry
            }
        })
        .collect()
}

/// Maximal contiguous runs of non-Context entries, as inclusive index pairs.
fn change_runs(entries: &[Annotated<'_>]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start = None;
    for (i, entry) in entries.iter().enumerate() {
        match (entry.kind, run_start) {
            (LineKind::Context, Some(start)) => {
                runs.push((start, i - 1));
                run_start = None;
            }
            (LineKind::Context, None) => {}
            (_, None) => run_start = Some(i),
            (_, Some(_)) => {}
        }
    }
    if let Some(start) = run_start {
        runs.push((start, entries.len() - 1));
    }
    runs
}

/// Build one hunk from the entries in `[first_change, last_change]`,
/// expanded by the context radius and clamped to the script bounds.
fn build_hunk(
    entries: &[Annotated<'_>],
    first_change: usize,
    last_change: usize,
    context_radius: usize,
) -> Hunk {
    let start = first_change.saturating_sub(context_radius);
    let end = (last_change + context_radius).min(entries.len() - 1);
    let slice = &entries[start..=end];

    let lines: Vec<HunkLine> = slice
        .iter()
        .map(|e| HunkLine {
            kind: e.kind,
            text: e.text.to_string(),
            old_lineno: e.old_lineno,
            new_lineno: e.new_lineno,
        })
        .collect();

    let old_count = slice.iter().filter(|e| e.old_lineno.is_some()).count() as u32;
    let new_count = slice.iter().filter(|e| e.new_lineno.is_some()).count() as u32;

    // Git convention: a zero-count range starts at the last line before the
    // hunk on that side (0 when the hunk sits at the top of the file).
    let old_start = slice
        .iter()
        .find_map(|e| e.old_lineno)
        .unwrap_or(slice[0].old_before);
    let new_start = slice
        .iter()
        .find_map(|e| e.new_lineno)
        .unwrap_or(slice[0].new_before);

    Hunk {
        old_start,
        old_count,
        new_start,
        new_count,
        lines,
    }
}
