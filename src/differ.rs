use similar::{Algorithm, DiffOp, capture_diff_slices};

use crate::error::{Error, Result};
use crate::types::LineOp;

/// Split text into lines, keeping terminators.
///
/// `"a\nb"` splits into `["a\n", "b"]`; the empty string splits into no
/// lines at all. Keeping the terminators is what makes every downstream
/// reconstruction guarantee byte-exact, including files whose final line is
/// unterminated.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Reject non-text content before diffing it.
///
/// A NUL byte is the telltale for binary data (the same heuristic git and
/// libgit2 use); diffing such content line-wise would produce meaningless
/// hunks, so the engine fails fast instead.
pub fn ensure_text(text: &str) -> Result<()> {
    match text.bytes().position(|b| b == 0) {
        Some(offset) => Err(Error::BinaryInput { offset }),
        None => Ok(()),
    }
}

/// Compute a minimal line-level edit script between two texts.
///
/// Validates both inputs as text, then diffs their line sequences with
/// [`diff_lines`].
pub fn diff_texts<'a>(old: &'a str, new: &'a str) -> Result<Vec<LineOp<'a>>> {
    ensure_text(old)?;
    ensure_text(new)?;
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    Ok(diff_lines(&old_lines, &new_lines))
}

/// Compute a minimal edit script between two line sequences.
///
/// Myers over exact string equality, no normalization. The output is
/// deterministic: for equally-minimal scripts, deletions are emitted before
/// insertions at the same alignment point, matching conventional unified
/// diff output. A common prefix/suffix trim runs first so that the typical
/// mostly-similar input only pays for its changed region.
pub fn diff_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<LineOp<'a>> {
    let prefix = common_prefix(old, new);
    let suffix = common_suffix(&old[prefix..], &new[prefix..]);

    let core_old = &old[prefix..old.len() - suffix];
    let core_new = &new[prefix..new.len() - suffix];

    let mut ops = Vec::with_capacity(old.len().max(new.len()));
    ops.extend(old[..prefix].iter().map(|l| LineOp::Equal(l)));

    for op in capture_diff_slices(Algorithm::Myers, core_old, core_new) {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                ops.extend(
                    core_old[old_index..old_index + len]
                        .iter()
                        .map(|l| LineOp::Equal(l)),
                );
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                ops.extend(
                    core_old[old_index..old_index + old_len]
                        .iter()
                        .map(|l| LineOp::Delete(l)),
                );
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                ops.extend(
                    core_new[new_index..new_index + new_len]
                        .iter()
                        .map(|l| LineOp::Insert(l)),
                );
            }
            // A replace run expands to its deletions first, then its
            // insertions. This is the determinism tie-break.
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                ops.extend(
                    core_old[old_index..old_index + old_len]
                        .iter()
                        .map(|l| LineOp::Delete(l)),
                );
                ops.extend(
                    core_new[new_index..new_index + new_len]
                        .iter()
                        .map(|l| LineOp::Insert(l)),
                );
            }
        }
    }

    ops.extend(old[old.len() - suffix..].iter().map(|l| LineOp::Equal(l)));
    ops
}

fn common_prefix(old: &[&str], new: &[&str]) -> usize {
    old.iter().zip(new.iter()).take_while(|(a, b)| a == b).count()
}

fn common_suffix(old: &[&str], new: &[&str]) -> usize {
    old.iter()
        .rev()
        .zip(new.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}
