//! Word-level text diffing.
//!
//! This module is pure: it knows nothing about file formats or storage.
//! Callers are responsible for obtaining plain text first (see
//! [`crate::conversion`]). The output shape and the summary numbers are
//! stable — UI and exports consume them as-is.

use serde::{Deserialize, Serialize};

/// A structured diff between two versions of a document's text.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DiffData {
    pub parts: Vec<DiffPart>,
    pub summary: DiffSummary,
}

/// A run of words sharing the same fate.
///
/// A part with neither flag set is common to both versions.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DiffPart {
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
}

/// Word counts derived from the diff parts.
///
/// `modified_count = min(added, removed)` treats paired add/remove runs as
/// modifications instead of double-counting them. This is a count-only
/// approximation, not an alignment of specific spans; downstream consumers
/// depend on these exact numbers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub added_count: usize,
    pub removed_count: usize,
    pub modified_count: usize,
    pub actual_added: usize,
    pub actual_removed: usize,
    pub total_changes: usize,
}

impl DiffSummary {
    fn from_counts(added_count: usize, removed_count: usize) -> DiffSummary {
        let modified_count = added_count.min(removed_count);
        let actual_added = added_count - modified_count;
        let actual_removed = removed_count - modified_count;

        DiffSummary {
            added_count,
            removed_count,
            modified_count,
            actual_added,
            actual_removed,
            total_changes: actual_added + actual_removed + modified_count,
        }
    }
}

/// Compute a word-level diff between two texts.
///
/// Tokenizes on whitespace, finds a longest common subsequence of the token
/// sequences, and coalesces runs of equally-fated words into parts. Never
/// fails; empty inputs describe whole-document additions or removals.
pub fn diff(old: &str, new: &str) -> DiffData {
    let old_words: Vec<&str> = old.split_whitespace().collect();
    let new_words: Vec<&str> = new.split_whitespace().collect();

    let ops = diff_words(&old_words, &new_words);

    let mut parts: Vec<DiffPart> = Vec::new();
    let mut added_count = 0;
    let mut removed_count = 0;

    for op in ops {
        let (word, added, removed) = match op {
            Op::Equal(word) => (word, false, false),
            Op::Added(word) => {
                added_count += 1;
                (word, true, false)
            }
            Op::Removed(word) => {
                removed_count += 1;
                (word, false, true)
            }
        };

        match parts.last_mut() {
            Some(part) if part.added == added && part.removed == removed => {
                part.value.push(' ');
                part.value.push_str(word);
            }
            _ => parts.push(DiffPart {
                value: word.to_string(),
                added,
                removed,
            }),
        }
    }

    DiffData {
        parts,
        summary: DiffSummary::from_counts(added_count, removed_count),
    }
}

enum Op<'a> {
    Equal(&'a str),
    Added(&'a str),
    Removed(&'a str),
}

/// Produce an edit script over two token sequences.
///
/// Classic dynamic-programming LCS. Ties prefer removals, so a changed run
/// always reads as "removed words, then added words".
fn diff_words<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Op<'a>> {
    let n = old.len();
    let m = new.len();

    // lengths[i][j] = length of the LCS of old[i..] and new[j..].
    let mut lengths = vec![0usize; (n + 1) * (m + 1)];
    let at = |i: usize, j: usize| i * (m + 1) + j;

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[at(i, j)] = if old[i] == new[j] {
                lengths[at(i + 1, j + 1)] + 1
            } else {
                lengths[at(i + 1, j)].max(lengths[at(i, j + 1)])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);

    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(Op::Equal(old[i]));
            i += 1;
            j += 1;
        } else if lengths[at(i + 1, j)] >= lengths[at(i, j + 1)] {
            ops.push(Op::Removed(old[i]));
            i += 1;
        } else {
            ops.push(Op::Added(new[j]));
            j += 1;
        }
    }

    for word in &old[i..] {
        ops.push(Op::Removed(word));
    }

    for word in &new[j..] {
        ops.push(Op::Added(word));
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(data: &DiffData, added: bool, removed: bool) -> Vec<&str> {
        data.parts.iter()
            .filter(|p| p.added == added && p.removed == removed)
            .flat_map(|p| p.value.split_whitespace())
            .collect()
    }

    #[test]
    fn pure_addition() {
        let d = diff("The quick fox", "The quick brown fox jumps");

        assert_eq!(words(&d, true, false), ["brown", "jumps"]);
        assert_eq!(words(&d, false, true), Vec::<&str>::new());
        assert_eq!(d.summary, DiffSummary {
            added_count: 2,
            removed_count: 0,
            modified_count: 0,
            actual_added: 2,
            actual_removed: 0,
            total_changes: 2,
        });
    }

    #[test]
    fn paired_runs_count_as_modifications() {
        let d = diff("a red apple", "a green apple");

        assert_eq!(d.summary, DiffSummary {
            added_count: 1,
            removed_count: 1,
            modified_count: 1,
            actual_added: 0,
            actual_removed: 0,
            total_changes: 1,
        });
    }

    #[test]
    fn whole_document_add_and_remove() {
        let add = diff("", "one two three");
        assert_eq!(add.summary.added_count, 3);
        assert_eq!(add.summary.total_changes, 3);

        let remove = diff("one two three", "");
        assert_eq!(remove.summary.removed_count, 3);
        assert_eq!(remove.summary.total_changes, 3);

        let nothing = diff("", "");
        assert!(nothing.parts.is_empty());
        assert_eq!(nothing.summary.total_changes, 0);
    }

    #[test]
    fn identical_inputs_produce_one_common_part() {
        let d = diff("same text here", "same text here");

        assert_eq!(d.parts.len(), 1);
        assert!(!d.parts[0].added && !d.parts[0].removed);
        assert_eq!(d.parts[0].value, "same text here");
        assert_eq!(d.summary.total_changes, 0);
    }

    #[test]
    fn idempotent() {
        let a = "the cat sat on the mat";
        let b = "the dog sat under the mat today";

        assert_eq!(diff(a, b), diff(a, b));
    }

    #[test]
    fn totals_symmetric_under_swap() {
        let a = "alpha beta gamma delta";
        let b = "alpha gamma epsilon zeta";

        let fwd = diff(a, b);
        let rev = diff(b, a);

        assert_eq!(fwd.summary.total_changes, rev.summary.total_changes);
        assert_eq!(fwd.summary.added_count, rev.summary.removed_count);
        assert_eq!(fwd.summary.removed_count, rev.summary.added_count);
    }

    #[test]
    fn removed_runs_precede_added_runs() {
        let d = diff("x old y", "x new y");

        let flags: Vec<_> = d.parts.iter()
            .map(|p| (p.added, p.removed))
            .collect();
        assert_eq!(flags, [
            (false, false),
            (false, true),
            (true, false),
            (false, false),
        ]);
    }

    #[test]
    fn whitespace_runs_are_insignificant() {
        let d = diff("a  b\n c", "a b c");
        assert_eq!(d.summary.total_changes, 0);
    }
}
