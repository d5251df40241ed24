//! Tests for the word-level diff engine and its summary rules.

use quire::diff::{DiffPart, diff};

/// Words a reader of the old version would have seen.
fn old_words(parts: &[DiffPart]) -> Vec<&str> {
    parts.iter()
        .filter(|p| !p.added)
        .flat_map(|p| p.value.split_whitespace())
        .collect()
}

/// Words a reader of the new version sees.
fn new_words(parts: &[DiffPart]) -> Vec<&str> {
    parts.iter()
        .filter(|p| !p.removed)
        .flat_map(|p| p.value.split_whitespace())
        .collect()
}

#[test]
fn pure_addition() {
    let result = diff("The quick fox", "The quick brown fox jumps");

    assert_eq!(result.summary.added_count, 2);
    assert_eq!(result.summary.removed_count, 0);
    assert_eq!(result.summary.modified_count, 0);
    assert_eq!(result.summary.actual_added, 2);
    assert_eq!(result.summary.actual_removed, 0);
    assert_eq!(result.summary.total_changes, 2);
}

#[test]
fn paired_runs_are_modifications() {
    let result = diff("a b c d", "a x c y");

    assert_eq!(result.summary.added_count, 2);
    assert_eq!(result.summary.removed_count, 2);
    assert_eq!(result.summary.modified_count, 2);
    assert_eq!(result.summary.actual_added, 0);
    assert_eq!(result.summary.actual_removed, 0);
    assert_eq!(result.summary.total_changes, 2);
}

#[test]
fn modifications_are_count_only() {
    // Three removals against one addition: the single pairing is counted as
    // a modification, the two leftover removals as actual removals.
    let result = diff("a b c d e", "a x e");

    assert_eq!(result.summary.added_count, 1);
    assert_eq!(result.summary.removed_count, 3);
    assert_eq!(result.summary.modified_count, 1);
    assert_eq!(result.summary.actual_added, 0);
    assert_eq!(result.summary.actual_removed, 2);
    assert_eq!(result.summary.total_changes, 3);
}

#[test]
fn empty_inputs_are_legal() {
    let added = diff("", "one two three");
    assert_eq!(added.summary.added_count, 3);
    assert_eq!(added.summary.removed_count, 0);

    let removed = diff("one two three", "");
    assert_eq!(removed.summary.added_count, 0);
    assert_eq!(removed.summary.removed_count, 3);

    let nothing = diff("", "");
    assert!(nothing.parts.is_empty());
    assert_eq!(nothing.summary.total_changes, 0);
}

#[test]
fn parts_reconstruct_both_versions() {
    let old = "the editorial workflow tracks every article through review";
    let new = "the workflow machine tracks each article through final review";

    let result = diff(old, new);

    assert_eq!(
        old_words(&result.parts),
        old.split_whitespace().collect::<Vec<_>>(),
    );
    assert_eq!(
        new_words(&result.parts),
        new.split_whitespace().collect::<Vec<_>>(),
    );
}

#[test]
fn no_part_is_both_added_and_removed() {
    let result = diff("alpha beta gamma", "beta gamma delta epsilon");

    for part in &result.parts {
        assert!(!(part.added && part.removed), "part {:?}", part);
    }
}

#[test]
fn idempotent() {
    let old = "shared prefix removed middle shared suffix";
    let new = "shared prefix inserted words shared suffix";

    assert_eq!(diff(old, new), diff(old, new));
}

#[test]
fn totals_are_symmetric_under_swap() {
    let a = "one two three four five";
    let b = "one three six five seven";

    let forward = diff(a, b);
    let backward = diff(b, a);

    assert_eq!(
        forward.summary.total_changes,
        backward.summary.total_changes,
    );
    assert_eq!(forward.summary.added_count, backward.summary.removed_count);
    assert_eq!(forward.summary.removed_count, backward.summary.added_count);
}

#[test]
fn summary_serializes_in_camel_case() {
    let result = diff("a", "a b");
    let json = serde_json::to_value(&result.summary).unwrap();

    assert_eq!(json["addedCount"], 1);
    assert_eq!(json["removedCount"], 0);
    assert_eq!(json["modifiedCount"], 0);
    assert_eq!(json["actualAdded"], 1);
    assert_eq!(json["totalChanges"], 1);
}

#[test]
fn unchanged_flags_are_omitted_from_json() {
    let result = diff("same words", "same words");
    let json = serde_json::to_value(&result.parts).unwrap();

    let part = &json[0];
    assert!(part.get("added").is_none());
    assert!(part.get("removed").is_none());
}
