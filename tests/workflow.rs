//! Tests for the editorial workflow's transition table.

use quire::{
    db::types::ArticleStatus,
    models::article::{ArticleAction, transition_allowed},
};

const ALL_STATUSES: [ArticleStatus; 6] = [
    ArticleStatus::PendingAdminReview,
    ArticleStatus::AssignedToEditor,
    ArticleStatus::EditorEditing,
    ArticleStatus::EditorApproved,
    ArticleStatus::PendingApproval,
    ArticleStatus::Published,
];

const ALL_ACTIONS: [ArticleAction; 7] = [
    ArticleAction::AssignEditor,
    ArticleAction::Reassign,
    ArticleAction::UploadCorrection,
    ArticleAction::EditorApprove,
    ArticleAction::RequestApproval,
    ArticleAction::DirectApprove,
    ArticleAction::Publish,
];

#[test]
fn every_status_reaches_published() {
    // Walk the happy path and the legacy path from the initial status and
    // collect everything reachable.
    let mut reachable = vec![ArticleStatus::PendingAdminReview];
    let edges = [
        (ArticleStatus::PendingAdminReview, ArticleAction::AssignEditor,
            ArticleStatus::AssignedToEditor),
        (ArticleStatus::PendingAdminReview, ArticleAction::RequestApproval,
            ArticleStatus::PendingApproval),
        (ArticleStatus::AssignedToEditor, ArticleAction::UploadCorrection,
            ArticleStatus::EditorEditing),
        (ArticleStatus::EditorEditing, ArticleAction::EditorApprove,
            ArticleStatus::EditorApproved),
        (ArticleStatus::EditorApproved, ArticleAction::Publish,
            ArticleStatus::Published),
        (ArticleStatus::PendingApproval, ArticleAction::DirectApprove,
            ArticleStatus::Published),
    ];

    for &(from, action, to) in &edges {
        assert!(
            transition_allowed(from, action),
            "{:?} must be legal in {:?}",
            action,
            from,
        );
        if !reachable.contains(&to) {
            reachable.push(to);
        }
    }

    for &status in &ALL_STATUSES {
        assert!(reachable.contains(&status), "{:?} is unreachable", status);
    }
}

#[test]
fn terminal_status_allows_nothing() {
    for &action in &ALL_ACTIONS {
        assert!(!transition_allowed(ArticleStatus::Published, action));
    }
}

#[test]
fn editor_approval_and_direct_approval_are_distinct() {
    // Editor approval works only from the editor's own statuses.
    assert!(transition_allowed(
        ArticleStatus::AssignedToEditor,
        ArticleAction::EditorApprove,
    ));
    assert!(transition_allowed(
        ArticleStatus::EditorEditing,
        ArticleAction::EditorApprove,
    ));
    assert!(!transition_allowed(
        ArticleStatus::PendingApproval,
        ArticleAction::EditorApprove,
    ));

    // Direct approval never applies to an editor-approved article, that one
    // goes through publication.
    assert!(!transition_allowed(
        ArticleStatus::EditorApproved,
        ArticleAction::DirectApprove,
    ));
    assert!(transition_allowed(
        ArticleStatus::EditorApproved,
        ArticleAction::Publish,
    ));
}

#[test]
fn uploads_only_while_assigned() {
    for &status in &ALL_STATUSES {
        let expected = status == ArticleStatus::AssignedToEditor
            || status == ArticleStatus::EditorEditing;

        assert_eq!(
            transition_allowed(status, ArticleAction::UploadCorrection),
            expected,
            "upload in {:?}",
            status,
        );
    }
}

#[test]
fn reassignment_loop_is_bounded() {
    for &status in &ALL_STATUSES {
        let expected = status == ArticleStatus::PendingAdminReview
            || status == ArticleStatus::AssignedToEditor
            || status == ArticleStatus::EditorEditing;

        assert_eq!(
            transition_allowed(status, ArticleAction::Reassign),
            expected,
            "reassign in {:?}",
            status,
        );
    }
}
