//! Tests for capability sets.

use quire::permissions::PermissionBits;

#[test]
fn role_helpers_grant_their_capabilities() {
    assert!(PermissionBits::administrator()
        .contains(PermissionBits::ASSIGN_ARTICLE));
    assert!(PermissionBits::administrator()
        .contains(PermissionBits::PUBLISH_ARTICLE));
    assert!(PermissionBits::editor().contains(PermissionBits::EDIT_ARTICLE));
    assert!(PermissionBits::reviewer()
        .contains(PermissionBits::REVIEW_ARTICLE));
}

#[test]
fn editors_are_not_administrators() {
    assert!(!PermissionBits::editor()
        .contains(PermissionBits::ASSIGN_ARTICLE));
    assert!(!PermissionBits::reviewer()
        .contains(PermissionBits::EDIT_ARTICLE));
}

#[test]
fn require_names_missing_capabilities() {
    let err = PermissionBits::editor()
        .require(PermissionBits::PUBLISH_ARTICLE)
        .unwrap_err();

    assert!(err.to_string().contains("PUBLISH_ARTICLE"));
}
