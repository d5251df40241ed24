use crate::error::ApiError;

bitflags! {
    /// Permissions allow for a fine-grained control over what actions a given
    /// user can take.
    pub struct PermissionBits: i32 {
        /// All bits allocated for user management permissions.
        const MANAGE_USERS_BITS = 0x0000000f;
        /// Permission holder can invite, deactivate, and reassign users.
        const MANAGE_USERS = 0x00000001;
        /// All bits allocated for editorial workflow permissions.
        const WORKFLOW_BITS = 0x000000f0;
        /// Permission holder can assign editors and reviewers to articles.
        const ASSIGN_ARTICLE = 0x00000010;
        /// Permission holder can publish and directly approve articles.
        const PUBLISH_ARTICLE = 0x00000020;
        /// Permission holder can irreversibly delete articles.
        const DELETE_ARTICLE = 0x00000040;
        /// All bits allocated for content permissions.
        const CONTENT_BITS = 0x00000f00;
        /// Permission holder can upload corrections and approve articles they
        /// are assigned to as an editor.
        const EDIT_ARTICLE = 0x00000100;
        /// Permission holder can upload corrections to articles they are
        /// assigned to as a reviewer.
        const REVIEW_ARTICLE = 0x00000200;
    }
}

impl PermissionBits {
    /// Permissions granted to administrators.
    #[inline]
    pub fn administrator() -> PermissionBits {
        PermissionBits::all()
    }

    /// Permissions granted to editors.
    #[inline]
    pub fn editor() -> PermissionBits {
        PermissionBits::EDIT_ARTICLE
    }

    /// Permissions granted to reviewers.
    #[inline]
    pub fn reviewer() -> PermissionBits {
        PermissionBits::REVIEW_ARTICLE
    }

    /// Verify that all required permissions are present.
    ///
    /// This is the same check as `self.contains(permissions)`, but returns an
    /// [`ApiError`].
    pub fn require(&self, permissions: PermissionBits)
    -> Result<(), RequirePermissionsError> {
        if self.contains(permissions) {
            Ok(())
        } else {
            Err(RequirePermissionsError(permissions - *self))
        }
    }
}

#[derive(ApiError, Debug, Fail)]
#[api(status = "FORBIDDEN", code = "user:insufficient-permissions")]
#[fail(display = "Missing required permissions: {:?}", _0)]
pub struct RequirePermissionsError(PermissionBits);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_when_contained() {
        assert!(PermissionBits::administrator()
            .require(PermissionBits::PUBLISH_ARTICLE)
            .is_ok());
    }

    #[test]
    fn require_reports_missing_bits() {
        let err = PermissionBits::editor()
            .require(PermissionBits::PUBLISH_ARTICLE);
        assert!(err.is_err());
    }

    #[test]
    fn role_sets_are_disjoint_from_admin_only_bits() {
        assert!(!PermissionBits::editor()
            .intersects(PermissionBits::WORKFLOW_BITS));
        assert!(!PermissionBits::reviewer()
            .intersects(PermissionBits::WORKFLOW_BITS));
    }
}
