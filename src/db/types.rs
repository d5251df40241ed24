use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Workflow position of an article.
///
/// This is the authoritative state of the editorial state machine. Legal
/// transitions are defined in [`crate::models::article`].
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Article_status"]
#[serde(rename_all = "kebab-case")]
pub enum ArticleStatus {
    /// Submitted, waiting for an administrator to act.
    PendingAdminReview,
    /// An editor has been assigned and may upload corrections.
    AssignedToEditor,
    /// The assigned editor has uploaded at least one corrected version.
    EditorEditing,
    /// The assigned editor signed off on their corrections.
    EditorApproved,
    /// Waiting for direct administrator approval (legacy path skipping
    /// editors).
    PendingApproval,
    /// Published. Terminal.
    Published,
}

impl ArticleStatus {
    /// Is this a terminal state of the workflow?
    pub fn is_terminal(self) -> bool {
        match self {
            ArticleStatus::Published => true,
            _ => false,
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ArticleStatus::PendingAdminReview => "pending-admin-review",
            ArticleStatus::AssignedToEditor => "assigned-to-editor",
            ArticleStatus::EditorEditing => "editor-editing",
            ArticleStatus::EditorApproved => "editor-approved",
            ArticleStatus::PendingApproval => "pending-approval",
            ArticleStatus::Published => "published",
        })
    }
}

/// Review status of a single change-log entry.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Change_status"]
#[serde(rename_all = "kebab-case")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Published,
    /// Terminal failure. Only ever set by visual-diff generation.
    Failed,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Published => "published",
            ChangeStatus::Failed => "failed",
        })
    }
}

/// Lock / result state of visual-diff generation for a change-log entry.
///
/// This column doubles as a mutex: generation is started by an atomic
/// conditional update from `Pending` or `Failed` to `Generating`, and the
/// number of affected rows decides who holds the lock.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "Visual_diff_status"]
#[serde(rename_all = "kebab-case")]
pub enum VisualDiffStatus {
    Pending,
    Generating,
    Ready,
    Failed,
}

impl fmt::Display for VisualDiffStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            VisualDiffStatus::Pending => "pending",
            VisualDiffStatus::Generating => "generating",
            VisualDiffStatus::Ready => "ready",
            VisualDiffStatus::Failed => "failed",
        })
    }
}

/// Format of a stored document file.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[DieselType = "File_type"]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Pdf,
    Docx,
}

impl fmt::Display for FileType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
        })
    }
}
