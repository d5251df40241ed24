use chrono::NaiveDateTime;
use uuid::Uuid;

use super::{
    schema::*,
    types::{ArticleStatus, ChangeStatus, FileType, VisualDiffStatus},
};

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
pub struct User {
    pub id: i32,
    /// User's email address, used for identification and notification
    /// delivery.
    pub email: String,
    /// User's display name. This is visible to other users.
    pub name: String,
    /// Capability bits, see [`crate::permissions::PermissionBits`].
    pub permissions: i32,
    /// Deactivated users keep their history but can hold no assignments.
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub permissions: i32,
    pub is_active: bool,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
pub struct Article {
    /// ID of this article.
    pub id: Uuid,
    /// Title of the manuscript.
    pub title: String,
    /// Human-readable unique identifier derived from the title.
    pub slug: String,
    /// Authoritative workflow position.
    pub status: ArticleStatus,
    /// User who submitted this article.
    pub author: i32,
    /// Document as submitted. Never modified after creation.
    pub original_pdf_url: String,
    pub original_word_url: Option<String>,
    /// Latest accepted version. Equal to the original until a correction is
    /// accepted.
    pub current_pdf_url: String,
    pub current_word_url: Option<String>,
    pub assigned_editor: Option<i32>,
    pub assigned_reviewer: Option<i32>,
    /// Plain-text extraction of the current version, if extraction succeeded.
    pub content: Option<String>,
    pub content_html: Option<String>,
    pub submitted_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub editor_approved_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Insertable)]
#[table_name = "articles"]
pub struct NewArticle<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub slug: &'a str,
    pub status: ArticleStatus,
    pub author: i32,
    pub original_pdf_url: &'a str,
    pub original_word_url: Option<&'a str>,
    pub current_pdf_url: &'a str,
    pub current_word_url: Option<&'a str>,
    pub content: Option<&'a str>,
    pub content_html: Option<&'a str>,
    pub submitted_at: NaiveDateTime,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Article, foreign_key = "article")]
pub struct ArticleRevision {
    /// ID of this revision.
    pub id: i32,
    /// Article this is a revision of.
    pub article: Uuid,
    pub pdf_url: String,
    pub word_url: Option<String>,
    /// Editor or reviewer who uploaded this version.
    pub uploader: i32,
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "article_revisions"]
pub struct NewArticleRevision<'a> {
    pub article: Uuid,
    pub pdf_url: &'a str,
    pub word_url: Option<&'a str>,
    pub uploader: i32,
    pub comments: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(Article, foreign_key = "article")]
pub struct ArticleChangeLog {
    /// ID of this change-log entry.
    pub id: i32,
    /// Article this change belongs to.
    pub article: Uuid,
    /// Monotonic per-article version. Starts at 2, version 1 being the
    /// original submission.
    pub version_number: i32,
    pub old_file_url: String,
    pub new_file_url: String,
    pub file_type: FileType,
    /// Structured word diff, see [`crate::diff::DiffData`].
    pub diff_data: serde_json::Value,
    pub status: ChangeStatus,
    /// Editor (or reviewer) responsible for this version.
    pub editor: i32,
    pub edited_at: NaiveDateTime,
    pub comments: Option<String>,
    /// A separately uploaded working file, distinct from the canonical one.
    pub editor_document_url: Option<String>,
    pub editor_document_type: Option<FileType>,
    /// Lock/result pair for visual-diff generation.
    pub visual_diff_status: VisualDiffStatus,
    pub visual_diff_url: Option<String>,
}

#[derive(Clone, Debug, Insertable)]
#[table_name = "article_change_logs"]
pub struct NewArticleChangeLog<'a> {
    pub article: Uuid,
    pub version_number: i32,
    pub old_file_url: &'a str,
    pub new_file_url: &'a str,
    pub file_type: FileType,
    pub diff_data: serde_json::Value,
    pub status: ChangeStatus,
    pub editor: i32,
    pub edited_at: NaiveDateTime,
    pub comments: Option<&'a str>,
    pub editor_document_url: Option<&'a str>,
    pub editor_document_type: Option<FileType>,
    pub visual_diff_status: VisualDiffStatus,
}

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "audit_log"]
pub struct AuditLog {
    pub id: i32,
    pub timestamp: NaiveDateTime,
    /// User responsible for the action, or `None` for the system itself.
    pub actor: Option<i32>,
    /// Kind of object the action was taken on.
    pub context: String,
    pub context_id: Option<i32>,
    pub context_uuid: Option<Uuid>,
    /// Short string describing the action.
    pub kind: String,
    /// Action details, serialized as MessagePack.
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "audit_log"]
pub struct NewAuditLog<'a> {
    pub actor: Option<i32>,
    pub context: &'a str,
    pub context_id: Option<i32>,
    pub context_uuid: Option<Uuid>,
    pub kind: &'a str,
    pub data: &'a [u8],
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable)]
#[belongs_to(User, foreign_key = "user")]
pub struct Event {
    /// ID of this event.
    pub id: i32,
    /// ID of the user for which this event was generated.
    pub user: i32,
    /// Time at which this event was generated.
    pub timestamp: NaiveDateTime,
    /// Short string describing what kind of event is this.
    pub kind: String,
    /// True if the user has not yet reviewed this event.
    pub is_unread: bool,
    /// Actual data for the event, serialized as MessagePack.
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "events"]
pub struct NewEvent<'a> {
    pub user: i32,
    pub kind: &'a str,
    pub data: &'a [u8],
}
