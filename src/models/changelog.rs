use chrono::NaiveDateTime;
use diesel::{prelude::*, result::Error as DbError};
use uuid::Uuid;

use crate::{
    ApiError,
    db::{
        Connection,
        models as db,
        schema::article_change_logs,
        types::{ChangeStatus, FileType, VisualDiffStatus},
    },
};

/// A single reviewed change to an article's content.
///
/// Change logs carry the word-level diff computed at upload time, the file
/// pointers it was computed between, and the state of the on-demand visual
/// diff artefact.
#[derive(Debug)]
pub struct ChangeLog {
    data: db::ArticleChangeLog,
}

#[derive(Debug, Serialize)]
pub struct PublicData {
    pub id: i32,
    pub article: Uuid,
    pub version_number: i32,
    pub old_file_url: String,
    pub new_file_url: String,
    pub file_type: FileType,
    pub diff_data: serde_json::Value,
    pub status: ChangeStatus,
    pub editor: i32,
    pub edited_at: NaiveDateTime,
    pub comments: Option<String>,
    pub visual_diff_status: VisualDiffStatus,
    pub visual_diff_url: Option<String>,
}

impl ChangeLog {
    pub(crate) fn from_db(data: db::ArticleChangeLog) -> ChangeLog {
        ChangeLog { data }
    }

    /// Find a change log entry by ID.
    pub fn by_id(dbcon: &Connection, id: i32) -> Result<ChangeLog, FindChangeLogError> {
        article_change_logs::table
            .filter(article_change_logs::id.eq(id))
            .get_result::<db::ArticleChangeLog>(dbcon)
            .optional()?
            .ok_or(FindChangeLogError::NotFound)
            .map(ChangeLog::from_db)
    }

    /// Get all change log entries of an article, in version order.
    pub fn all_of(dbcon: &Connection, article: Uuid) -> Result<Vec<ChangeLog>, DbError> {
        article_change_logs::table
            .filter(article_change_logs::article.eq(article))
            .order_by(article_change_logs::version_number.asc())
            .get_results::<db::ArticleChangeLog>(dbcon)
            .map(|v| v.into_iter().map(ChangeLog::from_db).collect())
    }

    /// Get the highest version number recorded for an article, if any.
    pub fn latest_version(dbcon: &Connection, article: Uuid)
    -> Result<Option<i32>, DbError> {
        article_change_logs::table
            .filter(article_change_logs::article.eq(article))
            .select(diesel::dsl::max(article_change_logs::version_number))
            .get_result::<Option<i32>>(dbcon)
    }

    pub fn get_public(&self) -> PublicData {
        let db::ArticleChangeLog {
            id, article, version_number, ref old_file_url, ref new_file_url,
            file_type, ref diff_data, status, editor, edited_at, ref comments,
            visual_diff_status, ref visual_diff_url, ..
        } = self.data;

        PublicData {
            id,
            article,
            version_number,
            old_file_url: old_file_url.clone(),
            new_file_url: new_file_url.clone(),
            file_type,
            diff_data: diff_data.clone(),
            status,
            editor,
            edited_at,
            comments: comments.clone(),
            visual_diff_status,
            visual_diff_url: visual_diff_url.clone(),
        }
    }
}

impl std::ops::Deref for ChangeLog {
    type Target = db::ArticleChangeLog;

    fn deref(&self) -> &db::ArticleChangeLog {
        &self.data
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum FindChangeLogError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// No change log entry found matching given criteria.
    #[fail(display = "No such change log entry")]
    #[api(code = "change-log:not-found", status = "NOT_FOUND")]
    NotFound,
}

impl_from! { for FindChangeLogError ;
    DbError => |e| FindChangeLogError::Internal(e),
}
