use chrono::Utc;
use diesel::{
    Connection as _Connection,
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};
use uuid::Uuid;

use crate::{
    ApiError,
    audit,
    conversion::{ConversionError, ConversionGateway},
    db::{
        Connection,
        models as db,
        schema::{article_change_logs, article_revisions, articles},
        types::{ArticleStatus, ChangeStatus, FileType, VisualDiffStatus},
    },
    diff,
    events,
    permissions::{PermissionBits, RequirePermissionsError},
    utils,
};
use super::{ChangeLog, User};

/// Number of times to try inserting an article before giving up on finding
/// a free slug.
const SLUG_ATTEMPTS: usize = 5;

/// A submitted manuscript, tracked through its editorial lifecycle.
///
/// The article's `status` column is the authoritative workflow position.
/// Every method which advances it first checks the transition against
/// [`transition_allowed`] and the actor's capabilities, then performs the
/// mutation and its history records in one transaction. Notifications are
/// dispatched only after the transaction commits, and are best-effort.
#[derive(Debug)]
pub struct Article {
    data: db::Article,
}

/// Things which can happen to an article.
///
/// Used together with [`transition_allowed`] to decide which statuses an
/// action is legal in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArticleAction {
    AssignEditor,
    Reassign,
    UploadCorrection,
    EditorApprove,
    RequestApproval,
    DirectApprove,
    Publish,
}

/// Is `action` legal for an article currently in `status`?
///
/// This is the entire transition table of the workflow. Methods on
/// [`Article`] never mutate `status` except along an edge listed here.
pub fn transition_allowed(status: ArticleStatus, action: ArticleAction) -> bool {
    use self::ArticleAction::*;
    use crate::db::types::ArticleStatus::*;

    match (status, action) {
        (PendingAdminReview, AssignEditor)
        | (PendingApproval, AssignEditor) => true,
        (PendingAdminReview, RequestApproval) => true,
        (PendingAdminReview, Reassign)
        | (AssignedToEditor, Reassign)
        | (EditorEditing, Reassign) => true,
        (AssignedToEditor, UploadCorrection)
        | (EditorEditing, UploadCorrection) => true,
        (AssignedToEditor, EditorApprove)
        | (EditorEditing, EditorApprove) => true,
        (PendingAdminReview, DirectApprove)
        | (AssignedToEditor, DirectApprove)
        | (PendingApproval, DirectApprove) => true,
        (EditorApproved, Publish) => true,
        _ => false,
    }
}

fn verify_transition(status: ArticleStatus, action: ArticleAction)
-> Result<(), ArticleStatus> {
    if transition_allowed(status, action) {
        Ok(())
    } else {
        Err(status)
    }
}

/// What losing the assigned editor means for an article.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Migration {
    /// Hand the article over through the regular reassignment edge.
    Reassign,
    /// No fallback editor available; return the article to the
    /// administrator's queue.
    ReturnToQueue,
    /// The workflow has moved past editing; the article keeps its standing
    /// and only the assignment is cleared.
    ClearAssignment,
}

/// Decide how to migrate an article away from its assigned editor.
///
/// Status rewrites are only planned where the transition table has a
/// reassignment edge. An article whose editor already signed off, or which
/// awaits direct approval, is never demoted by losing its editor.
fn plan_migration(status: ArticleStatus, has_fallback: bool) -> Migration {
    if !transition_allowed(status, ArticleAction::Reassign) {
        Migration::ClearAssignment
    } else if has_fallback {
        Migration::Reassign
    } else {
        Migration::ReturnToQueue
    }
}

/// A subset of article's data that can safely be publicly exposed.
#[derive(Debug, Serialize)]
pub struct PublicData {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: ArticleStatus,
    pub author: i32,
    pub current_pdf_url: String,
    pub current_word_url: Option<String>,
    pub assigned_editor: Option<i32>,
    pub assigned_reviewer: Option<i32>,
}

impl Article {
    pub(super) fn from_db(data: db::Article) -> Article {
        Article { data }
    }

    /// Get all articles.
    pub fn all(dbcon: &Connection) -> Result<Vec<Article>, DbError> {
        articles::table
            .order_by(articles::submitted_at.asc())
            .get_results::<db::Article>(dbcon)
            .map(|v| v.into_iter().map(Article::from_db).collect())
    }

    /// Find an article by ID.
    pub fn by_id(dbcon: &Connection, id: Uuid) -> Result<Article, FindArticleError> {
        articles::table
            .filter(articles::id.eq(id))
            .get_result::<db::Article>(dbcon)
            .optional()?
            .ok_or(FindArticleError::NotFound)
            .map(Article::from_db)
    }

    /// Find an article by slug.
    pub fn by_slug(dbcon: &Connection, slug: &str)
    -> Result<Article, FindArticleError> {
        articles::table
            .filter(articles::slug.eq(slug))
            .get_result::<db::Article>(dbcon)
            .optional()?
            .ok_or(FindArticleError::NotFound)
            .map(Article::from_db)
    }

    /// Submit a new manuscript.
    ///
    /// The uploaded document becomes both the original and the current
    /// version. Text extraction is attempted before the insert and its
    /// failure is not fatal, the article just starts without cached content.
    pub fn create<G>(
        dbcon: &Connection,
        gateway: &G,
        author: &User,
        title: &str,
        pdf_url: &str,
        word_url: Option<&str>,
    ) -> Result<Article, CreateArticleError>
    where
        G: ConversionGateway,
    {
        let extracted = match gateway.extract(pdf_url) {
            Ok(extracted) => Some(extracted),
            Err(err) => {
                warn!("Could not extract content of a new submission: {}", err);
                None
            }
        };

        let base = utils::slugify(title);
        let mut slug = base.clone();

        for attempt in 0.. {
            let result = dbcon.transaction::<db::Article, DbError, _>(|| {
                let data = diesel::insert_into(articles::table)
                    .values(db::NewArticle {
                        id: Uuid::new_v4(),
                        title,
                        slug: &slug,
                        status: ArticleStatus::PendingAdminReview,
                        author: author.id,
                        original_pdf_url: pdf_url,
                        original_word_url: word_url,
                        current_pdf_url: pdf_url,
                        current_word_url: word_url,
                        content: extracted.as_ref().map(|e| e.text.as_str()),
                        content_html: extracted.as_ref().map(|e| e.html.as_str()),
                        submitted_at: Utc::now().naive_utc(),
                    })
                    .get_result::<db::Article>(dbcon)?;

                audit::log_db_actor(
                    dbcon, author.id, "articles", data.id, "create", LogCreate {
                        title,
                        slug: &slug,
                    });

                Ok(data)
            });

            match result {
                Ok(data) => return Ok(Article { data }),
                Err(DbError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation, _,
                )) if attempt + 1 < SLUG_ATTEMPTS => {
                    slug = utils::slug_with_suffix(&base);
                }
                Err(err) => return Err(err.into()),
            }
        }

        unreachable!()
    }

    /// Get the public portion of this article's data.
    pub fn get_public(&self) -> PublicData {
        let db::Article {
            id, ref title, ref slug, status, author, ref current_pdf_url,
            ref current_word_url, assigned_editor, assigned_reviewer, ..
        } = self.data;

        PublicData {
            id,
            title: title.clone(),
            slug: slug.clone(),
            status,
            author,
            current_pdf_url: current_pdf_url.clone(),
            current_word_url: current_word_url.clone(),
            assigned_editor,
            assigned_reviewer,
        }
    }

    /// Assign an editor for the first time.
    ///
    /// Use [`Article::reassign`] to move an article which already has one.
    pub fn assign_editor(
        &mut self,
        dbcon: &Connection,
        actor: &User,
        editor: &User,
    ) -> Result<(), AssignArticleError> {
        actor.permissions().require(PermissionBits::ASSIGN_ARTICLE)?;
        verify_transition(self.data.status, ArticleAction::AssignEditor)
            .map_err(AssignArticleError::InvalidStatus)?;

        if !editor.permissions().contains(PermissionBits::EDIT_ARTICLE) {
            return Err(AssignArticleError::CannotEdit);
        }

        let data = dbcon.transaction::<_, DbError, _>(|| {
            let data = diesel::update(&self.data)
                .set((
                    articles::assigned_editor.eq(editor.id),
                    articles::status.eq(ArticleStatus::AssignedToEditor),
                ))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "assign", editor.id);

            Ok(data)
        })?;

        self.data = data;

        events::notify(
            &[editor.id, self.data.author],
            events::Assigned { who: actor.id, article: self.data.id },
        );

        Ok(())
    }

    /// Move this article to a different editor.
    ///
    /// When `preserve_history` is false the outgoing editor's revisions and
    /// change-log entries are purged, in the same transaction as the
    /// assignment change. Unlike a first assignment this never notifies the
    /// article's author.
    pub fn reassign(
        &mut self,
        dbcon: &Connection,
        actor: &User,
        editor: &User,
        preserve_history: bool,
    ) -> Result<(), AssignArticleError> {
        actor.permissions().require(PermissionBits::ASSIGN_ARTICLE)?;
        verify_transition(self.data.status, ArticleAction::Reassign)
            .map_err(AssignArticleError::InvalidStatus)?;

        if !editor.permissions().contains(PermissionBits::EDIT_ARTICLE) {
            return Err(AssignArticleError::CannotEdit);
        }

        if self.data.assigned_editor == Some(editor.id) {
            return Err(AssignArticleError::AlreadyAssigned);
        }

        let data = dbcon.transaction::<_, DbError, _>(|| {
            if let (false, Some(old)) = (preserve_history, self.data.assigned_editor) {
                self.purge_history(dbcon, actor, old)?;
            }

            let data = diesel::update(&self.data)
                .set((
                    articles::assigned_editor.eq(editor.id),
                    articles::status.eq(ArticleStatus::AssignedToEditor),
                ))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "reassign",
                LogReassign {
                    from: self.data.assigned_editor,
                    to: editor.id,
                    preserve_history,
                });

            Ok(data)
        })?;

        self.data = data;

        events::notify(
            &[editor.id],
            events::Reassigned { who: actor.id, article: self.data.id },
        );

        Ok(())
    }

    /// Assign a reviewer.
    ///
    /// Reviewers are a side assignment: they can upload corrections like the
    /// assigned editor, but their assignment does not move the status.
    pub fn assign_reviewer(
        &mut self,
        dbcon: &Connection,
        actor: &User,
        reviewer: &User,
    ) -> Result<(), AssignArticleError> {
        actor.permissions().require(PermissionBits::ASSIGN_ARTICLE)?;

        if self.data.status.is_terminal() {
            return Err(AssignArticleError::InvalidStatus(self.data.status));
        }

        if !reviewer.permissions().contains(PermissionBits::REVIEW_ARTICLE) {
            return Err(AssignArticleError::CannotReview);
        }

        let data = dbcon.transaction::<_, DbError, _>(|| {
            let data = diesel::update(&self.data)
                .set(articles::assigned_reviewer.eq(reviewer.id))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "assign-reviewer",
                reviewer.id);

            Ok(data)
        })?;

        self.data = data;

        events::notify(
            &[reviewer.id, self.data.author],
            events::Assigned { who: actor.id, article: self.data.id },
        );

        Ok(())
    }

    /// Record a corrected version of this article.
    ///
    /// The conversion gateway is consulted before the transaction opens, so
    /// no locks are held across external calls. Within the transaction a new
    /// version number is derived from the latest change-log entry; a
    /// uniqueness constraint on `(article, version_number)` backstops two
    /// concurrent uploads, in which case the losing transaction is retried
    /// once with a re-read number.
    pub fn upload_correction<G>(
        &mut self,
        dbcon: &Connection,
        gateway: &G,
        uploader: &User,
        file_url: &str,
        file_type: FileType,
        comments: Option<&str>,
        editor_document: Option<(&str, FileType)>,
    ) -> Result<ChangeLog, UploadCorrectionError>
    where
        G: ConversionGateway,
    {
        verify_transition(self.data.status, ArticleAction::UploadCorrection)
            .map_err(UploadCorrectionError::InvalidStatus)?;

        let as_editor = self.data.assigned_editor == Some(uploader.id)
            && uploader.permissions().contains(PermissionBits::EDIT_ARTICLE);
        let as_reviewer = self.data.assigned_reviewer == Some(uploader.id)
            && uploader.permissions().contains(PermissionBits::REVIEW_ARTICLE);

        if !as_editor && !as_reviewer {
            return Err(UploadCorrectionError::NotAssigned);
        }

        let converted = gateway.ensure_both_formats(file_url)?;

        let old_text = match self.data.content {
            Some(ref content) => content.clone(),
            None => match gateway.extract(&self.data.current_pdf_url) {
                Ok(extracted) => extracted.text,
                Err(err) => {
                    warn!(
                        "Could not extract previous content of article {}: {}",
                        self.data.id, err,
                    );
                    String::new()
                }
            },
        };

        let extracted = match gateway.extract(&converted.pdf_path) {
            Ok(extracted) => Some(extracted),
            Err(err) => {
                warn!(
                    "Could not extract content of a correction to article {}: {}",
                    self.data.id, err,
                );
                None
            }
        };

        let new_text = extracted.as_ref().map_or("", |e| e.text.as_str());
        let diff = diff::diff(&old_text, new_text);
        let diff_data = serde_json::to_value(&diff)?;

        // Change logs always record the canonical PDF pair, whatever format
        // was uploaded: the latest entry's new_file_url stays equal to the
        // article's current_pdf_url.
        let old_file_url = self.data.current_pdf_url.clone();
        let new_file_url = converted.pdf_path.clone();

        let reviewed_at = if as_reviewer {
            self.data.reviewed_at.or_else(|| Some(Utc::now().naive_utc()))
        } else {
            self.data.reviewed_at
        };

        let mut attempt = 0;
        let (data, log) = loop {
            let result = dbcon.transaction::<_, UploadCorrectionError, _>(|| {
                let version = ChangeLog::latest_version(dbcon, self.data.id)?
                    .unwrap_or(1)
                    + 1;
                let now = Utc::now().naive_utc();

                diesel::insert_into(article_revisions::table)
                    .values(db::NewArticleRevision {
                        article: self.data.id,
                        pdf_url: &converted.pdf_path,
                        word_url: Some(&converted.word_path),
                        uploader: uploader.id,
                        comments,
                        created_at: now,
                    })
                    .execute(dbcon)?;

                let log = diesel::insert_into(article_change_logs::table)
                    .values(db::NewArticleChangeLog {
                        article: self.data.id,
                        version_number: version,
                        old_file_url: &old_file_url,
                        new_file_url: &new_file_url,
                        file_type,
                        diff_data: diff_data.clone(),
                        status: ChangeStatus::Pending,
                        editor: uploader.id,
                        edited_at: now,
                        comments,
                        editor_document_url: editor_document.map(|(url, _)| url),
                        editor_document_type: editor_document.map(|(_, kind)| kind),
                        visual_diff_status: VisualDiffStatus::Pending,
                    })
                    .get_result::<db::ArticleChangeLog>(dbcon)?;

                let data = diesel::update(&self.data)
                    .set((
                        articles::current_pdf_url.eq(&converted.pdf_path),
                        articles::current_word_url
                            .eq(Some(converted.word_path.as_str())),
                        articles::status.eq(ArticleStatus::EditorEditing),
                        articles::content
                            .eq(extracted.as_ref().map(|e| e.text.as_str())),
                        articles::content_html
                            .eq(extracted.as_ref().map(|e| e.html.as_str())),
                        articles::reviewed_at.eq(reviewed_at),
                    ))
                    .get_result::<db::Article>(dbcon)?;

                audit::log_db_actor(
                    dbcon, uploader.id, "articles", self.data.id,
                    "upload-correction", version);

                Ok((data, log))
            });

            match result {
                Ok(v) => break v,
                Err(UploadCorrectionError::Internal(DbError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation, _,
                ))) if attempt == 0 => attempt += 1,
                Err(err) => return Err(err),
            }
        };

        self.data = data;

        events::notify(&[self.data.author], events::CorrectionUploaded {
            article: self.data.id,
            version: log.version_number,
        });

        Ok(ChangeLog::from_db(log))
    }

    /// The assigned editor signs off on their corrections.
    ///
    /// All of this article's pending change-log entries become approved.
    pub fn editor_approve(&mut self, dbcon: &Connection, actor: &User)
    -> Result<(), ApproveArticleError> {
        verify_transition(self.data.status, ArticleAction::EditorApprove)
            .map_err(ApproveArticleError::InvalidStatus)?;

        if self.data.assigned_editor != Some(actor.id)
            || !actor.permissions().contains(PermissionBits::EDIT_ARTICLE)
        {
            return Err(ApproveArticleError::NotAssigned);
        }

        let editor_approved_at = self.data.editor_approved_at
            .or_else(|| Some(Utc::now().naive_utc()));

        let data = dbcon.transaction::<_, DbError, _>(|| {
            diesel::update(
                article_change_logs::table
                    .filter(article_change_logs::article.eq(self.data.id))
                    .filter(article_change_logs::status.eq(ChangeStatus::Pending)),
            )
                .set(article_change_logs::status.eq(ChangeStatus::Approved))
                .execute(dbcon)?;

            let data = diesel::update(&self.data)
                .set((
                    articles::status.eq(ArticleStatus::EditorApproved),
                    articles::editor_approved_at.eq(editor_approved_at),
                ))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "editor-approve", ());

            Ok(data)
        })?;

        self.data = data;

        events::notify(
            &[self.data.author],
            events::Approved { article: self.data.id },
        );

        Ok(())
    }

    /// Put this article in the direct administrator approval queue, skipping
    /// the editor workflow.
    pub fn request_approval(&mut self, dbcon: &Connection, actor: &User)
    -> Result<(), ApproveArticleError> {
        actor.permissions().require(PermissionBits::PUBLISH_ARTICLE)?;
        verify_transition(self.data.status, ArticleAction::RequestApproval)
            .map_err(ApproveArticleError::InvalidStatus)?;

        let data = dbcon.transaction::<_, DbError, _>(|| {
            let data = diesel::update(&self.data)
                .set(articles::status.eq(ArticleStatus::PendingApproval))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "request-approval",
                ());

            Ok(data)
        })?;

        self.data = data;

        Ok(())
    }

    /// Publish an editor-approved article.
    ///
    /// This is the only transition which also bulk-flips the article's
    /// pending and approved change-log entries to published.
    pub fn publish(&mut self, dbcon: &Connection, actor: &User)
    -> Result<(), ApproveArticleError> {
        actor.permissions().require(PermissionBits::PUBLISH_ARTICLE)?;
        verify_transition(self.data.status, ArticleAction::Publish)
            .map_err(ApproveArticleError::InvalidStatus)?;

        let approved_at = self.data.approved_at
            .or_else(|| Some(Utc::now().naive_utc()));

        let data = dbcon.transaction::<_, DbError, _>(|| {
            diesel::update(
                article_change_logs::table
                    .filter(article_change_logs::article.eq(self.data.id))
                    .filter(article_change_logs::status.eq_any(vec![
                        ChangeStatus::Pending,
                        ChangeStatus::Approved,
                    ])),
            )
                .set(article_change_logs::status.eq(ChangeStatus::Published))
                .execute(dbcon)?;

            let data = diesel::update(&self.data)
                .set((
                    articles::status.eq(ArticleStatus::Published),
                    articles::approved_at.eq(approved_at),
                ))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "publish", ());

            Ok(data)
        })?;

        self.data = data;

        let mut recipients = vec![self.data.author];
        if let Some(editor) = self.data.assigned_editor {
            recipients.push(editor);
        }

        events::notify(&recipients, events::Published { article: self.data.id });

        Ok(())
    }

    /// Publish directly, bypassing the editor workflow.
    ///
    /// Unlike [`Article::publish`] this leaves change-log statuses alone, as
    /// no editor has reviewed them.
    pub fn direct_approve(&mut self, dbcon: &Connection, actor: &User)
    -> Result<(), ApproveArticleError> {
        actor.permissions().require(PermissionBits::PUBLISH_ARTICLE)?;
        verify_transition(self.data.status, ArticleAction::DirectApprove)
            .map_err(ApproveArticleError::InvalidStatus)?;

        let approved_at = self.data.approved_at
            .or_else(|| Some(Utc::now().naive_utc()));

        let data = dbcon.transaction::<_, DbError, _>(|| {
            let data = diesel::update(&self.data)
                .set((
                    articles::status.eq(ArticleStatus::Published),
                    articles::approved_at.eq(approved_at),
                ))
                .get_result::<db::Article>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "direct-approve", ());

            Ok(data)
        })?;

        self.data = data;

        events::notify(
            &[self.data.author],
            events::Published { article: self.data.id },
        );

        Ok(())
    }

    /// Delete this article and all of its history.
    ///
    /// Irreversible and admin-only.
    pub fn delete(self, dbcon: &Connection, actor: &User)
    -> Result<(), DeleteArticleError> {
        actor.permissions().require(PermissionBits::DELETE_ARTICLE)?;

        dbcon.transaction::<_, DbError, _>(|| {
            diesel::delete(
                article_change_logs::table
                    .filter(article_change_logs::article.eq(self.data.id)),
            )
                .execute(dbcon)?;
            diesel::delete(
                article_revisions::table
                    .filter(article_revisions::article.eq(self.data.id)),
            )
                .execute(dbcon)?;
            diesel::delete(&self.data).execute(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "articles", self.data.id, "delete", ());

            Ok(())
        })?;

        Ok(())
    }

    /// Migrate this article's editor assignment away from its current
    /// holder, as part of deactivating them.
    ///
    /// Follows [`plan_migration`]: the status only changes along the
    /// reassignment edge of the transition table. Articles the workflow has
    /// already moved past editing keep their status and merely lose the
    /// assignment. Must be called inside a transaction, it does not open
    /// its own.
    pub(super) fn migrate_assignment(
        self,
        dbcon: &Connection,
        actor: &User,
        fallback: Option<&User>,
    ) -> Result<(), DbError> {
        let plan = plan_migration(self.data.status, fallback.is_some());

        match (plan, fallback) {
            (Migration::Reassign, Some(editor)) => {
                diesel::update(&self.data)
                    .set((
                        articles::assigned_editor.eq(editor.id),
                        articles::status.eq(ArticleStatus::AssignedToEditor),
                    ))
                    .execute(dbcon)?;

                audit::log_db_actor(
                    dbcon, actor.id, "articles", self.data.id, "reassign",
                    LogReassign {
                        from: self.data.assigned_editor,
                        to: editor.id,
                        preserve_history: true,
                    });
            }
            (Migration::ClearAssignment, _) => {
                diesel::update(&self.data)
                    .set(articles::assigned_editor.eq(None::<i32>))
                    .execute(dbcon)?;

                audit::log_db_actor(
                    dbcon, actor.id, "articles", self.data.id, "unassign", ());
            }
            _ => {
                diesel::update(&self.data)
                    .set((
                        articles::assigned_editor.eq(None::<i32>),
                        articles::status.eq(ArticleStatus::PendingAdminReview),
                    ))
                    .execute(dbcon)?;

                audit::log_db_actor(
                    dbcon, actor.id, "articles", self.data.id, "unassign", ());
            }
        }

        Ok(())
    }

    fn purge_history(&self, dbcon: &Connection, actor: &User, uploader: i32)
    -> Result<(), DbError> {
        diesel::delete(
            article_change_logs::table
                .filter(article_change_logs::article.eq(self.data.id))
                .filter(article_change_logs::editor.eq(uploader)),
        )
            .execute(dbcon)?;
        diesel::delete(
            article_revisions::table
                .filter(article_revisions::article.eq(self.data.id))
                .filter(article_revisions::uploader.eq(uploader)),
        )
            .execute(dbcon)?;

        audit::log_db_actor(
            dbcon, actor.id, "articles", self.data.id, "purge-history",
            uploader);

        Ok(())
    }
}

impl std::ops::Deref for Article {
    type Target = db::Article;

    fn deref(&self) -> &db::Article {
        &self.data
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum FindArticleError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// No article found matching given criteria.
    #[fail(display = "No such article")]
    #[api(code = "article:not-found", status = "NOT_FOUND")]
    NotFound,
}

impl_from! { for FindArticleError ;
    DbError => |e| FindArticleError::Internal(e),
}

#[derive(ApiError, Debug, Fail)]
pub enum CreateArticleError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
}

impl_from! { for CreateArticleError ;
    DbError => |e| CreateArticleError::Internal(e),
}

#[derive(ApiError, Debug, Fail)]
pub enum AssignArticleError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// Actor is not permitted to assign articles.
    #[fail(display = "{}", _0)]
    Forbidden(#[cause] RequirePermissionsError),
    /// Assignment is not legal in the article's current status.
    #[fail(display = "Article cannot be assigned while it is {}", _0)]
    #[api(code = "article:invalid-status", status = "BAD_REQUEST")]
    InvalidStatus(ArticleStatus),
    /// The chosen user cannot edit articles.
    #[fail(display = "User cannot edit articles")]
    #[api(code = "article:assign:cannot-edit", status = "BAD_REQUEST")]
    CannotEdit,
    /// The chosen user cannot review articles.
    #[fail(display = "User cannot review articles")]
    #[api(code = "article:assign:cannot-review", status = "BAD_REQUEST")]
    CannotReview,
    /// Reassignment to the editor already assigned.
    #[fail(display = "User is already assigned to this article")]
    #[api(code = "article:assign:already-assigned", status = "BAD_REQUEST")]
    AlreadyAssigned,
}

impl_from! { for AssignArticleError ;
    DbError => |e| AssignArticleError::Internal(e),
    RequirePermissionsError => |e| AssignArticleError::Forbidden(e),
}

#[derive(ApiError, Debug, Fail)]
pub enum UploadCorrectionError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// Serialization of the diff failed.
    #[fail(display = "Could not serialize diff: {}", _0)]
    #[api(internal)]
    Serialize(#[cause] serde_json::Error),
    /// Uploads are not legal in the article's current status.
    #[fail(display = "Corrections cannot be uploaded while article is {}", _0)]
    #[api(code = "article:invalid-status", status = "BAD_REQUEST")]
    InvalidStatus(ArticleStatus),
    /// Uploader is neither the assigned editor nor the assigned reviewer.
    #[fail(display = "User is not assigned to this article")]
    #[api(code = "article:not-assigned", status = "FORBIDDEN")]
    NotAssigned,
    /// The uploaded document could not be converted.
    #[fail(display = "{}", _0)]
    Conversion(#[cause] ConversionError),
}

impl_from! { for UploadCorrectionError ;
    DbError => |e| UploadCorrectionError::Internal(e),
    serde_json::Error => |e| UploadCorrectionError::Serialize(e),
    ConversionError => |e| UploadCorrectionError::Conversion(e),
}

#[derive(ApiError, Debug, Fail)]
pub enum ApproveArticleError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// Actor is not permitted to approve or publish articles.
    #[fail(display = "{}", _0)]
    Forbidden(#[cause] RequirePermissionsError),
    /// Approval is not legal in the article's current status.
    #[fail(display = "Article cannot be approved while it is {}", _0)]
    #[api(code = "article:invalid-status", status = "BAD_REQUEST")]
    InvalidStatus(ArticleStatus),
    /// Actor is not the assigned editor.
    #[fail(display = "User is not assigned to this article")]
    #[api(code = "article:not-assigned", status = "FORBIDDEN")]
    NotAssigned,
}

impl_from! { for ApproveArticleError ;
    DbError => |e| ApproveArticleError::Internal(e),
    RequirePermissionsError => |e| ApproveArticleError::Forbidden(e),
}

#[derive(ApiError, Debug, Fail)]
pub enum DeleteArticleError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// Actor is not permitted to delete articles.
    #[fail(display = "{}", _0)]
    Forbidden(#[cause] RequirePermissionsError),
}

impl_from! { for DeleteArticleError ;
    DbError => |e| DeleteArticleError::Internal(e),
    RequirePermissionsError => |e| DeleteArticleError::Forbidden(e),
}

#[derive(Serialize)]
struct LogCreate<'a> {
    title: &'a str,
    slug: &'a str,
}

#[derive(Serialize)]
struct LogReassign {
    from: Option<i32>,
    to: i32,
    preserve_history: bool,
}

#[cfg(test)]
mod tests {
    use super::{ArticleAction::*, transition_allowed};
    use crate::db::types::ArticleStatus::{self, *};

    const ALL_STATUSES: [ArticleStatus; 6] = [
        PendingAdminReview, AssignedToEditor, EditorEditing,
        EditorApproved, PendingApproval, Published,
    ];

    #[test]
    fn happy_path_is_legal() {
        assert!(transition_allowed(PendingAdminReview, AssignEditor));
        assert!(transition_allowed(AssignedToEditor, UploadCorrection));
        assert!(transition_allowed(EditorEditing, UploadCorrection));
        assert!(transition_allowed(EditorEditing, EditorApprove));
        assert!(transition_allowed(EditorApproved, Publish));
    }

    #[test]
    fn legacy_direct_path_is_legal() {
        assert!(transition_allowed(PendingAdminReview, RequestApproval));
        assert!(transition_allowed(PendingApproval, DirectApprove));
        // An admin can still back out of the direct path by assigning an
        // editor.
        assert!(transition_allowed(PendingApproval, AssignEditor));
        assert!(transition_allowed(PendingAdminReview, DirectApprove));
        assert!(transition_allowed(AssignedToEditor, DirectApprove));
    }

    #[test]
    fn reassignment_loop_edges() {
        assert!(transition_allowed(PendingAdminReview, Reassign));
        assert!(transition_allowed(AssignedToEditor, Reassign));
        assert!(transition_allowed(EditorEditing, Reassign));
        assert!(!transition_allowed(EditorApproved, Reassign));
        assert!(!transition_allowed(PendingApproval, Reassign));
    }

    #[test]
    fn published_is_terminal() {
        for &action in &[
            AssignEditor, Reassign, UploadCorrection, EditorApprove,
            RequestApproval, DirectApprove, Publish,
        ] {
            assert!(
                !transition_allowed(Published, action),
                "published articles must reject {:?}",
                action,
            );
        }
    }

    #[test]
    fn publish_only_from_editor_approved() {
        for &status in &ALL_STATUSES {
            assert_eq!(
                transition_allowed(status, Publish),
                status == EditorApproved,
            );
        }
    }

    #[test]
    fn deactivation_follows_the_reassignment_edge() {
        use super::{Migration, plan_migration};

        for &status in &[PendingAdminReview, AssignedToEditor, EditorEditing] {
            assert_eq!(plan_migration(status, true), Migration::Reassign);
            assert_eq!(plan_migration(status, false), Migration::ReturnToQueue);
        }
    }

    #[test]
    fn deactivation_preserves_approved_standing() {
        use super::{Migration, plan_migration};

        // No reassignment edge leaves these statuses, so losing the editor
        // must not rewrite them.
        for &status in &[EditorApproved, PendingApproval, Published] {
            assert_eq!(plan_migration(status, true), Migration::ClearAssignment);
            assert_eq!(plan_migration(status, false), Migration::ClearAssignment);
        }
    }

    #[test]
    fn no_uploads_after_editor_approval() {
        assert!(!transition_allowed(EditorApproved, UploadCorrection));
        assert!(!transition_allowed(PendingApproval, UploadCorrection));
        assert!(!transition_allowed(PendingAdminReview, UploadCorrection));
    }
}
