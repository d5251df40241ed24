//! Visual-diff artefacts, generated at most once per change-log entry.
//!
//! There is no job queue here. The `visual_diff_status` column itself is the
//! mutex: workers race on an atomic conditional update from `Pending` or
//! `Failed` to `Generating`, and the affected-row count decides who renders.
//! Whoever wins must resolve the row to `Ready` or `Failed` before
//! returning, the lock is never left held.

use diesel::{prelude::*, result::Error as DbError};
use failure::Fail;
use uuid::Uuid;

use std::{
    fs,
    path::{Path, PathBuf},
    thread::sleep,
    time::Duration,
};

use crate::{
    ApiError,
    audit,
    db::{
        Connection,
        models as db,
        schema::article_change_logs,
        types::{ChangeStatus, FileType, VisualDiffStatus},
    },
};

/// How long to wait for a concurrent generation before giving up.
///
/// A single fixed delay, not a backoff loop. Callers who still find the row
/// unresolved after it get a retryable error.
const CONTENTION_DELAY: Duration = Duration::from_secs(2);

/// External renderer producing the visual-diff artefact.
///
/// Implementations must write a file at `dest`; the coordinator verifies the
/// file exists afterwards and treats a missing one as failure regardless of
/// the returned value.
pub trait VisualDiffRenderer {
    fn render(&self, old_file_url: &str, new_file_url: &str, dest: &Path)
    -> Result<(), RenderError>;
}

#[derive(Debug, Fail)]
#[fail(display = "Could not render visual diff: {}", _0)]
pub struct RenderError(pub String);

/// Produce the visual diff for a change-log entry, or return the existing
/// one.
///
/// At most one caller generates at a time. Concurrent callers wait out a
/// single [`CONTENTION_DELAY`] and then either pick up the finished result
/// or receive [`GenerateVisualDiffError::InProgress`].
///
/// On success returns the artefact's path relative to `storage`.
pub fn generate_visual_diff<R>(
    dbcon: &Connection,
    storage: &Path,
    renderer: &R,
    id: i32,
) -> Result<String, GenerateVisualDiffError>
where
    R: VisualDiffRenderer,
{
    let row = load(dbcon, id)?;

    // Cache hit, unless the artefact has vanished from the backing store.
    if row.visual_diff_status == VisualDiffStatus::Ready {
        if let Some(url) = existing_artifact(storage, &row) {
            return Ok(url);
        }

        diesel::update(&row)
            .set((
                article_change_logs::visual_diff_status
                    .eq(VisualDiffStatus::Pending),
                article_change_logs::visual_diff_url.eq(None::<String>),
            ))
            .execute(dbcon)?;
    }

    let acquired = diesel::update(
        article_change_logs::table
            .filter(article_change_logs::id.eq(id))
            .filter(article_change_logs::visual_diff_status.eq_any(vec![
                VisualDiffStatus::Pending,
                VisualDiffStatus::Failed,
            ])),
    )
        .set(article_change_logs::visual_diff_status
            .eq(VisualDiffStatus::Generating))
        .execute(dbcon)?;

    if acquired == 0 {
        // Another worker holds the lock. Give it one chance to finish.
        sleep(CONTENTION_DELAY);

        let row = load(dbcon, id)?;

        if row.visual_diff_status == VisualDiffStatus::Ready {
            if let Some(url) = existing_artifact(storage, &row) {
                return Ok(url);
            }
        }

        return Err(GenerateVisualDiffError::InProgress);
    }

    match render(storage, renderer, &row) {
        Ok(url) => {
            diesel::update(&row)
                .set((
                    article_change_logs::visual_diff_status
                        .eq(VisualDiffStatus::Ready),
                    article_change_logs::visual_diff_url.eq(url.as_str()),
                ))
                .execute(dbcon)?;

            audit::log_db_actor(
                dbcon, audit::Actor::System, "change-logs", id,
                "generate-visual-diff", &url);

            Ok(url)
        }
        Err(err) => {
            // A failed entry must not advertise a stale artefact.
            diesel::update(&row)
                .set((
                    article_change_logs::visual_diff_status
                        .eq(VisualDiffStatus::Failed),
                    article_change_logs::status.eq(ChangeStatus::Failed),
                    article_change_logs::visual_diff_url.eq(None::<String>),
                ))
                .execute(dbcon)?;

            Err(err)
        }
    }
}

fn render<R>(
    storage: &Path,
    renderer: &R,
    row: &db::ArticleChangeLog,
) -> Result<String, GenerateVisualDiffError>
where
    R: VisualDiffRenderer,
{
    if row.file_type != FileType::Pdf {
        return Err(GenerateVisualDiffError::NotPdf(row.file_type));
    }

    let relative = artifact_path(row.article, row.version_number);
    let dest = storage.join(&relative);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(GenerateVisualDiffError::Storage)?;
    }

    renderer.render(&row.old_file_url, &row.new_file_url, &dest)?;

    // The renderer returning is not enough, the file must actually exist.
    if !dest.is_file() {
        return Err(GenerateVisualDiffError::Render(RenderError(
            "renderer did not write the output file".to_string())));
    }

    Ok(relative.to_string_lossy().into_owned())
}

/// Where a change-log entry's artefact lives, relative to the storage root.
fn artifact_path(article: Uuid, version: i32) -> PathBuf {
    PathBuf::from("visual-diffs")
        .join(article.to_string())
        .join(format!("v{}.pdf", version))
}

/// Check that a `Ready` row's artefact is still present, returning its URL.
fn existing_artifact(storage: &Path, row: &db::ArticleChangeLog)
-> Option<String> {
    match row.visual_diff_url {
        Some(ref url) if storage.join(url).is_file() => Some(url.clone()),
        _ => None,
    }
}

/// Reset a stuck `Generating` row back to `Pending`.
///
/// There is no lease on the lock, so a generator which crashed mid-render
/// leaves its row held until an operator runs this.
pub fn reset_visual_diff(dbcon: &Connection, id: i32)
-> Result<bool, DbError> {
    let reset = diesel::update(
        article_change_logs::table
            .filter(article_change_logs::id.eq(id))
            .filter(article_change_logs::visual_diff_status
                .eq(VisualDiffStatus::Generating)),
    )
        .set((
            article_change_logs::visual_diff_status
                .eq(VisualDiffStatus::Pending),
            article_change_logs::visual_diff_url.eq(None::<String>),
        ))
        .execute(dbcon)?;

    Ok(reset > 0)
}

/// Re-queue `Ready` rows whose artefact has vanished from the backing store.
///
/// Returns the number of rows re-queued.
pub fn process_stale(dbcon: &Connection, storage: &Path)
-> Result<usize, DbError> {
    let ready = article_change_logs::table
        .filter(article_change_logs::visual_diff_status
            .eq(VisualDiffStatus::Ready))
        .get_results::<db::ArticleChangeLog>(dbcon)?;

    let mut count = 0;

    for row in ready {
        if existing_artifact(storage, &row).is_some() {
            continue;
        }

        diesel::update(&row)
            .set((
                article_change_logs::visual_diff_status
                    .eq(VisualDiffStatus::Pending),
                article_change_logs::visual_diff_url.eq(None::<String>),
            ))
            .execute(dbcon)?;
        count += 1;
    }

    Ok(count)
}

fn load(dbcon: &Connection, id: i32)
-> Result<db::ArticleChangeLog, GenerateVisualDiffError> {
    article_change_logs::table
        .filter(article_change_logs::id.eq(id))
        .get_result::<db::ArticleChangeLog>(dbcon)
        .optional()?
        .ok_or(GenerateVisualDiffError::NotFound)
}

#[derive(ApiError, Debug, Fail)]
pub enum GenerateVisualDiffError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// No change log entry found matching given criteria.
    #[fail(display = "No such change log entry")]
    #[api(code = "change-log:not-found", status = "NOT_FOUND")]
    NotFound,
    /// Another worker is generating this artefact right now.
    #[fail(display = "Visual diff generation is already in progress, retry later")]
    #[api(code = "visual-diff:in-progress", status = "SERVICE_UNAVAILABLE")]
    InProgress,
    /// Visual diffs can only be produced between PDF files.
    #[fail(display = "Cannot generate a visual diff for {} files", _0)]
    #[api(code = "visual-diff:not-pdf", status = "BAD_REQUEST")]
    NotPdf(FileType),
    /// Could not prepare the destination directory.
    #[fail(display = "Could not write to artefact storage: {}", _0)]
    #[api(internal)]
    Storage(#[cause] std::io::Error),
    /// The external renderer failed.
    #[fail(display = "{}", _0)]
    #[api(code = "visual-diff:render-failed", status = "BAD_REQUEST")]
    Render(#[cause] RenderError),
}

impl_from! { for GenerateVisualDiffError ;
    DbError => |e| GenerateVisualDiffError::Internal(e),
    RenderError => |e| GenerateVisualDiffError::Render(e),
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::artifact_path;

    #[test]
    fn artifact_path_is_per_article_and_version() {
        let article = Uuid::nil();

        let a = artifact_path(article, 2);
        let b = artifact_path(article, 3);

        assert_ne!(a, b);
        assert!(a.starts_with("visual-diffs"));
        assert!(a.ends_with("v2.pdf"));
    }
}

#[cfg(test)]
mod render_tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use uuid::Uuid;

    use std::{fs, path::Path};

    use crate::db::{
        models as db,
        types::{ChangeStatus, FileType, VisualDiffStatus},
    };
    use super::{GenerateVisualDiffError, RenderError, VisualDiffRenderer, render};

    fn row(file_type: FileType) -> db::ArticleChangeLog {
        db::ArticleChangeLog {
            id: 1,
            article: Uuid::nil(),
            version_number: 2,
            old_file_url: "old.pdf".to_string(),
            new_file_url: "new.pdf".to_string(),
            file_type,
            diff_data: json!({}),
            status: ChangeStatus::Pending,
            editor: 1,
            edited_at: NaiveDate::from_ymd(2026, 1, 1).and_hms(0, 0, 0),
            comments: None,
            editor_document_url: None,
            editor_document_type: None,
            visual_diff_status: VisualDiffStatus::Generating,
            visual_diff_url: None,
        }
    }

    struct Writes;

    impl VisualDiffRenderer for Writes {
        fn render(&self, _: &str, _: &str, dest: &Path)
        -> Result<(), RenderError> {
            fs::write(dest, b"%PDF-1.4")
                .map_err(|e| RenderError(e.to_string()))
        }
    }

    /// Returns success without writing anything.
    struct Lies;

    impl VisualDiffRenderer for Lies {
        fn render(&self, _: &str, _: &str, _: &Path)
        -> Result<(), RenderError> {
            Ok(())
        }
    }

    #[test]
    fn render_returns_a_relative_path() {
        let storage = tempfile::tempdir().unwrap();

        let url = render(storage.path(), &Writes, &row(FileType::Pdf))
            .unwrap();

        assert!(storage.path().join(&url).is_file());
    }

    #[test]
    fn render_rejects_non_pdf() {
        let storage = tempfile::tempdir().unwrap();

        match render(storage.path(), &Writes, &row(FileType::Docx)) {
            Err(GenerateVisualDiffError::NotPdf(FileType::Docx)) => {}
            other => panic!("expected NotPdf, got {:?}", other),
        }
    }

    #[test]
    fn render_verifies_the_output_was_written() {
        let storage = tempfile::tempdir().unwrap();

        match render(storage.path(), &Lies, &row(FileType::Pdf)) {
            Err(GenerateVisualDiffError::Render(_)) => {}
            other => panic!("expected a render error, got {:?}", other),
        }
    }
}
