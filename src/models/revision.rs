use chrono::NaiveDateTime;
use diesel::{prelude::*, result::Error as DbError};
use uuid::Uuid;

use crate::db::{
    Connection,
    models as db,
    schema::article_revisions,
};

/// A single file uploaded for an article, preserved verbatim.
///
/// Revisions are the raw upload history. Derived data, such as diffs, lives
/// in [`ChangeLog`](super::ChangeLog).
#[derive(Debug)]
pub struct Revision {
    data: db::ArticleRevision,
}

#[derive(Debug, Serialize)]
pub struct PublicData {
    pub id: i32,
    pub article: Uuid,
    pub pdf_url: String,
    pub word_url: Option<String>,
    pub uploader: i32,
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Revision {
    pub(super) fn from_db(data: db::ArticleRevision) -> Revision {
        Revision { data }
    }

    /// Get all revisions of an article, oldest first.
    pub fn all_of(dbcon: &Connection, article: Uuid) -> Result<Vec<Revision>, DbError> {
        article_revisions::table
            .filter(article_revisions::article.eq(article))
            .order_by(article_revisions::created_at.asc())
            .get_results::<db::ArticleRevision>(dbcon)
            .map(|v| v.into_iter().map(Revision::from_db).collect())
    }

    pub fn get_public(&self) -> PublicData {
        let db::ArticleRevision {
            id, article, ref pdf_url, ref word_url, uploader, ref comments,
            created_at,
        } = self.data;

        PublicData {
            id,
            article,
            pdf_url: pdf_url.clone(),
            word_url: word_url.clone(),
            uploader,
            comments: comments.clone(),
            created_at,
        }
    }
}

impl std::ops::Deref for Revision {
    type Target = db::ArticleRevision;

    fn deref(&self) -> &db::ArticleRevision {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_data_mirrors_the_upload() {
        let article = Uuid::nil();
        let revision = Revision::from_db(db::ArticleRevision {
            id: 3,
            article,
            pdf_url: "uploads/a/r3.pdf".into(),
            word_url: None,
            uploader: 7,
            comments: Some("typo fixes".into()),
            created_at: chrono::NaiveDate::from_ymd(2026, 3, 14)
                .and_hms(9, 26, 53),
        });

        let public = revision.get_public();
        assert_eq!(public.id, 3);
        assert_eq!(public.article, article);
        assert_eq!(public.pdf_url, "uploads/a/r3.pdf");
        assert_eq!(public.word_url, None);
        assert_eq!(public.uploader, 7);
        assert_eq!(public.comments.as_deref(), Some("typo fixes"));
    }
}
