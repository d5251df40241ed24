use uuid::Uuid;

/// A notification event, as persisted in a user's event stream.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Event {
    Assigned(Assigned),
    Reassigned(Reassigned),
    CorrectionUploaded(CorrectionUploaded),
    Approved(Approved),
    Published(Published),
}

/// An editor or reviewer was assigned to an article.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Assigned {
    /// User who assigned.
    pub who: i32,
    /// Article to which the user was assigned.
    pub article: Uuid,
}

/// An article was moved to a different editor.
///
/// Unlike [`Assigned`] this is never delivered to the article's author.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reassigned {
    pub who: i32,
    pub article: Uuid,
}

/// A corrected version of an article was uploaded.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CorrectionUploaded {
    pub article: Uuid,
    /// Version number of the new change-log entry.
    pub version: i32,
}

/// The assigned editor approved their corrections.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Approved {
    pub article: Uuid,
}

/// An article was published.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Published {
    pub article: Uuid,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match *self {
            Event::Assigned(_) => "article-assigned",
            Event::Reassigned(_) => "article-reassigned",
            Event::CorrectionUploaded(_) => "correction-uploaded",
            Event::Approved(_) => "article-approved",
            Event::Published(_) => "article-published",
        }
    }
}

impl_from! { for Event ;
    Assigned => |e| Event::Assigned(e),
    Reassigned => |e| Event::Reassigned(e),
    CorrectionUploaded => |e| Event::CorrectionUploaded(e),
    Approved => |e| Event::Approved(e),
    Published => |e| Event::Published(e),
}
