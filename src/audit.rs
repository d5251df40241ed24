use diesel::prelude::*;
use serde::Serialize;
use std::cell::Cell;
use uuid::Uuid;

use crate::db::{
    Connection,
    models as db,
    schema::audit_log,
};

std::thread_local! {
    static ACTOR: Cell<Option<Actor>> = Cell::new(None);
}

/// Entity responsible for an action.
#[derive(Clone, Copy, Debug)]
pub enum Actor {
    /// System. This actor is used for actions carried automatically by the
    /// system, and actions invoked from the CLI.
    System,
    /// A user.
    User(i32),
}

impl Actor {
    fn as_db(&self) -> Option<i32> {
        match *self {
            Actor::System => None,
            Actor::User(id) => Some(id),
        }
    }
}

impl From<i32> for Actor {
    fn from(id: i32) -> Self {
        Actor::User(id)
    }
}

/// Set actor associated with the current thread, returning previous one, if
/// any.
pub fn set_actor<A>(actor: A) -> Option<Actor>
where
    Option<Actor>: From<A>,
{
    ACTOR.with(|c| c.replace(Option::from(actor)))
}

/// Get actor associated with the current thread.
///
/// ## Panics
///
/// This function will panic if the current thread has no actor associated
/// with it (see [`set_actor()`]).
pub fn get_actor() -> Actor {
    ACTOR.with(Cell::get)
        .expect("no audit actor registered on current thread")
}

/// Store an event in the audit log.
///
/// Takes an explicit database connection and can safely be used inside an
/// existing transaction, only adding the event when the transaction is
/// committed. Logging is best effort: a failed entry is reported and
/// dropped, it never fails the operation being logged.
///
/// ## Panics
///
/// This function will panic if the current thread has no actor associated
/// with it (see [`set_actor()`]).
pub fn log_db<I, D>(
    db: &Connection,
    context: &str,
    context_id: I,
    kind: &str,
    data: D,
)
where
    ContextId: From<I>,
    D: Serialize,
{
    log_db_actor(db, get_actor(), context, context_id, kind, data);
}

/// Store an event in the audit log.
///
/// This is a version of [`log_db()`] which takes an explicit actor.
pub fn log_db_actor<A, I, D>(
    db: &Connection,
    actor: A,
    context: &str,
    context_id: I,
    kind: &str,
    data: D,
)
where
    Actor: From<A>,
    ContextId: From<I>,
    D: Serialize,
{
    let actor = Actor::from(actor).as_db();
    let (context_id, context_uuid) = ContextId::from(context_id).into_db();

    let data = match encode(&data) {
        Some(data) => data,
        None => return,
    };

    let r = diesel::insert_into(audit_log::table)
        .values(db::NewAuditLog {
            actor,
            context,
            context_id,
            context_uuid,
            kind,
            data: &data,
        })
        .execute(db);

    if let Err(err) = r {
        error!("Could not save an audit log entry: {}", err);
    }
}

fn encode<D: Serialize>(data: D) -> Option<Vec<u8>> {
    match rmps::to_vec_named(&data) {
        Ok(data) => Some(data),
        Err(err) => {
            error!("Could not serialize an audit log entry: {}", err);
            None
        }
    }
}

pub enum ContextId {
    Integer(i32),
    Uuid(Uuid),
}

impl ContextId {
    fn into_db(self) -> (Option<i32>, Option<Uuid>) {
        match self {
            ContextId::Integer(id) => (Some(id), None),
            ContextId::Uuid(id) => (None, Some(id)),
        }
    }
}

impl From<i32> for ContextId {
    fn from(id: i32) -> Self {
        ContextId::Integer(id)
    }
}

impl From<Uuid> for ContextId {
    fn from(id: Uuid) -> Self {
        ContextId::Uuid(id)
    }
}

#[cfg(test)]
mod tests {
    use serde::ser::{Error as _, Serialize, Serializer};

    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot be serialized"))
        }
    }

    #[test]
    fn bad_entries_are_dropped_not_fatal() {
        assert!(super::encode(&Broken).is_none());
        assert!(super::encode(&("articles", 17)).is_some());
    }
}
