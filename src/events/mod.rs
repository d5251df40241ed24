//! Handling of events and notifications.
//!
//! Every event is persisted in the recipient's event stream; delivery beyond
//! that (email, push, …) is the business of an externally registered
//! [`Notifier`]. Notification is strictly best-effort: failures are logged
//! and never affect the workflow transition that produced the event.

use diesel::prelude::*;
use serde::Serialize;

use crate::{
    db::{models as db, pool, schema},
    utils::SingleInit,
};

mod events;

pub use self::events::*;

/// External notification sender.
///
/// Implementations deliver the payload out of band (email, web push). This
/// is fire-and-forget: the caller ignores everything but the error message.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        kind: &str,
        recipients: &[i32],
        payload: &serde_json::Value,
    ) -> Result<(), failure::Error>;
}

static NOTIFIER: SingleInit<Box<dyn Notifier>> = SingleInit::uninit();

/// Register the external notification sender.
///
/// Only the first registration takes effect. Without one events are still
/// persisted, just not delivered anywhere.
pub fn register_notifier(notifier: Box<dyn Notifier>) {
    NOTIFIER.get_or_init(|| notifier);
}

/// Emit an event to a set of recipients.
///
/// Errors will be logged, but otherwise ignored. This must only be called
/// after the transition that produced the event has been committed.
pub fn notify<E>(recipients: &[i32], event: E)
where
    Event: From<E>,
{
    let event = Event::from(event);

    if let Err(err) = do_notify(recipients, &event) {
        error!("Could not dispatch event notification: {}", err);
    }
}

/// Persist an event for each recipient and forward it to the notifier.
fn do_notify(recipients: &[i32], event: &Event) -> crate::Result<()> {
    let db = pool()?.get()?;

    let mut data = Vec::new();
    event.serialize(&mut rmps::Serializer::new(&mut data))?;

    for &user in recipients {
        diesel::insert_into(schema::events::table)
            .values(&db::NewEvent {
                user,
                kind: event.kind(),
                data: &data,
            })
            .execute(&*db)?;
    }

    if let Some(notifier) = NOTIFIER.get() {
        let payload = serde_json::to_value(event)?;
        notifier.notify(event.kind(), recipients, &payload)?;
    }

    Ok(())
}
