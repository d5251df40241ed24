use diesel::{
    Connection as _Connection,
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};

use crate::{
    ApiError,
    audit,
    db::{
        Connection,
        models as db,
        schema::{articles, users},
    },
    permissions::PermissionBits,
};
use super::article::Article;

/// A single user in the system.
#[derive(Debug)]
pub struct User {
    data: db::User,
}

/// A subset of user's data that can safely be publicly exposed.
#[derive(Debug, Serialize)]
pub struct PublicData {
    id: i32,
    name: String,
    permissions: i32,
    is_active: bool,
}

impl User {
    /// Get all users.
    pub fn all(dbcon: &Connection) -> Result<Vec<User>, DbError> {
        users::table
            .get_results::<db::User>(dbcon)
            .map(|v| v.into_iter().map(|data| User { data }).collect())
    }

    /// Find an user by ID.
    pub fn by_id(dbcon: &Connection, id: i32) -> Result<User, FindUserError> {
        users::table
            .filter(users::id.eq(id))
            .get_result::<db::User>(dbcon)
            .optional()?
            .ok_or(FindUserError::NotFound)
            .map(|data| User { data })
    }

    /// Find an user by email address.
    pub fn by_email(dbcon: &Connection, email: &str) -> Result<User, FindUserError> {
        users::table
            .filter(users::email.eq(email))
            .get_result::<db::User>(dbcon)
            .optional()?
            .ok_or(FindUserError::NotFound)
            .map(|data| User { data })
    }

    /// Create a new user.
    pub fn create(
        dbcon: &Connection,
        email: &str,
        name: &str,
        permissions: PermissionBits,
    ) -> Result<User, CreateUserError> {
        dbcon.transaction(|| {
            let user = diesel::insert_into(users::table)
                .values(db::NewUser {
                    email,
                    name,
                    permissions: permissions.bits(),
                    is_active: true,
                })
                .get_result::<db::User>(dbcon)
                .map(|data| User { data })?;

            audit::log_db(dbcon, "users", user.id, "create", LogNewUser {
                email,
                name,
                permissions: permissions.bits(),
            });

            Ok(user)
        })
    }

    /// Get the capability set granted to this user.
    ///
    /// Deactivated users retain no capabilities.
    pub fn permissions(&self) -> PermissionBits {
        if self.data.is_active {
            PermissionBits::from_bits_truncate(self.data.permissions)
        } else {
            PermissionBits::empty()
        }
    }

    /// Get the public portion of this user's data.
    pub fn get_public(&self) -> PublicData {
        let db::User { id, ref name, permissions, is_active, .. } = self.data;

        PublicData {
            id,
            name: name.clone(),
            permissions,
            is_active,
        }
    }

    /// Change this user's capability set.
    pub fn set_permissions(&mut self, dbcon: &Connection, permissions: PermissionBits)
    -> Result<(), DbError> {
        let data = dbcon.transaction::<_, DbError, _>(|| {
            let data = diesel::update(&self.data)
                .set(users::permissions.eq(permissions.bits()))
                .get_result::<db::User>(dbcon)?;

            audit::log_db(
                dbcon, "users", self.id, "set-permissions", permissions.bits());

            Ok(data)
        })?;

        self.data = data;

        Ok(())
    }

    /// Deactivate this user, migrating every article they are assigned to.
    ///
    /// Articles assigned to this user as an editor are either handed over to
    /// `fallback` through the regular reassignment transition, or returned to
    /// the administrator's queue. Articles without a legal reassignment edge,
    /// such as ones their editor already approved, keep their status and only
    /// lose the assignment. Reviewer assignments are simply cleared.
    /// The whole operation, including the deactivation itself, is a single
    /// transaction: this user can never end up inactive while still holding
    /// an assignment.
    ///
    /// Returns the number of articles affected.
    pub fn deactivate(
        &mut self,
        dbcon: &Connection,
        actor: &User,
        fallback: Option<&User>,
    ) -> Result<usize, DeactivateUserError> {
        actor.permissions().require(PermissionBits::MANAGE_USERS)?;

        if let Some(fallback) = fallback {
            if fallback.id == self.id {
                return Err(DeactivateUserError::BadFallback);
            }
        }

        let (data, count) = dbcon.transaction::<_, DbError, _>(|| {
            let mut count = 0;

            let editing = articles::table
                .filter(articles::assigned_editor.eq(self.id))
                .get_results::<db::Article>(dbcon)?;

            for article in editing {
                if article.status.is_terminal() {
                    continue;
                }

                Article::from_db(article)
                    .migrate_assignment(dbcon, actor, fallback)?;
                count += 1;
            }

            let reviewing = articles::table
                .filter(articles::assigned_reviewer.eq(self.id))
                .get_results::<db::Article>(dbcon)?;

            for article in reviewing {
                if article.status.is_terminal() {
                    continue;
                }

                diesel::update(&article)
                    .set(articles::assigned_reviewer.eq(None::<i32>))
                    .execute(dbcon)?;
                audit::log_db_actor(
                    dbcon, actor.id, "articles", article.id, "clear-reviewer",
                    self.id);
                count += 1;
            }

            let data = diesel::update(&self.data)
                .set(users::is_active.eq(false))
                .get_result::<db::User>(dbcon)?;

            audit::log_db_actor(
                dbcon, actor.id, "users", self.id, "deactivate",
                LogDeactivate {
                    fallback: fallback.map(|u| u.id),
                    migrated: count,
                });

            Ok((data, count))
        })?;

        self.data = data;

        Ok(count)
    }
}

impl std::ops::Deref for User {
    type Target = db::User;

    fn deref(&self) -> &db::User {
        &self.data
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum FindUserError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// No user found matching given criteria.
    #[fail(display = "No such user")]
    #[api(code = "user:not-found", status = "NOT_FOUND")]
    NotFound,
}

impl_from! { for FindUserError ;
    DbError => |e| FindUserError::Internal(e),
}

#[derive(ApiError, Debug, Fail)]
pub enum CreateUserError {
    /// Creation failed due to a database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// Duplicate user.
    #[fail(display = "Duplicate user")]
    #[api(code = "user:new:exists", status = "BAD_REQUEST")]
    Duplicate,
}

impl_from! { for CreateUserError ;
    DbError => |e| match e {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
            => CreateUserError::Duplicate,
        _ => CreateUserError::Internal(e),
    },
}

#[derive(ApiError, Debug, Fail)]
pub enum DeactivateUserError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Internal(#[cause] DbError),
    /// Actor is not permitted to deactivate users.
    #[fail(display = "{}", _0)]
    Forbidden(#[cause] crate::permissions::RequirePermissionsError),
    /// The fallback editor is the user being deactivated.
    #[fail(display = "Cannot migrate articles to the user being deactivated")]
    #[api(code = "user:deactivate:bad-fallback", status = "BAD_REQUEST")]
    BadFallback,
}

impl_from! { for DeactivateUserError ;
    DbError => |e| DeactivateUserError::Internal(e),
    crate::permissions::RequirePermissionsError => |e| DeactivateUserError::Forbidden(e),
}

#[derive(Serialize)]
struct LogNewUser<'a> {
    email: &'a str,
    name: &'a str,
    permissions: i32,
}

#[derive(Serialize)]
struct LogDeactivate {
    fallback: Option<i32>,
    migrated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(permissions: PermissionBits, is_active: bool) -> db::User {
        db::User {
            id: 1,
            email: "editor@example.com".into(),
            name: "Editor".into(),
            permissions: permissions.bits(),
            is_active,
        }
    }

    #[test]
    fn public_data_omits_the_email_address() {
        let user = User { data: row(PermissionBits::editor(), true) };

        let json = serde_json::to_value(user.get_public()).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["id"], 1);
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn deactivated_users_hold_no_capabilities() {
        let user = User { data: row(PermissionBits::administrator(), false) };
        assert_eq!(user.permissions(), PermissionBits::empty());
    }
}
