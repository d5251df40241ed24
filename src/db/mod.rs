//! Database access.
//!
//! Row structs live in [`models`], the table DSL in [`schema`], and the
//! custom Postgres enums in [`types`]. Domain behaviour belongs to
//! [`crate::models`], not here.

use diesel::pg::PgConnection;
use failure::err_msg;
use r2d2_diesel::ConnectionManager;
use std::env;

use crate::utils::SingleInit;
use super::Config;

pub mod models;
pub mod schema;
pub mod types;

pub type Connection = PgConnection;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Database URL to connect to.
///
/// The `DATABASE_URL` environment variable takes precedence over the
/// `[database]` section of the configuration.
pub fn database_url(cfg: &Config) -> Result<String, GetDatabaseUrlError> {
    match env::var("DATABASE_URL") {
        Ok(url) => return Ok(url),
        Err(env::VarError::NotUnicode(_)) =>
            return Err(GetDatabaseUrlError::VarInvalidUnicode),
        Err(env::VarError::NotPresent) => {}
    }

    cfg.database
        .as_ref()
        .map(|db| db.url.clone())
        .ok_or(GetDatabaseUrlError::NotConfigured)
}

#[derive(Debug, Fail)]
pub enum GetDatabaseUrlError {
    #[fail(display = "No database connection configured")]
    NotConfigured,
    #[fail(display = "DATABASE_URL contains invalid Unicode")]
    VarInvalidUnicode,
}

/// Open a single connection.
///
/// CLI commands use this; request-style callers should obtain connections
/// from [`pool()`] instead.
pub fn connect(cfg: &Config) -> crate::Result<Connection> {
    use diesel::Connection;

    let url = database_url(cfg)?;
    let conn = PgConnection::establish(&url)?;

    Ok(conn)
}

static POOL: SingleInit<Pool> = SingleInit::uninit();

/// Get the shared connection pool, creating it on first use.
///
/// Creation connects once eagerly so a bad URL surfaces here rather than on
/// some later checkout, and applies pending migrations in release builds.
pub fn pool() -> crate::Result<Pool> {
    POOL.get_or_try_init(|| {
        let cfg = crate::config::load()?;
        let manager = ConnectionManager::new(database_url(cfg)?);
        let pool = Pool::new(manager)?;

        let conn = pool.get()?;

        if cfg!(not(debug_assertions)) {
            embedded_migrations::run_with_output(&*conn, &mut std::io::stderr())
                .map_err(|_| err_msg("Migrations failed"))?;
        }

        Ok(pool)
    }).map(Clone::clone)
}

#[cfg(not(debug_assertions))]
embed_migrations!();

// Keeps `pool` type-checking in debug builds, where migrations are applied
// by hand instead of being embedded.
#[cfg(debug_assertions)]
mod embedded_migrations {
    use diesel::pg::PgConnection;

    pub fn run_with_output<W>(_: &PgConnection, _: &mut W) -> Result<(), ()> {
        Ok(())
    }
}
