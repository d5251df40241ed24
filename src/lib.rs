// TEMPORARY, see diesel-rs/diesel#1787.
#![allow(proc_macro_derive_resolution_fallback)]

#[macro_use] extern crate bitflags;
#[macro_use] extern crate diesel;
#[macro_use] extern crate failure;
#[macro_use] extern crate log;
#[macro_use] extern crate quire_macros;
#[macro_use] extern crate serde_derive;

#[cfg(not(debug_assertions))]
#[macro_use]
extern crate diesel_migrations;

pub use quire_macros::*;
pub use self::cli::main;
pub use self::error::{ApiError, Error};

pub(crate) use self::config::Config;

#[macro_use] mod macros;

pub mod audit;
pub mod cli;
pub mod config;
pub mod conversion;
pub mod db;
pub mod diff;
pub mod error;
pub mod events;
pub mod models;
pub mod permissions;
pub mod processing;
pub mod utils;

pub type Result<T, E=failure::Error> = std::result::Result<T, E>;
