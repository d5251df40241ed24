//! Data and behaviours modelled as objects.

pub mod article;
pub mod changelog;
pub mod revision;
pub mod user;

pub use self::{
    article::Article,
    changelog::ChangeLog,
    revision::Revision,
    user::User,
};
