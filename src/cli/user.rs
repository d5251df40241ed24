//! Commands for managing users.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::User,
    permissions::PermissionBits,
};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Add a new user
    #[structopt(name = "add")]
    Add(AddOpts),
    /// Deactivate a user, migrating their assigned articles
    #[structopt(name = "deactivate")]
    Deactivate(DeactivateOpts),
    /// List all users
    #[structopt(name = "list")]
    List,
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::Add(opts) => add_user(cfg, opts),
        Command::Deactivate(opts) => deactivate_user(cfg, opts),
        Command::List => list_users(cfg),
    }
}

#[derive(StructOpt)]
pub struct AddOpts {
    /// User's email address
    email: String,
    /// User's name
    #[structopt(long = "name", short = "n")]
    name: String,
    /// This user is an administrator
    #[structopt(long = "administrator")]
    is_admin: bool,
    /// This user is an editor
    #[structopt(long = "editor")]
    is_editor: bool,
    /// This user is a reviewer
    #[structopt(long = "reviewer")]
    is_reviewer: bool,
}

pub fn add_user(cfg: &Config, opts: AddOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let mut permissions = PermissionBits::empty();
    if opts.is_admin {
        permissions.insert(PermissionBits::administrator());
    }
    if opts.is_editor {
        permissions.insert(PermissionBits::editor());
    }
    if opts.is_reviewer {
        permissions.insert(PermissionBits::reviewer());
    }

    let user = User::create(&db, &opts.email, &opts.name, permissions)?;

    println!("Created user {}", user.id);

    Ok(())
}

#[derive(StructOpt)]
pub struct DeactivateOpts {
    /// ID or email of the user to deactivate
    user: String,
    /// ID of an administrator to act as
    #[structopt(long = "as")]
    actor: i32,
    /// Editor to migrate the user's articles to
    #[structopt(long = "fallback")]
    fallback: Option<i32>,
}

fn resolve_user(db: &db::Connection, user: &str) -> Result<User> {
    match user.parse::<i32>() {
        Ok(id) => User::by_id(db, id).map_err(From::from),
        Err(_) => User::by_email(db, user).map_err(From::from),
    }
}

pub fn deactivate_user(cfg: &Config, opts: DeactivateOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let actor = User::by_id(&db, opts.actor)?;
    let mut user = resolve_user(&db, &opts.user)?;
    let fallback = opts.fallback
        .map(|id| User::by_id(&db, id))
        .transpose()?;

    let migrated = user.deactivate(&db, &actor, fallback.as_ref())?;

    println!("Deactivated user {}, {} articles migrated", user.id, migrated);

    Ok(())
}

pub fn list_users(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    for user in User::all(&db)? {
        println!(
            "{}\t{}\t{}\t{}",
            user.id,
            user.email,
            user.name,
            if user.is_active { "active" } else { "deactivated" },
        );
    }

    Ok(())
}
