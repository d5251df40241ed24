//! Commands for managing articles.

use structopt::StructOpt;
use uuid::Uuid;

use crate::{
    Config,
    Result,
    db::{self, Connection},
    models::{Article, User},
};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List all articles
    #[structopt(name = "list")]
    List,
    /// Show an article and its history
    #[structopt(name = "show")]
    Show(ArticleRef),
    /// Assign an editor to an article
    #[structopt(name = "assign")]
    Assign(AssignOpts),
    /// Publish an editor-approved article
    #[structopt(name = "publish")]
    Publish(ActorOpts),
    /// Publish an article directly, bypassing the editor workflow
    #[structopt(name = "approve")]
    Approve(ActorOpts),
    /// Delete an article and all of its history
    #[structopt(name = "delete")]
    Delete(ActorOpts),
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::List => list(cfg),
        Command::Show(article) => show(cfg, article),
        Command::Assign(opts) => assign(cfg, opts),
        Command::Publish(opts) => publish(cfg, opts),
        Command::Approve(opts) => approve(cfg, opts),
        Command::Delete(opts) => delete(cfg, opts),
    }
}

#[derive(StructOpt)]
pub struct ArticleRef {
    /// Article's ID or slug
    article: String,
}

impl ArticleRef {
    fn resolve(&self, db: &Connection) -> Result<Article> {
        match self.article.parse::<Uuid>() {
            Ok(id) => Article::by_id(db, id).map_err(From::from),
            Err(_) => Article::by_slug(db, &self.article).map_err(From::from),
        }
    }
}

#[derive(StructOpt)]
pub struct AssignOpts {
    #[structopt(flatten)]
    article: ArticleRef,
    /// ID of the editor to assign
    editor: i32,
    /// ID of an administrator to act as
    #[structopt(long = "as")]
    actor: i32,
    /// Reassign even if another editor is already assigned
    #[structopt(long = "reassign")]
    reassign: bool,
    /// When reassigning, purge the outgoing editor's work
    #[structopt(long = "purge")]
    purge: bool,
}

#[derive(StructOpt)]
pub struct ActorOpts {
    #[structopt(flatten)]
    article: ArticleRef,
    /// ID of an administrator to act as
    #[structopt(long = "as")]
    actor: i32,
}

pub fn list(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    for article in Article::all(&db)? {
        println!("{}\t{}\t{}", article.id, article.status, article.slug);
    }

    Ok(())
}

pub fn show(cfg: &Config, article: ArticleRef) -> Result<()> {
    let db = db::connect(cfg)?;
    let article = article.resolve(&db)?;

    println!("{:#?}", article.get_public());

    println!("Revisions:");
    for revision in crate::models::Revision::all_of(&db, article.id)? {
        let data = revision.get_public();
        println!(
            "r{}\tby {}\t{}\t{}",
            data.id,
            data.uploader,
            data.created_at,
            data.pdf_url,
        );
    }

    println!("Change log:");
    for log in crate::models::ChangeLog::all_of(&db, article.id)? {
        let data = log.get_public();
        println!(
            "v{}\t{}\t{}\t{}",
            data.version_number,
            data.status,
            data.visual_diff_status,
            data.edited_at,
        );
    }

    Ok(())
}

pub fn assign(cfg: &Config, opts: AssignOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let actor = User::by_id(&db, opts.actor)?;
    let editor = User::by_id(&db, opts.editor)?;
    let mut article = opts.article.resolve(&db)?;

    if opts.reassign {
        article.reassign(&db, &actor, &editor, !opts.purge)?;
    } else {
        article.assign_editor(&db, &actor, &editor)?;
    }

    println!("Assigned {} to {}", editor.name, article.slug);

    Ok(())
}

pub fn publish(cfg: &Config, opts: ActorOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let actor = User::by_id(&db, opts.actor)?;
    let mut article = opts.article.resolve(&db)?;

    article.publish(&db, &actor)?;

    println!("Published {}", article.slug);

    Ok(())
}

pub fn approve(cfg: &Config, opts: ActorOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let actor = User::by_id(&db, opts.actor)?;
    let mut article = opts.article.resolve(&db)?;

    article.direct_approve(&db, &actor)?;

    println!("Published {}", article.slug);

    Ok(())
}

pub fn delete(cfg: &Config, opts: ActorOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let actor = User::by_id(&db, opts.actor)?;
    let article = opts.article.resolve(&db)?;
    let slug = article.slug.clone();

    article.delete(&db, &actor)?;

    println!("Deleted {}", slug);

    Ok(())
}
