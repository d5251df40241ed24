//! Commands for managing visual-diff artefacts.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    processing,
};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Reset a change-log entry stuck in generation
    ///
    /// There is no automatic lock reclaim. A generator which crashed leaves
    /// its entry held until reset by this command.
    #[structopt(name = "reset")]
    Reset(ResetOpts),
    /// Re-queue entries whose artefact is missing from storage
    #[structopt(name = "process-stale")]
    ProcessStale,
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    match opts.command {
        Command::Reset(opts) => reset(cfg, opts),
        Command::ProcessStale => process_stale(cfg),
    }
}

#[derive(StructOpt)]
pub struct ResetOpts {
    /// ID of the change-log entry to reset
    id: i32,
}

pub fn reset(cfg: &Config, opts: ResetOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let log = crate::models::ChangeLog::by_id(&db, opts.id)?;

    if processing::reset_visual_diff(&db, log.id)? {
        println!("Reset change-log entry {}", log.id);
    } else {
        println!("Change-log entry {} was not stuck in generation", log.id);
    }

    Ok(())
}

pub fn process_stale(cfg: &Config) -> Result<()> {
    let db = db::connect(cfg)?;

    let count = processing::process_stale(&db, &cfg.storage.path)?;

    println!("Re-queued {} change-log entries", count);

    Ok(())
}
