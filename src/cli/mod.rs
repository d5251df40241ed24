use structopt::StructOpt;

use crate::{Result, audit};

mod article;
mod user;
mod visual_diff;

#[derive(StructOpt)]
struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Manage articles
    #[structopt(name = "article")]
    Article(article::Opts),
    /// Manage users
    #[structopt(name = "user")]
    User(user::Opts),
    /// Manage visual-diff artefacts
    #[structopt(name = "visual-diff")]
    VisualDiff(visual_diff::Opts),
}

pub fn main() -> Result<()> {
    let opts = Opts::from_args();
    let config = crate::config::load()?;

    setup_logging(&config.logging)?;

    // Everything done from the CLI is attributed to the system itself.
    audit::set_actor(audit::Actor::System);

    match opts.command {
        Command::Article(opts) => article::main(config, opts),
        Command::User(opts) => user::main(config, opts),
        Command::VisualDiff(opts) => visual_diff::main(config, opts),
    }
}

fn setup_logging(config: &crate::config::Logging) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(config.level);

    for (module, level) in &config.filters {
        builder.filter_module(&module, *level);
    }

    builder.try_init()?;
    Ok(())
}
