//! aim - AppImage manager CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aim_cli::cmd;
use aim_cli::{Cli, Commands, log_directive};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // AIM_LOG wins over -v
    let filter = EnvFilter::try_from_env("AIM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let home = cli.home.as_deref();
    match cli.command {
        Commands::Install { ids } => cmd::install::install(home, &ids).await,
        Commands::Remove { ids } => cmd::remove::remove(home, &ids),
        Commands::Update { ids } => cmd::update::update(home, &ids).await,
        Commands::Check { ids } => cmd::check::check(home, &ids).await,
        Commands::Search {
            keywords,
            no_prompt,
        } => cmd::search::search(home, &keywords, no_prompt).await,
        Commands::List => cmd::list::list(home),
        Commands::Auto => cmd::auto::auto(home).await,
    }
}
