//! tutorlens - flags prompts that ask for answers instead of help
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::assertions_on_result_states,
        reason = "Allow for tests"
    )
)]

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Commands};

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    handlers::init_logging(cli.log_file).await?;

    let config = handlers::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify { text } => handlers::handle_classify(&config, text).await?,
        Commands::Rules => handlers::handle_rules(&config)?,
        Commands::Watch { transcript } => handlers::handle_watch(&config, &transcript).await?,
        Commands::Config => handlers::handle_config(&config)?,
    }

    Ok(())
}
