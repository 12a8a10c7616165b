use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for tutorlens
#[derive(Debug, Parser)]
#[command(name = "tutorlens")]
#[command(about = "Flags prompts that ask for answers instead of help", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to use instead of ~/.tutorlens/config.toml")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Write logs to ~/.tutorlens/debug.log instead of stderr")]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Classify a prompt and print the analysis as JSON")]
    Classify {
        #[arg(help = "Prompt text (read from stdin when omitted)")]
        text: Option<String>,
    },

    #[command(about = "List the active rule set")]
    Rules,

    #[command(about = "Watch a JSONL chat transcript and show advisories")]
    Watch {
        #[arg(help = "Transcript file; waited for if it does not exist yet")]
        transcript: PathBuf,
    },

    #[command(about = "Show the effective configuration")]
    Config,
}
