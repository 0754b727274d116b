mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use birthcal_core::config::Overrides;
use birthcal_core::language::Language;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "birthcal")]
#[command(about = "Build a yearly recurring birthday calendar from a game-data API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every character and write the birthday calendar
    Build {
        /// Config file (defaults to <config dir>/birthcal/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Language code, e.g. "chs", "en", "jp"
        #[arg(short, long)]
        language: Option<Language>,

        /// API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Where to write the .ics file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// IANA timezone, e.g. "Asia/Shanghai"
        #[arg(long)]
        timezone: Option<String>,

        /// Keep characters the API marks as beta
        #[arg(long)]
        include_beta: bool,
    },
    /// List the events of a written calendar with their next occurrence
    Show {
        /// Calendar file (defaults to the configured output)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            config,
            language,
            base_url,
            output,
            timezone,
            include_beta,
        } => {
            let overrides = Overrides {
                language,
                base_url,
                output,
                timezone,
                include_beta,
            };
            commands::build::run(config.as_deref(), overrides).await
        }
        Commands::Show { path } => commands::show::run(path),
    }
}
