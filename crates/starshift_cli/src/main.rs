//! Starshift CLI - migrate starred repositories between GitHub accounts.

mod commands;
mod config;
mod progress;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starshift")]
#[command(version)]
#[command(about = "Migrate starred repositories between GitHub accounts")]
#[command(
    long_about = "Starshift copies the starred repositories of one GitHub account to \
another. Private repositories are skipped, per-repository failures are recorded and \
retried manually later, and source-side stars can optionally be removed after a \
successful copy."
)]
#[command(after_long_help = r#"EXAMPLES
    Migrate all public stars, removing them from the source account:
        $ starshift migrate

    Copy stars without touching the source account:
        $ starshift migrate --keep-stars

    Verify both tokens before migrating:
        $ starshift check

CONFIGURATION
    Starshift reads configuration from:
      1. ~/.config/starshift/config.toml (or $XDG_CONFIG_HOME/starshift/config.toml)
      2. ./starshift.toml
      3. Environment variables (STARSHIFT_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    STARSHIFT_SOURCE_TOKEN    Personal access token for the source account
    STARSHIFT_TARGET_TOKEN    Personal access token for the target account
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate starred repositories from the source to the target account
    Migrate {
        #[command(flatten)]
        args: MigrateArgs,
    },
    /// Verify both credentials and print starred counts without mutating
    Check,
}

/// Options for the migrate command.
#[derive(Debug, Clone, clap::Args)]
pub struct MigrateArgs {
    /// Maximum concurrent API requests (default from config or 20)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Repositories fetched per page (default from config or 100)
    #[arg(short = 'p', long)]
    pub page_size: Option<usize>,

    /// Don't remove stars from the source account after migration
    #[arg(short = 'k', long)]
    pub keep_stars: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when not connected to a TTY; interactive
    // runs get progress bars instead.
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("starshift=info,starshift_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { args } => commands::migrate::handle_migrate(args, &config).await?,
        Commands::Check => commands::check::handle_check(&config).await?,
    }

    Ok(())
}
