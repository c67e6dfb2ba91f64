// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - a Telegram admin back-office bot for forum publishing.
//!
//! This is the binary entry point.

mod admin;
mod dump;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use herald_config::{ConfigError, HeraldConfig};

/// Herald - a Telegram admin back-office bot for forum publishing.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot until SIGINT or SIGTERM.
    Serve,
    /// Write a SQL dump of the database.
    Export {
        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the database contents with a dump produced by `export`.
    Import {
        /// Dump file to load.
        file: PathBuf,
    },
    /// Manage administrators stored in the database.
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
    /// Apply pending schema migrations and exit.
    Migrate,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Grant admin rights to a Telegram user id.
    Add { user_id: i64 },
    /// Revoke admin rights from a Telegram user id.
    Remove { user_id: i64 },
    /// List every administrator.
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => herald_config::load_and_validate_path(path),
        None => herald_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => exit_with_config_errors(&errors),
    };

    init_tracing(&config.bot.log_level);

    let result = match cli.command {
        Commands::Serve => {
            if let Err(errors) = herald_config::validation::validate_for_serve(&config) {
                exit_with_config_errors(&errors);
            }
            serve::run_serve(config).await
        }
        Commands::Export { output } => dump::run_export(&config, output.as_deref()).await,
        Commands::Import { file } => dump::run_import(&config, &file).await,
        Commands::Admin { action } => run_admin(&config, action).await,
        Commands::Migrate => admin::run_migrate(&config).await,
    };

    if let Err(e) = result {
        eprintln!("herald: {e}");
        std::process::exit(1);
    }
}

async fn run_admin(
    config: &HeraldConfig,
    action: AdminCommand,
) -> Result<(), herald_core::HeraldError> {
    match action {
        AdminCommand::Add { user_id } => admin::run_add(config, user_id).await,
        AdminCommand::Remove { user_id } => admin::run_remove(config, user_id).await,
        AdminCommand::List => admin::run_list(config).await,
    }
}

fn exit_with_config_errors(errors: &[ConfigError]) -> ! {
    herald_config::render_errors(errors);
    std::process::exit(1);
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `herald export` can stream the dump on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herald={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
