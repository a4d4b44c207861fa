mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use studywatch_storage::Database;

#[derive(Parser)]
#[command(name = "studywatch")]
#[command(about = "Focus monitor for live study sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a live study session (p = pause/resume, s = stop, Ctrl-C = stop)
    Live {
        /// Student name; defaults to user.name from config
        #[arg(short, long)]
        username: Option<String>,
        /// Focus service host, overriding server.ip
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Show recorded sessions, newest first
    History {
        /// Only show sessions for this student
        #[arg(short, long)]
        username: Option<String>,
        /// Maximum number of sessions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Print raw JSON records
        #[arg(long)]
        json: bool,
    },
    /// Show the total study time for a day
    Today {
        /// Only count sessions for this student
        #[arg(short, long)]
        username: Option<String>,
        /// Date to summarise (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value (e.g. server.ip)
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let db = Database::new(None)?;

    match cli.command {
        Commands::Live { username, server } => {
            commands::live::run_live_session(db, username, server).await
        }
        Commands::History {
            username,
            limit,
            json,
        } => commands::history::show_history(&db, username.as_deref(), limit, json),
        Commands::Today { username, date } => {
            commands::history::show_day_total(&db, username.as_deref(), date.as_deref())
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => commands::config::handle_config_get(&db, &key),
            ConfigAction::Set { key, value } => {
                commands::config::handle_config_set(&db, &key, &value)
            }
            ConfigAction::List => commands::config::handle_config_list(&db),
        },
    }
}
