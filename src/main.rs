//! # strstat CLI
//!
//! The `strstat` binary analyzes strings, stores them in SQLite, queries
//! them by property filters or natural language, and serves the same
//! operations over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! strstat --config ./config/strstat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `strstat init` | Create the SQLite database and run schema migrations |
//! | `strstat analyze <value>` | Print the properties of a string (no database) |
//! | `strstat add <value>` | Analyze and store a string |
//! | `strstat get <value>` | Show a stored string |
//! | `strstat list [--filter k=v]...` | List stored strings matching filters |
//! | `strstat query "<text>"` | List stored strings matching a natural-language query |
//! | `strstat delete <value>` | Delete a stored string |
//! | `strstat serve` | Start the HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use strstat::{commands, config, logging, migrate, server};

/// strstat: compute structural properties of strings and query them.
///
/// All commands except `analyze` read a TOML configuration file given by
/// `--config`.
#[derive(Parser)]
#[command(
    name = "strstat",
    about = "strstat: string analysis and lookup by properties or natural language",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/strstat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Print the computed properties of a string as JSON.
    ///
    /// Does not read the config file or touch the database.
    Analyze {
        value: String,
    },

    /// Analyze a string and store it.
    ///
    /// Fails if the same string is already stored.
    Add {
        value: String,
    },

    /// Show a stored string by its exact value.
    Get {
        value: String,
    },

    /// List stored strings, newest first.
    ///
    /// Recognized filters: `is_palindrome`, `min_length`, `max_length`,
    /// `word_count`, `contains_character`. Unrecognized keys are ignored.
    List {
        /// Filter as `key=value`; may be repeated.
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },

    /// List stored strings matching a natural-language query.
    ///
    /// Example: `strstat query "single word palindromic strings"`.
    Query {
        text: String,
    },

    /// Delete a stored string by its exact value.
    Delete {
        value: String,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

/// Parse a `key=value` pair for `--filter` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that don't require config
    if let Commands::Analyze { value } = &cli.command {
        logging::init_tracing(&config::Config::minimal().logging);
        return commands::run_analyze(value);
    }

    let cfg = config::load_config(&cli.config)?;
    logging::init_tracing(&cfg.logging);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Analyze { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Add { value } => commands::run_add(&cfg, &value).await?,
        Commands::Get { value } => commands::run_get(&cfg, &value).await?,
        Commands::List { filters } => commands::run_list(&cfg, filters).await?,
        Commands::Query { text } => commands::run_query(&cfg, &text).await?,
        Commands::Delete { value } => commands::run_delete(&cfg, &value).await?,
        Commands::Serve => server::run_server(&cfg).await?,
    }

    Ok(())
}
