//! readlist CLI
//!
//! Command-line interface for readlist - save pages to read later, and
//! move the list in and out as JSON or CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use readlist_core::{
    Config, Format, JsonFileStore, MergeMode, ReadingList, ReadingListError, Status,
};

mod commands;
mod logging;
mod metadata;
mod output;
mod prompt;

use commands::item::AddArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "readlist")]
#[command(about = "readlist - A reading list with JSON and CSV import/export")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a page
    Add(AddArgs),
    /// List saved pages, newest first
    #[command(alias = "ls")]
    List {
        /// Only pages with this status
        #[arg(short, long)]
        status: Option<Status>,
    },
    /// Show page details
    Show {
        /// Page ID (full ID or prefix)
        id: String,
    },
    /// Set the reading status of a page
    Status {
        /// Page ID (full ID or prefix)
        id: String,
        /// New status (unread, reading, read)
        status: Status,
    },
    /// Replace the comment on a page
    Comment {
        /// Page ID (full ID or prefix)
        id: String,
        /// Comment text (empty to clear)
        text: String,
    },
    /// Delete a page
    #[command(alias = "rm")]
    Delete {
        /// Page ID (full ID or prefix)
        id: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a page in the default browser
    Open {
        /// Page ID (full ID or prefix)
        id: String,
    },
    /// Export the reading list to a file
    Export {
        /// File format (json or csv)
        format: Format,
        /// Directory to write into
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Import pages from a JSON or CSV file
    Import {
        /// File to import
        file: PathBuf,
        /// append (merge by URL) or overwrite (replace the list)
        #[arg(short, long)]
        mode: Option<MergeMode>,
        /// MIME type of the file, when the extension doesn't tell
        #[arg(long = "type", value_name = "MIME")]
        mime_type: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, export_dir, default_import_mode, fetch_titles, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        if let Some(hint) = recovery_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config, cli.verbose);

    let list = ReadingList::new(JsonFileStore::from_config(&config));

    match cli.command {
        Commands::Add(args) => commands::item::add(&list, &config, args, &output).await,
        Commands::List { status } => commands::item::list(&list, status, &output),
        Commands::Show { id } => commands::item::show(&list, &id, &output),
        Commands::Status { id, status } => {
            commands::item::set_status(&list, &id, status, &output)
        }
        Commands::Comment { id, text } => commands::item::comment(&list, &id, &text, &output),
        Commands::Delete { id, yes } => commands::item::delete(&list, &id, yes, &output),
        Commands::Open { id } => commands::item::open(&list, &id, &output),
        Commands::Export { format, dir } => {
            commands::transfer::export(&list, &config, format, dir, &output).map(|_| ())
        }
        Commands::Import {
            file,
            mode,
            mime_type,
        } => commands::transfer::import(
            &list,
            &config,
            &file,
            mode,
            mime_type.as_deref(),
            &output,
        ),
        Commands::Config { command } => handle_config_command(command, config_path, &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// A suggestion for storage failures the user can fix
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ReadingListError>())
        .and_then(|e| match e {
            ReadingListError::Persistence(store_error) => store_error.recovery_suggestion(),
            _ => None,
        })
}
