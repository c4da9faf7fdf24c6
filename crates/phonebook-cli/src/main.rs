//! Phone book CLI
//!
//! Command-line interface for inserting, listing, searching and updating
//! phone book entries.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use phonebook_core::{fields, AccessMode, Document, IndexedField, Query, Table, TableError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "Phone book - page through, add, edit and search entries")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Phone book file (overrides the configured location)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Open the phone book without write access
    #[arg(long, global = true)]
    read_only: bool,

    /// Config file to use instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new entry
    #[command(alias = "add")]
    Insert {
        #[command(flatten)]
        fields: FieldArgs,
        /// Whole entry as a JSON object of strings
        #[arg(long)]
        doc: Option<String>,
    },
    /// Show all entries page by page
    #[command(alias = "ls")]
    All {
        /// Entries per page (defaults to the configured page size)
        #[arg(short = 'n', long)]
        page_size: Option<usize>,
    },
    /// Find entries by first and/or last name
    Search {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Edit every entry matching the search fields
    Update {
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        fields: FieldArgs,
        /// Fields to overwrite as a JSON object of strings
        #[arg(long)]
        doc: Option<String>,
    },
    /// Show table location and counts
    Status,
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
        /// Configuration key (data_dir, file_name, table_name, page_size)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Entry fields to insert or overwrite
#[derive(Args, Debug, Default)]
struct FieldArgs {
    /// First name
    #[arg(long, alias = "first_name")]
    first_name: Option<String>,
    /// Last name
    #[arg(long, alias = "last_name")]
    last_name: Option<String>,
    /// Patronymic
    #[arg(long)]
    patronymic: Option<String>,
    /// Personal phone number
    #[arg(long, alias = "personal_number")]
    personal_number: Option<String>,
    /// Office phone number
    #[arg(long, alias = "office_number")]
    office_number: Option<String>,
    /// Company name
    #[arg(long, alias = "company_name")]
    company_name: Option<String>,
}

impl FieldArgs {
    /// Document holding only the fields that were given
    fn into_document(self) -> Document {
        [
            (fields::FIRST_NAME, self.first_name),
            (fields::LAST_NAME, self.last_name),
            (fields::PATRONYMIC, self.patronymic),
            (fields::PERSONAL_NUMBER, self.personal_number),
            (fields::OFFICE_NUMBER, self.office_number),
            (fields::COMPANY_NAME, self.company_name),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

/// Fields an entry must match
#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// Match entries with this first name
    #[arg(long, alias = "search_first_name")]
    search_first_name: Option<String>,
    /// Match entries with this last name
    #[arg(long, alias = "search_last_name")]
    search_last_name: Option<String>,
}

impl SearchArgs {
    fn into_query(self) -> Query {
        let mut query = Query::new();
        if let Some(value) = self.search_first_name {
            query.set(IndexedField::FirstName, value);
        }
        if let Some(value) = self.search_last_name {
            query.set(IndexedField::LastName, value);
        }
        query
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if let Some(hint) = recovery_hint(&err) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_deref();

    // Commands that don't need the table
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config = commands::config::load(config_path)?;
    let path = cli.file.clone().unwrap_or_else(|| config.table_path());
    let mode = if cli.read_only {
        AccessMode::ReadOnly
    } else {
        AccessMode::ReadWrite
    };

    debug!("Opening {:?} in mode \"{}\"", path, mode);
    let mut table = Table::open(config.table_name.clone(), path, mode)?;

    match cli.command {
        Commands::Insert { fields, doc } => {
            commands::insert::run(&mut table, fields.into_document(), doc, &output)
        }
        Commands::All { page_size } => {
            let page_size = page_size.unwrap_or(config.page_size);
            commands::list::run(&mut table, page_size, &output)
        }
        Commands::Search { search } => {
            commands::search::run(&mut table, search.into_query(), &output)
        }
        Commands::Update {
            search,
            fields,
            doc,
        } => commands::update::run(
            &mut table,
            search.into_query(),
            fields.into_document(),
            doc,
            &output,
        ),
        Commands::Status => commands::status::show(&mut table, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Install the stderr logger
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown unless
/// `--verbose` is given.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "phonebook_core={},phonebook_cli={}",
            default_level, default_level
        ))
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Recovery suggestion for storage failures, if there is one
fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| match cause.downcast_ref::<TableError>() {
        Some(TableError::Storage(storage)) => storage.recovery_suggestion(),
        _ => None,
    })
}
