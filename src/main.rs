use clap::{Parser, Subcommand};
use sqldemo::config::resolve_config;
use sqldemo::results_grid::OutputFormat;
use sqldemo::runner::{Example, ExampleArgs, Runner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Example SQL workflows against the sample database.
#[derive(Debug, Parser)]
#[command(name = "sqldemo", version, about)]
struct Cli {
    /// Configuration file (defaults to <config dir>/sqldemo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// How recordsets are printed
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the first rows of the info table
    Query {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Drop, recreate and seed the sample tables
    Setup,
    /// Run the example sequence
    Examples {
        /// Also run insert, update and delete
        #[arg(long)]
        mutations: bool,
        /// Also run the transaction, join and stored procedure examples
        #[arg(long)]
        advanced: bool,
    },
    /// Run a single example
    Run {
        #[arg(value_enum)]
        example: Example,
        /// Record id for get-by-id, update and delete
        #[arg(long)]
        id: Option<i64>,
        /// Name for insert and update, or the procedure argument
        #[arg(long)]
        name: Option<String>,
        /// Search term
        #[arg(long)]
        term: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    info!("Using database {}", config.database.path.display());

    match cli.command {
        Command::Query { limit } => {
            Runner::new(config, cli.format).basic_query(limit);
        }
        Command::Setup => {
            if !Runner::new(config, cli.format).setup() {
                return ExitCode::FAILURE;
            }
        }
        Command::Examples {
            mutations,
            advanced,
        } => {
            config.examples.mutations |= mutations;
            config.examples.advanced |= advanced;
            Runner::new(config, cli.format).run_all();
        }
        Command::Run {
            example,
            id,
            name,
            term,
        } => {
            let args = ExampleArgs { id, name, term };
            // Failures are reported by the runner.
            let _ = Runner::new(config, cli.format).run_example(example, &args);
        }
    }

    ExitCode::SUCCESS
}
