//! arcconf CLI
//!
//! Command-line interface for archive device configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "arcconf")]
#[command(about = "arcconf - Archive device configuration reconciliation", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::context::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the database and provision a device entry
    Init(commands::init::InitArgs),
    /// Print a device's stored archive configuration as a document
    Show(commands::show::ShowArgs),
    /// Compare two documents without touching the store
    Diff(commands::diff::DiffArgs),
    /// Reconcile the stored configuration to a document
    Apply(commands::apply::ApplyArgs),
    /// List the recorded runs for a device
    History(commands::history::HistoryArgs),
    /// Describe the archive schema
    Schema(commands::schema::SchemaArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &cli.global),
        Commands::Show(args) => commands::show::execute(args, &cli.global),
        Commands::Diff(args) => commands::diff::execute(args, &cli.global),
        Commands::Apply(args) => commands::apply::execute(args, &cli.global),
        Commands::History(args) => commands::history::execute(args, &cli.global),
        Commands::Schema(args) => commands::schema::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
