//! Diff command
//!
//! Usage: arcconf diff <PREV> <CURR> [--verbose] [--json]

use super::context::{load_config, GlobalArgs};
use arcconf_core::changelog::{render_summary, Verbosity};
use arcconf_core::schema::Schema;
use arcconf_engine::commands::diff_documents;
use arcconf_store::parse_document_file;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Document describing the previous state
    pub prev: PathBuf,

    /// Document describing the desired state
    pub curr: PathBuf,

    /// Include attribute mutations in the change log
    #[arg(long)]
    pub verbose: bool,

    /// Print the change log as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: DiffArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let schema = Schema::archive()?;
    let prev = parse_document_file(&schema, &args.prev)?;
    let curr = parse_document_file(&schema, &args.curr)?;

    let verbosity = if args.verbose {
        Verbosity::Verbose
    } else {
        config.verbosity
    };
    let plan = diff_documents(
        &schema,
        &config.device_base_path()?,
        &prev,
        &curr,
        verbosity,
    )?;

    if args.json {
        println!("{}", plan.change_log.to_json_pretty()?);
    } else {
        print!("{}", render_summary(&plan.change_log));
        println!("\nops_planned: {}", plan.ops.len());
    }
    Ok(())
}
