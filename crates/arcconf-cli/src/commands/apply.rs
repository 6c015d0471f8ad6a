//! Apply command
//!
//! Usage: arcconf apply <DOCUMENT> [--dry-run] [--verbose] [--json]
//!
//! Provisions the document's device if needed, then reconciles its stored
//! archive configuration to the document in one transaction.

use super::context::{load_config, open_store, GlobalArgs};
use arcconf_core::changelog::{render_summary, Verbosity};
use arcconf_core::schema::Schema;
use arcconf_core_types::RequestContext;
use arcconf_engine::commands::{commit_archive_config, provision_device, SyncOptions};
use arcconf_store::parse_document_file;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document describing the desired state
    pub document: PathBuf,

    /// Plan and report without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Include attribute mutations in the change log
    #[arg(long)]
    pub verbose: bool,

    /// Print the change log as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ApplyArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let schema = Schema::archive()?;
    let document = parse_document_file(&schema, &args.document)?;
    let mut store = open_store(&config)?;
    let device = config.device_path(&document.device)?;

    // A dry run must not write, not even the device entry
    if !args.dry_run {
        provision_device(&mut store, &device)?;
    }

    let options = SyncOptions {
        verbosity: if args.verbose {
            Verbosity::Verbose
        } else {
            config.verbosity
        },
        dry_run: args.dry_run,
        context: RequestContext::new(),
    };
    let outcome = commit_archive_config(
        &mut store,
        &device,
        &schema,
        document.archive.as_ref(),
        &options,
    )?;

    if args.json {
        println!("{}", outcome.change_log.to_json_pretty()?);
        return Ok(());
    }

    print!("{}", render_summary(&outcome.change_log));
    if args.dry_run {
        println!("\nDry run (nothing applied):");
        println!("  ops_planned: {}", outcome.ops.len());
    } else {
        println!("\nApplied:");
        println!("  run_id: {}", outcome.change_log.run_id());
        println!("  ops_applied: {}", outcome.applied);
    }
    Ok(())
}
