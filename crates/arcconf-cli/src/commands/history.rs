//! History command
//!
//! Usage: arcconf history <DEVICE> [--json]

use super::context::{load_config, open_store, GlobalArgs};
use arcconf_store::repo::list_runs;
use clap::Args;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Device name
    pub device: String,

    /// Print the runs as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: HistoryArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let store = open_store(&config)?;
    let device = config.device_path(&args.device)?;

    let runs = list_runs(store.connection(), &device)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No runs recorded for {}", device);
        return Ok(());
    }
    for run in &runs {
        println!(
            "{}  {}  +{} ~{} -{}  ops={}  digest={}",
            run.started_at,
            run.run_id,
            run.created,
            run.updated,
            run.deleted,
            run.ops_applied,
            run.change_log_digest
        );
    }
    Ok(())
}
