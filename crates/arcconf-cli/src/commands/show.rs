//! Show command
//!
//! Usage: arcconf show <DEVICE>

use super::context::{load_config, open_store, GlobalArgs};
use arcconf_core::schema::Schema;
use arcconf_engine::commands::load_archive_config;
use arcconf_store::render_document;
use clap::Args;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Device name
    pub device: String,
}

pub fn execute(args: ShowArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let store = open_store(&config)?;
    let schema = Schema::archive()?;
    let device = config.device_path(&args.device)?;

    let outcome = load_archive_config(&store, &device, &schema)?;
    if let Some(outcome) = &outcome {
        for skipped in &outcome.skipped {
            eprintln!(
                "warning: skipped {} entry {}: {}",
                skipped.collection, skipped.path, skipped.error
            );
        }
    }

    let text = render_document(&args.device, outcome.as_ref().map(|o| &o.entity))?;
    print!("{}", text);
    Ok(())
}
