//! Init command
//!
//! Usage: arcconf init <DEVICE>

use super::context::{load_config, open_store, GlobalArgs};
use arcconf_engine::commands::provision_device;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Device name
    pub device: String,
}

pub fn execute(args: InitArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let mut store = open_store(&config)?;
    let device = config.device_path(&args.device)?;

    let created = provision_device(&mut store, &device)?;
    if created == 0 {
        println!("Device already provisioned: {}", device);
    } else {
        println!("Device provisioned: {}", device);
        println!("  entries_created: {}", created);
    }
    Ok(())
}
