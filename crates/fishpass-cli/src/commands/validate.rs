//! `fishpass validate`: build the network and summarize it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fishpass_network::NetworkModel;
use tracing::info;

use super::load_reaches;

/// Arguments for `fishpass validate`.
#[derive(Args)]
pub struct ValidateArgs {
    /// Reach table (reach_id, downstream_id, ...)
    #[arg(long)]
    pub reaches: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let records = load_reaches(&args.reaches, None)?;
    let network = NetworkModel::build(&records)?;
    info!(reaches = network.len(), "network is valid");

    println!("reaches:     {}", network.len());
    println!("outlets:     {}", network.outlets().count());
    println!("headwaters:  {}", network.headwaters().count());
    println!("confluences: {}", network.confluences().count());
    Ok(())
}
