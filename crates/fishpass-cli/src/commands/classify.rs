//! `fishpass classify`: print watershed labels, main stems, and the
//! origins auto-topology would use.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fishpass_core::{ReachIndex, WatershedMembership};
use fishpass_network::{auto_origins, classify, NetworkModel, WatershedKind};

use super::{load_reaches, load_watersheds};

/// Arguments for `fishpass classify`.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Reach table
    #[arg(long)]
    pub reaches: PathBuf,

    /// Watershed membership table (watershed_id, reach_id). Defaults to
    /// the reach table's watershed_id column.
    #[arg(long)]
    pub watersheds: Option<PathBuf>,
}

pub fn execute(args: ClassifyArgs) -> Result<()> {
    let records = load_reaches(&args.reaches, None)?;
    let memberships = match &args.watersheds {
        Some(path) => load_watersheds(path)?,
        None => WatershedMembership::from_reaches(&records),
    };
    let network = NetworkModel::build(&records)?;
    let classes = classify(&network, &memberships)?;

    let names = |list: &[ReachIndex]| -> String {
        list.iter()
            .map(|&r| network.reach_id(r).as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };
    for class in classes.iter() {
        let kind = match class.kind {
            WatershedKind::Terminal => "terminal",
            WatershedKind::PassThrough => "pass-through",
        };
        println!(
            "{}\t{kind}\toutlet={}\tmembers={}",
            class.watershed_id,
            network.reach_id(class.outlet),
            class.members.len()
        );
        if !class.main_stem.is_empty() {
            println!("  main stem: {}", names(&class.main_stem));
        }
    }
    println!("origins: {}", names(&auto_origins(&network, &classes)));
    Ok(())
}
