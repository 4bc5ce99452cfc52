//! Subcommand implementations.

pub mod classify;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use fishpass_core::{ReachRecord, WatershedMembership};
use fishpass_tables::{open, read_reaches, read_watersheds, ReachColumns, WatershedColumns};

pub(crate) fn load_reaches(
    path: &Path,
    split_attribute: Option<&str>,
) -> Result<Vec<ReachRecord>> {
    let columns = ReachColumns {
        split_attribute: split_attribute.map(str::to_owned),
        ..ReachColumns::default()
    };
    read_reaches(open(path)?, &columns)
        .with_context(|| format!("reading reach table {}", path.display()))
}

pub(crate) fn load_watersheds(path: &Path) -> Result<Vec<WatershedMembership>> {
    read_watersheds(open(path)?, &WatershedColumns::default())
        .with_context(|| format!("reading watershed table {}", path.display()))
}
