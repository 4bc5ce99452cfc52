//! Origin resolution.
//!
//! Origins come from one of three places, tried in order: the user's
//! origin table, watershed auto-topology, or a user main-stem list.
//! Table rows are checked one by one; a bad row becomes an
//! [`OriginFailure`] in its input position instead of aborting the run.

use std::fmt;

use fishpass_core::{DataError, OriginFailure, OriginId, OriginRecord, ReachIndex};
use fishpass_network::NetworkModel;
use indexmap::IndexSet;

/// A resolved origin, ready to walk.
#[derive(Clone, Debug, PartialEq)]
pub struct Origin {
    /// Origin identifier.
    pub origin_id: OriginId,
    /// Entry reach.
    pub reach: ReachIndex,
    /// Population entering `reach`.
    pub initial_population: f64,
}

/// Where a run's origins came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OriginSource {
    /// The user's origin table.
    Table,
    /// Watershed classification.
    AutoTopology,
    /// The user's main-stem list.
    MainStems,
}

impl fmt::Display for OriginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "origin table",
            Self::AutoTopology => "auto-topology",
            Self::MainStems => "main-stem list",
        })
    }
}

/// Resolve origin table rows against `network`, in row order.
///
/// A row fails with [`DataError::DuplicateOrigin`] if its identifier was
/// already used, [`DataError::NegativePopulation`] for a negative or
/// non-finite population, or [`DataError::UnknownOriginReach`] if its
/// reach is not in the network.
pub fn from_table(
    records: &[OriginRecord],
    network: &NetworkModel,
) -> Vec<Result<Origin, OriginFailure>> {
    let mut seen: IndexSet<&OriginId> = IndexSet::with_capacity(records.len());
    records
        .iter()
        .map(|record| {
            let fail = |error: DataError| OriginFailure {
                origin_id: record.origin_id.clone(),
                error: error.to_string(),
            };
            if !seen.insert(&record.origin_id) {
                return Err(fail(DataError::DuplicateOrigin {
                    origin: record.origin_id.clone(),
                }));
            }
            let pop = record.initial_population;
            if !pop.is_finite() || pop < 0.0 {
                return Err(fail(DataError::NegativePopulation {
                    origin: record.origin_id.clone(),
                    value: pop,
                }));
            }
            let reach = network
                .index_of(record.reach_id.as_str())
                .ok_or_else(|| {
                    fail(DataError::UnknownOriginReach {
                        origin: record.origin_id.clone(),
                        reach: record.reach_id.clone(),
                    })
                })?;
            Ok(Origin {
                origin_id: record.origin_id.clone(),
                reach,
                initial_population: pop,
            })
        })
        .collect()
}

/// Origins at discovered reaches, each named after its reach.
pub fn from_reaches(
    reaches: &[ReachIndex],
    population: f64,
    network: &NetworkModel,
) -> Vec<Result<Origin, OriginFailure>> {
    reaches
        .iter()
        .map(|&reach| {
            Ok(Origin {
                origin_id: network.reach_id(reach).into(),
                reach,
                initial_population: population,
            })
        })
        .collect()
}
