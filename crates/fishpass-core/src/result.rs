//! Propagation output rows.

use crate::id::{OriginId, ReachId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why traversal stopped (or did not stop) at a reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    /// Population fell to or below the threshold at this reach.
    Threshold,
    /// The reach has no upstream neighbours.
    Headwater,
    /// Traversal continued upstream past this reach.
    None,
}

impl StopReason {
    /// The table spelling of the reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Headwater => "headwater",
            Self::None => "none",
        }
    }

    /// Whether traversal ended at this reach.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the result table: the population reaching `reach_id`
/// from `origin_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropagationResult {
    /// The origin this row belongs to.
    pub origin_id: OriginId,
    /// The visited reach.
    pub reach_id: ReachId,
    /// Population after barrier attenuation on this reach, before any
    /// confluence split.
    pub population: f64,
    /// Termination status at this reach.
    pub stop_reason: StopReason,
}

/// A per-origin failure entry.
///
/// Origins are independent units of work; a failing origin is reported
/// here instead of aborting the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OriginFailure {
    /// The failing origin.
    pub origin_id: OriginId,
    /// Human-readable error, carrying the offending identifiers.
    pub error: String,
}
