//! Error types for the Fishpass model.
//!
//! Four families, by how far a failure reaches:
//!
//! - [`ValidationError`]: the reach graph is malformed. Aborts the run.
//! - [`ClassificationError`]: watershed topology is ambiguous during
//!   auto-detection. Aborts the run.
//! - [`ConfigurationError`]: run options or split configuration are
//!   unusable.
//! - [`DataError`]: a table value is missing or out of range. Per-origin
//!   data errors become failure rows rather than aborting other origins.
//!
//! Every variant carries the identifier(s) needed to locate the problem
//! in the input tables.

use crate::id::{BarrierId, OriginId, ReachId, WatershedId};
use std::error::Error;
use std::fmt;

// ── ValidationError ────────────────────────────────────────────────

/// Structural errors found while building the reach graph.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// The reach table has no rows.
    EmptyNetwork,
    /// The same reach appears twice with the same downstream reference.
    DuplicateReach {
        /// The repeated reach.
        reach: ReachId,
    },
    /// A reach lists more than one downstream reach.
    MultipleDownstream {
        /// The offending reach.
        reach: ReachId,
        /// Downstream reach from its first row (`None` = outlet).
        first: Option<ReachId>,
        /// Conflicting downstream reach from a later row (`None` = outlet).
        second: Option<ReachId>,
    },
    /// A downstream reference names a reach missing from the table.
    DanglingDownstream {
        /// The reach holding the reference.
        reach: ReachId,
        /// The missing downstream reach.
        downstream: ReachId,
    },
    /// Following downstream references loops back on itself.
    Cycle {
        /// The reaches forming the loop, in downstream order.
        path: Vec<ReachId>,
    },
    /// More distinct reaches than a [`ReachIndex`](crate::ReachIndex)
    /// can address.
    TooManyReaches {
        /// Distinct reaches in the table.
        count: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNetwork => write!(f, "reach table is empty"),
            Self::DuplicateReach { reach } => write!(f, "reach '{reach}' appears more than once"),
            Self::MultipleDownstream {
                reach,
                first,
                second,
            } => {
                write!(f, "reach '{reach}' has multiple downstream reaches: ")?;
                write_target(f, first.as_ref())?;
                write!(f, " and ")?;
                write_target(f, second.as_ref())
            }
            Self::DanglingDownstream { reach, downstream } => {
                write!(
                    f,
                    "reach '{reach}' flows into '{downstream}', which is not in the reach table"
                )
            }
            Self::TooManyReaches { count } => write!(
                f,
                "reach table has {count} reaches; at most {} are supported",
                u32::MAX
            ),
            Self::Cycle { path } => {
                write!(f, "downstream cycle: ")?;
                for (i, r) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "'{r}'")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ValidationError {}

fn write_target(f: &mut fmt::Formatter<'_>, target: Option<&ReachId>) -> fmt::Result {
    match target {
        Some(r) => write!(f, "'{r}'"),
        None => write!(f, "an outlet"),
    }
}

// ── ClassificationError ────────────────────────────────────────────

/// Errors from watershed topology auto-detection.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassificationError {
    /// A membership row references a reach missing from the network.
    UnknownReach {
        /// The watershed naming the reach.
        watershed: WatershedId,
        /// The missing reach.
        reach: ReachId,
    },
    /// A reach is assigned to two different watersheds.
    OverlappingWatersheds {
        /// The reach.
        reach: ReachId,
        /// First watershed it was assigned to.
        first: WatershedId,
        /// Conflicting later watershed.
        second: WatershedId,
    },
    /// More than one member reach crosses the watershed boundary
    /// downstream.
    AmbiguousOutlet {
        /// The watershed.
        watershed: WatershedId,
        /// Every member reach whose outflow leaves the watershed.
        exits: Vec<ReachId>,
    },
    /// No member reach drains out of the watershed.
    NoOutlet {
        /// The watershed.
        watershed: WatershedId,
    },
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownReach { watershed, reach } => {
                write!(
                    f,
                    "watershed '{watershed}' lists reach '{reach}', which is not in the network"
                )
            }
            Self::OverlappingWatersheds {
                reach,
                first,
                second,
            } => write!(
                f,
                "reach '{reach}' belongs to both watershed '{first}' and '{second}'"
            ),
            Self::AmbiguousOutlet { watershed, exits } => {
                write!(f, "watershed '{watershed}' has {} outlets:", exits.len())?;
                for r in exits {
                    write!(f, " '{r}'")?;
                }
                Ok(())
            }
            Self::NoOutlet { watershed } => write!(f, "watershed '{watershed}' has no outlet"),
        }
    }
}

impl Error for ClassificationError {}

// ── ConfigurationError ─────────────────────────────────────────────

/// Errors in run options or split configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// The stop threshold is NaN, infinite, or negative.
    InvalidThreshold {
        /// The rejected value.
        value: f64,
    },
    /// `split_mode = proportional` without a `split_attribute`.
    MissingSplitAttribute,
    /// No reach in the network carries the configured split attribute.
    UnknownAttribute {
        /// The configured column name.
        attribute: String,
    },
    /// An upstream branch has no value for the split attribute.
    MissingAttribute {
        /// The branch reach.
        reach: ReachId,
        /// The split attribute.
        attribute: String,
    },
    /// A split attribute value is negative or not finite.
    InvalidAttribute {
        /// The reach.
        reach: ReachId,
        /// The split attribute.
        attribute: String,
        /// The rejected value.
        value: f64,
    },
    /// Split attribute values of a confluence's branches sum to zero.
    ZeroAttributeSum {
        /// The confluence reach.
        reach: ReachId,
        /// The split attribute.
        attribute: String,
    },
    /// The default origin population is NaN, infinite, or negative.
    InvalidDefaultPopulation {
        /// The rejected value.
        value: f64,
    },
    /// The default passage efficiency lies outside `[0, 1]`.
    InvalidDefaultEfficiency {
        /// The rejected value.
        value: f64,
    },
    /// No origin table, no main-stem list, and auto-topology disabled.
    NoOrigins,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreshold { value } => {
                write!(f, "threshold must be finite and non-negative, got {value}")
            }
            Self::MissingSplitAttribute => {
                write!(f, "split_mode 'proportional' requires split_attribute")
            }
            Self::UnknownAttribute { attribute } => {
                write!(f, "no reach carries split attribute '{attribute}'")
            }
            Self::MissingAttribute { reach, attribute } => {
                write!(f, "reach '{reach}' has no value for split attribute '{attribute}'")
            }
            Self::InvalidAttribute {
                reach,
                attribute,
                value,
            } => write!(
                f,
                "reach '{reach}' has invalid split attribute '{attribute}' = {value}"
            ),
            Self::ZeroAttributeSum { reach, attribute } => write!(
                f,
                "branches upstream of '{reach}' have zero total '{attribute}'"
            ),
            Self::InvalidDefaultPopulation { value } => write!(
                f,
                "default_initial_population must be finite and non-negative, got {value}"
            ),
            Self::InvalidDefaultEfficiency { value } => write!(
                f,
                "default_passage_efficiency must lie in [0, 1], got {value}"
            ),
            Self::NoOrigins => write!(
                f,
                "no origins: supply an origin table or main-stem list, or enable auto-topology"
            ),
        }
    }
}

impl Error for ConfigurationError {}

// ── DataError ──────────────────────────────────────────────────────

/// Missing or out-of-range table data.
#[derive(Clone, Debug, PartialEq)]
pub enum DataError {
    /// A required column is absent from a table header.
    MissingColumn {
        /// Table name (`reaches`, `barriers`, ...).
        table: &'static str,
        /// The missing column.
        column: String,
    },
    /// A cell could not be parsed.
    InvalidValue {
        /// Table name.
        table: &'static str,
        /// 1-based data row number.
        row: usize,
        /// Column name.
        column: String,
        /// The raw cell text.
        value: String,
    },
    /// A barrier's passage efficiency lies outside `[0, 1]`.
    EfficiencyOutOfRange {
        /// The barrier.
        barrier: BarrierId,
        /// The rejected value.
        value: f64,
    },
    /// A barrier has no passage efficiency and no default is configured.
    MissingEfficiency {
        /// The barrier.
        barrier: BarrierId,
    },
    /// A barrier position is NaN or infinite.
    InvalidPosition {
        /// The barrier.
        barrier: BarrierId,
        /// The rejected value.
        value: f64,
    },
    /// An origin's initial population is negative or not finite.
    NegativePopulation {
        /// The origin.
        origin: OriginId,
        /// The rejected value.
        value: f64,
    },
    /// An origin's entry reach is not in the network.
    UnknownOriginReach {
        /// The origin.
        origin: OriginId,
        /// The missing reach.
        reach: ReachId,
    },
    /// Two origin rows share an identifier.
    DuplicateOrigin {
        /// The repeated origin.
        origin: OriginId,
    },
    /// A main-stem list entry is not in the network.
    UnknownMainStemReach {
        /// The missing reach.
        reach: ReachId,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { table, column } => {
                write!(f, "{table} table is missing column '{column}'")
            }
            Self::InvalidValue {
                table,
                row,
                column,
                value,
            } => write!(
                f,
                "{table} table row {row}: invalid value '{value}' in column '{column}'"
            ),
            Self::EfficiencyOutOfRange { barrier, value } => write!(
                f,
                "barrier '{barrier}' passage_efficiency {value} is outside [0, 1]"
            ),
            Self::MissingEfficiency { barrier } => write!(
                f,
                "barrier '{barrier}' has no passage_efficiency and no default is configured"
            ),
            Self::InvalidPosition { barrier, value } => {
                write!(f, "barrier '{barrier}' position {value} is not finite")
            }
            Self::NegativePopulation { origin, value } => write!(
                f,
                "origin '{origin}' initial_population must be finite and non-negative, got {value}"
            ),
            Self::UnknownOriginReach { origin, reach } => {
                write!(f, "origin '{origin}' references unknown reach '{reach}'")
            }
            Self::DuplicateOrigin { origin } => {
                write!(f, "origin '{origin}' appears more than once")
            }
            Self::UnknownMainStemReach { reach } => {
                write!(f, "main-stem list references unknown reach '{reach}'")
            }
        }
    }
}

impl Error for DataError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let e = ValidationError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(e.to_string(), "downstream cycle: 'a' -> 'b' -> 'a'");
        let e = ValidationError::TooManyReaches { count: 5_000_000_000 };
        assert!(e.to_string().starts_with("reach table has 5000000000 reaches"));
    }

    #[test]
    fn multiple_downstream_to_outlet() {
        let e = ValidationError::MultipleDownstream {
            reach: "r".into(),
            first: Some("d".into()),
            second: None,
        };
        assert!(e.to_string().ends_with("'d' and an outlet"));
    }

    #[test]
    fn ambiguous_outlet_names_every_exit() {
        let e = ClassificationError::AmbiguousOutlet {
            watershed: "W".into(),
            exits: vec!["x".into(), "y".into()],
        };
        assert_eq!(e.to_string(), "watershed 'W' has 2 outlets: 'x' 'y'");
    }

    #[test]
    fn data_errors_carry_ids() {
        let e = DataError::UnknownOriginReach {
            origin: "O9".into(),
            reach: "R404".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("O9"));
        assert!(msg.contains("R404"));
    }

    #[test]
    fn configuration_error_display() {
        let e = ConfigurationError::InvalidThreshold { value: -1.0 };
        assert_eq!(
            e.to_string(),
            "threshold must be finite and non-negative, got -1"
        );
    }
}
