//! Column-role mappings.
//!
//! Each mapping names the column that plays a role in one table. The
//! `Default` impls use the standard column names.

use serde::{Deserialize, Serialize};

/// Column names for the reach table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachColumns {
    /// Reach identifier. Default: `reach_id`.
    pub reach_id: String,
    /// Downstream reach, blank at an outlet. Default: `downstream_id`.
    pub downstream_id: String,
    /// Optional watershed. Default: `watershed_id`.
    pub watershed_id: String,
    /// Attribute column used for proportional splits. When set, every
    /// non-blank cell in it must be numeric. Default: none.
    pub split_attribute: Option<String>,
}

impl Default for ReachColumns {
    fn default() -> Self {
        Self {
            reach_id: "reach_id".into(),
            downstream_id: "downstream_id".into(),
            watershed_id: "watershed_id".into(),
            split_attribute: None,
        }
    }
}

/// Column names for the barrier table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierColumns {
    /// Barrier identifier. Default: `barrier_id`.
    pub barrier_id: String,
    /// Host reach. Default: `reach_id`.
    pub reach_id: String,
    /// Position along the reach. Default: `position`.
    pub position: String,
    /// Optional passage efficiency. Default: `passage_efficiency`.
    pub passage_efficiency: String,
}

impl Default for BarrierColumns {
    fn default() -> Self {
        Self {
            barrier_id: "barrier_id".into(),
            reach_id: "reach_id".into(),
            position: "position".into(),
            passage_efficiency: "passage_efficiency".into(),
        }
    }
}

/// Column names for the origin table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginColumns {
    /// Origin identifier. Default: `origin_id`.
    pub origin_id: String,
    /// Entry reach. Default: `reach_id`.
    pub reach_id: String,
    /// Initial population. Default: `initial_population`.
    pub initial_population: String,
}

impl Default for OriginColumns {
    fn default() -> Self {
        Self {
            origin_id: "origin_id".into(),
            reach_id: "reach_id".into(),
            initial_population: "initial_population".into(),
        }
    }
}

/// Column names for the watershed membership table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatershedColumns {
    /// Watershed identifier. Default: `watershed_id`.
    pub watershed_id: String,
    /// Member reach. Default: `reach_id`.
    pub reach_id: String,
}

impl Default for WatershedColumns {
    fn default() -> Self {
        Self {
            watershed_id: "watershed_id".into(),
            reach_id: "reach_id".into(),
        }
    }
}
