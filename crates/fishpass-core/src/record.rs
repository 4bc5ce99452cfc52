//! Input table records.
//!
//! One struct per input table row. Records are plain data: validation
//! happens when they are assembled into a network, barrier index, or
//! origin list, never at construction.

use crate::id::{BarrierId, OriginId, ReachId, WatershedId};
use indexmap::IndexMap;

/// One row of the reach ("from-to") table.
#[derive(Clone, Debug, PartialEq)]
pub struct ReachRecord {
    /// Unique reach identifier.
    pub reach_id: ReachId,
    /// The reach immediately downstream, or `None` at a network outlet.
    pub downstream_id: Option<ReachId>,
    /// Watershed the reach belongs to, if the table carries one.
    pub watershed_id: Option<WatershedId>,
    /// Numeric attribute columns (drainage area, mean flow, ...).
    ///
    /// A column that was blank for this row is absent from the map.
    pub attributes: IndexMap<String, f64>,
}

impl ReachRecord {
    /// A reach with no watershed and no attributes.
    pub fn new(reach_id: impl Into<ReachId>, downstream_id: Option<&str>) -> Self {
        Self {
            reach_id: reach_id.into(),
            downstream_id: downstream_id.map(ReachId::from),
            watershed_id: None,
            attributes: IndexMap::new(),
        }
    }

    /// Set the watershed reference.
    pub fn with_watershed(mut self, watershed_id: impl Into<WatershedId>) -> Self {
        self.watershed_id = Some(watershed_id.into());
        self
    }

    /// Add a numeric attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Look up a numeric attribute by column name.
    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }
}

/// One row of the barrier table.
#[derive(Clone, Debug, PartialEq)]
pub struct BarrierRecord {
    /// Barrier identifier (used for diagnostics only).
    pub barrier_id: BarrierId,
    /// The reach hosting the barrier.
    pub reach_id: ReachId,
    /// Position along the reach, increasing downstream → upstream.
    pub position: f64,
    /// Fraction of the population passing the barrier, in `[0, 1]`.
    ///
    /// `None` defers to the run's default passage efficiency.
    pub passage_efficiency: Option<f64>,
}

impl BarrierRecord {
    /// A barrier with an explicit passage efficiency.
    pub fn new(
        barrier_id: impl Into<BarrierId>,
        reach_id: impl Into<ReachId>,
        position: f64,
        passage_efficiency: f64,
    ) -> Self {
        Self {
            barrier_id: barrier_id.into(),
            reach_id: reach_id.into(),
            position,
            passage_efficiency: Some(passage_efficiency),
        }
    }
}

/// One row of the origin table.
#[derive(Clone, Debug, PartialEq)]
pub struct OriginRecord {
    /// Origin identifier, unique within a run.
    pub origin_id: OriginId,
    /// Entry reach where the population starts moving upstream.
    pub reach_id: ReachId,
    /// Starting population, non-negative.
    pub initial_population: f64,
}

impl OriginRecord {
    /// Convenience constructor.
    pub fn new(
        origin_id: impl Into<OriginId>,
        reach_id: impl Into<ReachId>,
        initial_population: f64,
    ) -> Self {
        Self {
            origin_id: origin_id.into(),
            reach_id: reach_id.into(),
            initial_population,
        }
    }
}

/// One membership row of the watershed table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatershedMembership {
    /// The watershed.
    pub watershed_id: WatershedId,
    /// A reach lying inside it.
    pub reach_id: ReachId,
}

impl WatershedMembership {
    /// Convenience constructor.
    pub fn new(watershed_id: impl Into<WatershedId>, reach_id: impl Into<ReachId>) -> Self {
        Self {
            watershed_id: watershed_id.into(),
            reach_id: reach_id.into(),
        }
    }

    /// Derive membership rows from the reach table's `watershed_id` column.
    pub fn from_reaches(reaches: &[ReachRecord]) -> Vec<Self> {
        reaches
            .iter()
            .filter_map(|r| {
                r.watershed_id.as_ref().map(|w| Self {
                    watershed_id: w.clone(),
                    reach_id: r.reach_id.clone(),
                })
            })
            .collect()
    }
}
