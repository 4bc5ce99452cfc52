//! Barrier inventory indexed by reach.

use fishpass_core::{BarrierId, BarrierRecord, DataError, ReachId};
use fishpass_network::NetworkModel;
use indexmap::IndexMap;

/// A validated barrier.
#[derive(Clone, Debug, PartialEq)]
pub struct Barrier {
    /// Barrier identifier.
    pub barrier_id: BarrierId,
    /// Position along the host reach, increasing downstream → upstream.
    pub position: f64,
    /// Fraction of the population that passes, in `[0, 1]`.
    pub passage_efficiency: f64,
}

/// Barriers grouped by reach, each group in traversal order.
///
/// Walking upstream a fish meets the barrier with the smallest position
/// first, so every group is sorted by ascending position. Barriers with
/// equal positions keep their table order.
///
/// # Examples
///
/// ```
/// use fishpass_core::BarrierRecord;
/// use fishpass_passage::BarrierIndex;
///
/// let index = BarrierIndex::build(
///     &[
///         BarrierRecord::new("upper", "R1", 9.0, 0.8),
///         BarrierRecord::new("lower", "R1", 2.0, 0.5),
///     ],
///     None,
/// )
/// .unwrap();
///
/// let ids: Vec<_> = index.barriers_on("R1").iter().map(|b| b.barrier_id.as_str()).collect();
/// assert_eq!(ids, ["lower", "upper"]);
/// assert!(index.barriers_on("R2").is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct BarrierIndex {
    by_reach: IndexMap<ReachId, Vec<Barrier>>,
}

impl BarrierIndex {
    /// An index with no barriers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group, validate, and sort a barrier table.
    ///
    /// Rows with a blank efficiency take `default_efficiency`.
    ///
    /// # Errors
    ///
    /// - [`DataError::InvalidPosition`] for a NaN or infinite position.
    /// - [`DataError::MissingEfficiency`] for a blank efficiency with no
    ///   default.
    /// - [`DataError::EfficiencyOutOfRange`] for an efficiency outside
    ///   `[0, 1]` (including NaN).
    pub fn build(
        records: &[BarrierRecord],
        default_efficiency: Option<f64>,
    ) -> Result<Self, DataError> {
        let mut by_reach: IndexMap<ReachId, Vec<Barrier>> = IndexMap::new();
        for record in records {
            if !record.position.is_finite() {
                return Err(DataError::InvalidPosition {
                    barrier: record.barrier_id.clone(),
                    value: record.position,
                });
            }
            let efficiency = record
                .passage_efficiency
                .or(default_efficiency)
                .ok_or_else(|| DataError::MissingEfficiency {
                    barrier: record.barrier_id.clone(),
                })?;
            if !(0.0..=1.0).contains(&efficiency) {
                return Err(DataError::EfficiencyOutOfRange {
                    barrier: record.barrier_id.clone(),
                    value: efficiency,
                });
            }
            by_reach
                .entry(record.reach_id.clone())
                .or_default()
                .push(Barrier {
                    barrier_id: record.barrier_id.clone(),
                    position: record.position,
                    passage_efficiency: efficiency,
                });
        }
        for group in by_reach.values_mut() {
            group.sort_by(|a, b| a.position.total_cmp(&b.position));
        }
        tracing::debug!(
            barriers = records.len(),
            reaches = by_reach.len(),
            "barrier index built"
        );
        Ok(Self { by_reach })
    }

    /// Barriers on `reach` in the order met walking upstream. Empty if
    /// the reach has none.
    pub fn barriers_on(&self, reach: &str) -> &[Barrier] {
        self.by_reach.get(reach).map_or(&[], Vec::as_slice)
    }

    /// Total number of barriers.
    pub fn len(&self) -> usize {
        self.by_reach.values().map(Vec::len).sum()
    }

    /// Whether the index holds no barriers.
    pub fn is_empty(&self) -> bool {
        self.by_reach.is_empty()
    }

    /// Number of reaches hosting at least one barrier.
    pub fn reach_count(&self) -> usize {
        self.by_reach.len()
    }

    /// Reaches named by barriers but absent from `network`.
    ///
    /// Such barriers can never be reached by a traversal.
    pub fn unmatched<'a>(
        &'a self,
        network: &'a NetworkModel,
    ) -> impl Iterator<Item = &'a ReachId> + 'a {
        self.by_reach
            .keys()
            .filter(move |reach| network.index_of(reach.as_str()).is_none())
    }
}

/// Outcome of walking a population through one reach's barriers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    /// Population after the last barrier applied.
    pub population: f64,
    /// Number of barriers applied.
    pub applied: usize,
    /// Whether the population fell to or below the threshold.
    pub stopped: bool,
}

/// Apply `barriers` in order, stopping at the first one that leaves the
/// population at or below `threshold`.
///
/// Barriers after the stopping one are not applied.
pub fn attenuate(barriers: &[Barrier], population: f64, threshold: f64) -> Attenuation {
    let mut population = population;
    for (i, barrier) in barriers.iter().enumerate() {
        population *= barrier.passage_efficiency;
        if population <= threshold {
            tracing::trace!(
                barrier = %barrier.barrier_id,
                population,
                "threshold reached at barrier"
            );
            return Attenuation {
                population,
                applied: i + 1,
                stopped: true,
            };
        }
    }
    Attenuation {
        population,
        applied: barriers.len(),
        stopped: false,
    }
}
