//! The directed reach graph.

use fishpass_core::{ReachId, ReachIndex, ReachRecord, ValidationError, WatershedId};
use indexmap::map::Entry;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Upstream neighbour list. Most reaches have at most a handful of
/// tributaries, so four inline slots avoid heap allocation.
pub type Upstream = SmallVec<[ReachIndex; 4]>;

/// An immutable, validated stream network.
///
/// Built once from the reach table by [`NetworkModel::build`]. Each reach
/// has zero or one downstream reach; the upstream adjacency is derived
/// as the inverse of the downstream links.
///
/// # Ordering
///
/// Reach indices follow reach table order, and [`upstream_of`] lists
/// upstream reaches in reach table order. Everything downstream of this
/// type (confluence splitting, result rows) inherits that order, which
/// is what makes a run deterministic.
///
/// # Acyclicity
///
/// `build` rejects any downstream cycle. The propagation engine does
/// not re-check at traversal time: a `NetworkModel` is always a forest
/// of in-trees rooted at the outlets.
///
/// [`upstream_of`]: NetworkModel::upstream_of
///
/// # Examples
///
/// ```
/// use fishpass_core::ReachRecord;
/// use fishpass_network::NetworkModel;
///
/// let net = NetworkModel::build(&[
///     ReachRecord::new("outlet", None),
///     ReachRecord::new("left", Some("outlet")),
///     ReachRecord::new("right", Some("outlet")),
/// ])
/// .unwrap();
///
/// let outlet = net.index_of("outlet").unwrap();
/// assert!(net.is_confluence(outlet));
/// assert_eq!(net.upstream_of(outlet).len(), 2);
/// assert!(net.is_headwater(net.index_of("left").unwrap()));
/// ```
#[derive(Clone, Debug)]
pub struct NetworkModel {
    reaches: IndexMap<ReachId, ReachRecord>,
    downstream: Vec<Option<ReachIndex>>,
    upstream: Vec<Upstream>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl NetworkModel {
    /// Validate the reach table and build the graph.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyNetwork`] if `records` is empty.
    /// - [`ValidationError::DuplicateReach`] if a reach row is repeated.
    /// - [`ValidationError::MultipleDownstream`] if rows for one reach
    ///   disagree on its downstream reach.
    /// - [`ValidationError::DanglingDownstream`] if a downstream
    ///   reference is not a reach in the table.
    /// - [`ValidationError::Cycle`] if downstream links loop.
    /// - [`ValidationError::TooManyReaches`] past `u32::MAX` distinct
    ///   reaches.
    pub fn build(records: &[ReachRecord]) -> Result<Self, ValidationError> {
        if records.is_empty() {
            return Err(ValidationError::EmptyNetwork);
        }

        let mut reaches: IndexMap<ReachId, ReachRecord> = IndexMap::with_capacity(records.len());
        for record in records {
            match reaches.entry(record.reach_id.clone()) {
                Entry::Occupied(existing) => {
                    let first = &existing.get().downstream_id;
                    if *first == record.downstream_id {
                        return Err(ValidationError::DuplicateReach {
                            reach: record.reach_id.clone(),
                        });
                    }
                    return Err(ValidationError::MultipleDownstream {
                        reach: record.reach_id.clone(),
                        first: first.clone(),
                        second: record.downstream_id.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                }
            }
        }

        check_capacity(reaches.len())?;

        let mut downstream = Vec::with_capacity(reaches.len());
        for record in reaches.values() {
            let link = match &record.downstream_id {
                None => None,
                Some(d) => match reaches.get_index_of(d) {
                    Some(i) => Some(index_at(i)),
                    None => {
                        return Err(ValidationError::DanglingDownstream {
                            reach: record.reach_id.clone(),
                            downstream: d.clone(),
                        })
                    }
                },
            };
            downstream.push(link);
        }

        let mut upstream = vec![Upstream::new(); reaches.len()];
        for (i, link) in downstream.iter().enumerate() {
            if let Some(d) = link {
                upstream[d.get()].push(index_at(i));
            }
        }

        let net = Self {
            reaches,
            downstream,
            upstream,
        };
        net.check_acyclic()?;

        tracing::debug!(
            reaches = net.len(),
            outlets = net.outlets().count(),
            headwaters = net.headwaters().count(),
            "network built"
        );
        Ok(net)
    }

    /// Depth-first walk along downstream links with an on-stack mark.
    ///
    /// Each reach has at most one downstream link, so the walk from any
    /// start is a simple chain; meeting a reach that is still on the
    /// current chain's stack means the chain loops.
    fn check_acyclic(&self) -> Result<(), ValidationError> {
        let mut marks = vec![Mark::Unvisited; self.len()];
        let mut stack: Vec<ReachIndex> = Vec::new();

        for start in self.indices() {
            if marks[start.get()] != Mark::Unvisited {
                continue;
            }
            let mut cursor = Some(start);
            while let Some(r) = cursor {
                match marks[r.get()] {
                    Mark::Done => break,
                    Mark::OnStack => {
                        let from = stack.iter().position(|&s| s == r).unwrap_or(0);
                        let mut path: Vec<ReachId> =
                            stack[from..].iter().map(|&s| self.reach_id(s).clone()).collect();
                        path.push(self.reach_id(r).clone());
                        return Err(ValidationError::Cycle { path });
                    }
                    Mark::Unvisited => {
                        marks[r.get()] = Mark::OnStack;
                        stack.push(r);
                        cursor = self.downstream[r.get()];
                    }
                }
            }
            for s in stack.drain(..) {
                marks[s.get()] = Mark::Done;
            }
        }
        Ok(())
    }

    /// Rebuild the network over the reaches accepted by `keep`.
    ///
    /// Reaches whose downstream reach is dropped become outlets. Use this
    /// to confine traversal to suitable habitat: upstream movement stops
    /// at the first removed reach because it no longer exists.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyNetwork`] if `keep` rejects every reach.
    pub fn restrict_to(
        &self,
        mut keep: impl FnMut(&ReachRecord) -> bool,
    ) -> Result<Self, ValidationError> {
        let kept: Vec<bool> = self.reaches.values().map(&mut keep).collect();
        let records: Vec<ReachRecord> = self
            .reaches
            .values()
            .zip(&self.downstream)
            .zip(&kept)
            .filter(|&(_, &k)| k)
            .map(|((record, link), _)| {
                let mut r = record.clone();
                if link.is_some_and(|d| !kept[d.get()]) {
                    r.downstream_id = None;
                }
                r
            })
            .collect();
        Self::build(&records)
    }

    // ── Lookups ────────────────────────────────────────────────────

    /// Number of reaches.
    pub fn len(&self) -> usize {
        self.reaches.len()
    }

    /// Always returns `false`: construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All reach indices in table order.
    pub fn indices(&self) -> impl Iterator<Item = ReachIndex> + '_ {
        (0..self.len()).map(index_at)
    }

    /// Resolve a reach identifier.
    pub fn index_of(&self, reach: &str) -> Option<ReachIndex> {
        self.reaches.get_index_of(reach).map(index_at)
    }

    /// The identifier of a reach.
    ///
    /// # Panics
    ///
    /// If `reach` was not issued by this network.
    pub fn reach_id(&self, reach: ReachIndex) -> &ReachId {
        &self.record(reach).reach_id
    }

    /// The original table row of a reach.
    ///
    /// # Panics
    ///
    /// If `reach` was not issued by this network.
    pub fn record(&self, reach: ReachIndex) -> &ReachRecord {
        &self.reaches[reach.get()]
    }

    /// Every reach row, in table order.
    pub fn records(&self) -> impl Iterator<Item = &ReachRecord> + '_ {
        self.reaches.values()
    }

    /// Watershed reference from the reach table, if any.
    pub fn watershed_of(&self, reach: ReachIndex) -> Option<&WatershedId> {
        self.record(reach).watershed_id.as_ref()
    }

    /// Numeric attribute of a reach, if present.
    pub fn attribute(&self, reach: ReachIndex, name: &str) -> Option<f64> {
        self.record(reach).attribute(name)
    }

    /// Whether any reach carries the named attribute column.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.reaches.values().any(|r| r.attributes.contains_key(name))
    }

    // ── Structural queries ─────────────────────────────────────────

    /// `true` iff no reach flows into `reach`.
    pub fn is_headwater(&self, reach: ReachIndex) -> bool {
        self.upstream[reach.get()].is_empty()
    }

    /// `true` iff more than one reach flows into `reach`.
    pub fn is_confluence(&self, reach: ReachIndex) -> bool {
        self.upstream[reach.get()].len() > 1
    }

    /// `true` iff `reach` has no downstream reach.
    pub fn is_outlet(&self, reach: ReachIndex) -> bool {
        self.downstream[reach.get()].is_none()
    }

    /// Direct upstream reaches, in reach table order.
    pub fn upstream_of(&self, reach: ReachIndex) -> &[ReachIndex] {
        &self.upstream[reach.get()]
    }

    /// The reach `reach` flows into, or `None` at an outlet.
    pub fn downstream_of(&self, reach: ReachIndex) -> Option<ReachIndex> {
        self.downstream[reach.get()]
    }

    /// Network outlets, in table order.
    pub fn outlets(&self) -> impl Iterator<Item = ReachIndex> + '_ {
        self.indices().filter(|&r| self.is_outlet(r))
    }

    /// Headwater reaches, in table order.
    pub fn headwaters(&self) -> impl Iterator<Item = ReachIndex> + '_ {
        self.indices().filter(|&r| self.is_headwater(r))
    }

    /// Confluence reaches, in table order.
    pub fn confluences(&self) -> impl Iterator<Item = ReachIndex> + '_ {
        self.indices().filter(|&r| self.is_confluence(r))
    }
}

fn check_capacity(count: usize) -> Result<(), ValidationError> {
    match u32::try_from(count) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::TooManyReaches { count }),
    }
}

/// Table position to index. `build` bounds every position with
/// [`check_capacity`] first.
fn index_at(position: usize) -> ReachIndex {
    ReachIndex(u32::try_from(position).unwrap_or(u32::MAX))
}
