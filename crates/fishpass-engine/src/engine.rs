//! The upstream walk.
//!
//! [`PropagationEngine::propagate`] walks from one origin against the
//! flow direction. At every reach it applies the reach's barriers in
//! order, records one [`PropagationResult`], and then either stops
//! (threshold or headwater) or splits the population across the
//! upstream branches and continues into each.
//!
//! The walk is depth-first with sibling order taken from
//! [`NetworkModel::upstream_of`]. It runs on an explicit stack, so deep
//! networks cannot exhaust the thread's call stack.

use fishpass_core::{ConfigurationError, PropagationResult, ReachIndex, StopReason};
use fishpass_network::NetworkModel;
use fishpass_passage::{attenuate, BarrierIndex, Persist, SplitPolicy};

use crate::config::SplitFallback;
use crate::origins::Origin;

/// Rows and counters from one origin's walk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Walk {
    /// Result rows in depth-first order.
    pub rows: Vec<PropagationResult>,
    /// Confluences where the split policy failed and persist was used.
    pub split_fallbacks: u64,
}

impl Walk {
    /// Rows with the given stop reason.
    pub fn count(&self, reason: StopReason) -> u64 {
        self.rows.iter().filter(|r| r.stop_reason == reason).count() as u64
    }
}

/// A reach waiting to be entered with the population arriving from
/// downstream.
struct Frame {
    reach: ReachIndex,
    population: f64,
}

/// Walks origins upstream over a shared, read-only network.
///
/// The engine borrows everything it reads and holds no mutable state, so
/// one engine can serve many threads.
///
/// # Preconditions
///
/// The network must be acyclic. [`NetworkModel::build`] guarantees this;
/// the walk does not re-check.
pub struct PropagationEngine<'a> {
    network: &'a NetworkModel,
    barriers: &'a BarrierIndex,
    split: &'a dyn SplitPolicy,
    threshold: f64,
    fallback: SplitFallback,
}

impl<'a> PropagationEngine<'a> {
    /// An engine over `network` and `barriers`.
    pub fn new(
        network: &'a NetworkModel,
        barriers: &'a BarrierIndex,
        split: &'a dyn SplitPolicy,
        threshold: f64,
        fallback: SplitFallback,
    ) -> Self {
        Self {
            network,
            barriers,
            split,
            threshold,
            fallback,
        }
    }

    /// The stop threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Walk upstream from `origin`.
    ///
    /// Rows are emitted in depth-first preorder: a reach's row comes
    /// before any row of its upstream branches, and branches are visited
    /// in [`NetworkModel::upstream_of`] order.
    ///
    /// # Errors
    ///
    /// The split policy's [`ConfigurationError`] when it fails at a
    /// confluence and the fallback is [`SplitFallback::Fail`].
    pub fn propagate(&self, origin: &Origin) -> Result<Walk, ConfigurationError> {
        tracing::debug!(
            origin = %origin.origin_id,
            reach = %self.network.reach_id(origin.reach),
            population = origin.initial_population,
            "walking upstream"
        );
        let mut walk = Walk::default();
        let mut stack = vec![Frame {
            reach: origin.reach,
            population: origin.initial_population,
        }];
        while let Some(Frame { reach, population }) = stack.pop() {
            if population <= self.threshold {
                self.emit(&mut walk, origin, reach, population, StopReason::Threshold);
                continue;
            }

            let reach_id = self.network.reach_id(reach);
            let passed = attenuate(
                self.barriers.barriers_on(reach_id.as_str()),
                population,
                self.threshold,
            );
            if passed.stopped {
                self.emit(&mut walk, origin, reach, passed.population, StopReason::Threshold);
                continue;
            }

            let upstream = self.network.upstream_of(reach);
            if upstream.is_empty() {
                self.emit(&mut walk, origin, reach, passed.population, StopReason::Headwater);
                continue;
            }
            self.emit(&mut walk, origin, reach, passed.population, StopReason::None);

            let split = self
                .split
                .split(passed.population, reach, upstream, self.network);
            let allocation = match split {
                Ok(allocation) => allocation,
                Err(e) if self.fallback == SplitFallback::Persist => {
                    tracing::warn!(
                        origin = %origin.origin_id,
                        reach = %reach_id,
                        error = %e,
                        "split failed, persisting population to every branch"
                    );
                    walk.split_fallbacks += 1;
                    Persist::allocate(passed.population, upstream)
                }
                Err(e) => return Err(e),
            };
            // Reverse so the first upstream branch is popped first.
            stack.extend(
                allocation
                    .iter()
                    .rev()
                    .map(|&(reach, population)| Frame { reach, population }),
            );
        }
        tracing::debug!(
            origin = %origin.origin_id,
            rows = walk.rows.len(),
            "walk finished"
        );
        Ok(walk)
    }

    fn emit(
        &self,
        walk: &mut Walk,
        origin: &Origin,
        reach: ReachIndex,
        population: f64,
        stop_reason: StopReason,
    ) {
        tracing::trace!(
            reach = %self.network.reach_id(reach),
            population,
            stop = %stop_reason,
            "reach visited"
        );
        walk.rows.push(PropagationResult {
            origin_id: origin.origin_id.clone(),
            reach_id: self.network.reach_id(reach).clone(),
            population,
            stop_reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishpass_core::{BarrierRecord, ReachRecord};
    use fishpass_passage::{Even, Proportional};
    use fishpass_test_utils::{linear_chain, single_confluence, two_barriers, DRAINAGE_AREA};
    use proptest::prelude::*;

    fn origin_at(net: &NetworkModel, reach: &str, population: f64) -> Origin {
        Origin {
            origin_id: "O".into(),
            reach: net.index_of(reach).unwrap(),
            initial_population: population,
        }
    }

    fn rows(walk: &Walk) -> Vec<(&str, f64, StopReason)> {
        walk.rows
            .iter()
            .map(|r| (r.reach_id.as_str(), r.population, r.stop_reason))
            .collect()
    }

    fn run(
        net: &NetworkModel,
        barriers: &BarrierIndex,
        split: &dyn SplitPolicy,
        threshold: f64,
        reach: &str,
        population: f64,
    ) -> Walk {
        PropagationEngine::new(net, barriers, split, threshold, SplitFallback::Persist)
            .propagate(&origin_at(net, reach, population))
            .unwrap()
    }

    // ── Linear ─────────────────────────────────────────────────

    #[test]
    fn headwater_origin_stops_immediately() {
        let net = NetworkModel::build(&linear_chain(3)).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &Persist, 1.0, "R1", 100.0);
        assert_eq!(rows(&w), [("R1", 100.0, StopReason::Headwater)]);
    }

    #[test]
    fn outlet_origin_walks_to_headwater() {
        let net = NetworkModel::build(&linear_chain(3)).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &Persist, 1.0, "R3", 100.0);
        assert_eq!(
            rows(&w),
            [
                ("R3", 100.0, StopReason::None),
                ("R2", 100.0, StopReason::None),
                ("R1", 100.0, StopReason::Headwater),
            ]
        );
    }

    #[test]
    fn origin_at_threshold_stops() {
        let net = NetworkModel::build(&linear_chain(3)).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &Persist, 5.0, "R3", 5.0);
        assert_eq!(rows(&w), [("R3", 5.0, StopReason::Threshold)]);
    }

    #[test]
    fn barrier_on_middle_reach_stops_walk() {
        let net = NetworkModel::build(&linear_chain(3)).unwrap();
        let barriers =
            BarrierIndex::build(&[BarrierRecord::new("B", "R2", 0.0, 0.1)], None).unwrap();
        let w = run(&net, &barriers, &Persist, 20.0, "R3", 100.0);
        assert_eq!(
            rows(&w),
            [
                ("R3", 100.0, StopReason::None),
                ("R2", 10.0, StopReason::Threshold),
            ]
        );
    }

    // ── Barriers ───────────────────────────────────────────────

    #[test]
    fn two_barriers_above_threshold() {
        let net = NetworkModel::build(&[ReachRecord::new("R1", None)]).unwrap();
        let barriers = BarrierIndex::build(&two_barriers("R1"), None).unwrap();
        let w = run(&net, &barriers, &Persist, 20.0, "R1", 100.0);
        assert_eq!(rows(&w), [("R1", 25.0, StopReason::Headwater)]);
    }

    #[test]
    fn second_barrier_crosses_threshold() {
        let net = NetworkModel::build(&linear_chain(2)).unwrap();
        let barriers = BarrierIndex::build(&two_barriers("R2"), None).unwrap();
        let w = run(&net, &barriers, &Persist, 30.0, "R2", 100.0);
        assert_eq!(rows(&w), [("R2", 25.0, StopReason::Threshold)]);
    }

    // ── Confluences ────────────────────────────────────────────

    #[test]
    fn persist_copies_population_into_branches() {
        let net = NetworkModel::build(&single_confluence()).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &Persist, 1.0, "R1", 100.0);
        assert_eq!(
            rows(&w),
            [
                ("R1", 100.0, StopReason::None),
                ("R2", 100.0, StopReason::Headwater),
                ("R3", 100.0, StopReason::Headwater),
            ]
        );
    }

    #[test]
    fn proportional_split_by_area() {
        let net = NetworkModel::build(&single_confluence()).unwrap();
        let policy = Proportional::new(DRAINAGE_AREA, &net).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &policy, 1.0, "R1", 100.0);
        assert_eq!(
            rows(&w),
            [
                ("R1", 100.0, StopReason::None),
                ("R2", 30.0, StopReason::Headwater),
                ("R3", 70.0, StopReason::Headwater),
            ]
        );
    }

    #[test]
    fn small_branch_share_gets_threshold_row() {
        let net = NetworkModel::build(&single_confluence()).unwrap();
        let policy = Proportional::new(DRAINAGE_AREA, &net).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &policy, 40.0, "R1", 100.0);
        assert_eq!(
            rows(&w),
            [
                ("R1", 100.0, StopReason::None),
                ("R2", 30.0, StopReason::Threshold),
                ("R3", 70.0, StopReason::Headwater),
            ]
        );
    }

    #[test]
    fn truncated_branch_skips_its_barriers() {
        let net = NetworkModel::build(&single_confluence()).unwrap();
        let barriers =
            BarrierIndex::build(&[BarrierRecord::new("B", "R2", 0.0, 0.5)], None).unwrap();
        let w = run(&net, &barriers, &Even, 50.0, "R1", 100.0);
        assert_eq!(w.rows[1].population, 50.0);
        assert_eq!(w.rows[1].stop_reason, StopReason::Threshold);
    }

    #[test]
    fn depth_first_preorder_across_nested_confluences() {
        // a <- b <- {c <- {e, f}, d}
        let net = NetworkModel::build(&[
            ReachRecord::new("a", None),
            ReachRecord::new("b", Some("a")),
            ReachRecord::new("c", Some("b")),
            ReachRecord::new("d", Some("b")),
            ReachRecord::new("e", Some("c")),
            ReachRecord::new("f", Some("c")),
        ])
        .unwrap();
        let w = run(&net, &BarrierIndex::empty(), &Persist, 1.0, "a", 10.0);
        let order: Vec<_> = w.rows.iter().map(|r| r.reach_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c", "e", "f", "d"]);
    }

    // ── Split failures ─────────────────────────────────────────

    fn unsplittable() -> NetworkModel {
        NetworkModel::build(&[
            ReachRecord::new("R1", None),
            ReachRecord::new("R2", Some("R1")).with_attribute(DRAINAGE_AREA, 1.0),
            ReachRecord::new("R3", Some("R1")),
        ])
        .unwrap()
    }

    #[test]
    fn failed_split_falls_back_to_persist() {
        let net = unsplittable();
        let policy = Proportional::new(DRAINAGE_AREA, &net).unwrap();
        let w = run(&net, &BarrierIndex::empty(), &policy, 1.0, "R1", 100.0);
        assert_eq!(w.split_fallbacks, 1);
        assert!(w.rows[1..].iter().all(|r| r.population == 100.0));
    }

    #[test]
    fn failed_split_can_fail_the_origin() {
        let net = unsplittable();
        let policy = Proportional::new(DRAINAGE_AREA, &net).unwrap();
        let barriers = BarrierIndex::empty();
        let engine = PropagationEngine::new(
            &net,
            &barriers,
            &policy,
            1.0,
            SplitFallback::Fail,
        );
        let err = engine
            .propagate(&origin_at(&net, "R1", 100.0))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingAttribute { .. }));
    }

    // ── Properties ─────────────────────────────────────────────

    /// A random tree: reach `i > 0` drains into some reach `< i`.
    fn arb_tree() -> impl Strategy<Value = Vec<ReachRecord>> {
        prop::collection::vec(any::<prop::sample::Index>(), 1..40).prop_map(|picks| {
            let mut records = vec![ReachRecord::new("r0", None)];
            for (i, pick) in picks.iter().enumerate() {
                let down = format!("r{}", pick.index(i + 1));
                records.push(ReachRecord::new(
                    format!("r{}", i + 1).as_str(),
                    Some(down.as_str()),
                ));
            }
            records
        })
    }

    proptest! {
        #[test]
        fn persist_without_barriers_visits_every_reach(records in arb_tree()) {
            let net = NetworkModel::build(&records).unwrap();
            let w = run(&net, &BarrierIndex::empty(), &Persist, 1.0, "r0", 100.0);
            prop_assert_eq!(w.rows.len(), net.len());
            prop_assert_eq!(w.count(StopReason::Headwater), net.headwaters().count() as u64);
            for row in &w.rows {
                prop_assert_eq!(row.population, 100.0);
            }
        }

        #[test]
        fn nothing_continues_below_threshold(
            records in arb_tree(),
            threshold in 0.0..60.0f64,
        ) {
            let net = NetworkModel::build(&records).unwrap();
            let w = run(&net, &BarrierIndex::empty(), &Even, threshold, "r0", 100.0);
            for row in &w.rows {
                if row.population <= threshold {
                    prop_assert_eq!(row.stop_reason, StopReason::Threshold);
                } else {
                    prop_assert_ne!(row.stop_reason, StopReason::Threshold);
                }
            }
            // Every row's reach is visited at most once per origin.
            let mut ids: Vec<_> = w.rows.iter().map(|r| r.reach_id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), w.rows.len());
        }
    }
}
