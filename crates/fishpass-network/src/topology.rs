//! Watershed topology auto-detection.
//!
//! Given a network and a watershed membership table, [`classify`] labels
//! each watershed:
//!
//! - **Pass-through**: at least one reach outside the watershed flows
//!   into a member. The main stem is every member on the downstream
//!   path from such an entry point to the watershed's single outlet.
//!   All other members are tributary.
//! - **Terminal**: nothing flows in from outside. Fish reach it only
//!   from below; it has no main stem and every member is tributary.
//!
//! [`find_origins`] then turns a main-stem list (auto-detected or
//! user-supplied) into origin reaches: the non-main-stem reaches that
//! flow directly into a main stem, where fish leave the main stem and
//! start upstream into a tributary.

use crate::network::NetworkModel;
use fishpass_core::{ClassificationError, ReachId, ReachIndex, WatershedId, WatershedMembership};
use indexmap::{IndexMap, IndexSet};

/// Terminal / pass-through label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatershedKind {
    /// No inflow from outside the watershed.
    Terminal,
    /// Flow enters from outside and leaves through the outlet.
    PassThrough,
}

/// Classification of one watershed.
#[derive(Clone, Debug, PartialEq)]
pub struct WatershedClass {
    /// The watershed.
    pub watershed_id: WatershedId,
    /// Terminal or pass-through.
    pub kind: WatershedKind,
    /// Member reaches, in network table order.
    pub members: Vec<ReachIndex>,
    /// The single member whose outflow leaves the watershed.
    pub outlet: ReachIndex,
    /// Members where outside flow enters. Empty for terminal watersheds.
    pub entries: Vec<ReachIndex>,
    /// Main-stem members, upstream to downstream per entry path.
    /// Empty for terminal watersheds.
    pub main_stem: Vec<ReachIndex>,
}

impl WatershedClass {
    /// Whether the watershed is terminal.
    pub fn is_terminal(&self) -> bool {
        self.kind == WatershedKind::Terminal
    }

    /// Members that are not on the main stem.
    pub fn tributaries(&self) -> impl Iterator<Item = ReachIndex> + '_ {
        self.members
            .iter()
            .copied()
            .filter(|r| !self.main_stem.contains(r))
    }
}

/// Result of [`classify`]: one [`WatershedClass`] per watershed, in
/// first-appearance order of the membership table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    watersheds: IndexMap<WatershedId, WatershedClass>,
}

impl Classification {
    /// Number of classified watersheds.
    pub fn len(&self) -> usize {
        self.watersheds.len()
    }

    /// Whether no watershed was classified.
    pub fn is_empty(&self) -> bool {
        self.watersheds.is_empty()
    }

    /// Look up one watershed.
    pub fn get(&self, watershed: &str) -> Option<&WatershedClass> {
        self.watersheds.get(watershed)
    }

    /// All watersheds in order.
    pub fn iter(&self) -> impl Iterator<Item = &WatershedClass> + '_ {
        self.watersheds.values()
    }

    /// Union of every pass-through watershed's main stem, first-seen order.
    pub fn main_stems(&self) -> Vec<ReachIndex> {
        let mut seen = Vec::new();
        for class in self.watersheds.values() {
            for &r in &class.main_stem {
                if !seen.contains(&r) {
                    seen.push(r);
                }
            }
        }
        seen
    }
}

/// Classify every watershed named in `memberships`.
///
/// Reaches not listed in any watershed count as "outside" for every
/// watershed.
///
/// # Errors
///
/// - [`ClassificationError::UnknownReach`] if a row names a reach not in
///   the network.
/// - [`ClassificationError::OverlappingWatersheds`] if a reach is listed
///   under two watersheds.
/// - [`ClassificationError::AmbiguousOutlet`] if more than one member's
///   outflow leaves the watershed (including members that are network
///   outlets).
/// - [`ClassificationError::NoOutlet`] if no member's outflow leaves it.
pub fn classify(
    network: &NetworkModel,
    memberships: &[WatershedMembership],
) -> Result<Classification, ClassificationError> {
    let mut slot_of: Vec<Option<usize>> = vec![None; network.len()];
    let mut groups: IndexMap<WatershedId, Vec<ReachIndex>> = IndexMap::new();

    for row in memberships {
        let reach =
            network
                .index_of(row.reach_id.as_str())
                .ok_or_else(|| ClassificationError::UnknownReach {
                    watershed: row.watershed_id.clone(),
                    reach: row.reach_id.clone(),
                })?;
        let slot = groups.entry(row.watershed_id.clone()).index();
        match slot_of[reach.get()] {
            Some(existing) if existing == slot => continue,
            Some(existing) => {
                if let Some((first, _)) = groups.get_index(existing) {
                    return Err(ClassificationError::OverlappingWatersheds {
                        reach: row.reach_id.clone(),
                        first: first.clone(),
                        second: row.watershed_id.clone(),
                    });
                }
            }
            None => {
                slot_of[reach.get()] = Some(slot);
                groups
                    .entry(row.watershed_id.clone())
                    .or_default()
                    .push(reach);
            }
        }
    }

    let mut watersheds = IndexMap::with_capacity(groups.len());
    for (slot, (watershed_id, mut members)) in groups.into_iter().enumerate() {
        members.sort();
        let inside = |r: ReachIndex| slot_of[r.get()] == Some(slot);

        let exits: Vec<ReachIndex> = members
            .iter()
            .copied()
            .filter(|&m| network.downstream_of(m).is_none_or(|d| !inside(d)))
            .collect();
        let outlet = match exits.as_slice() {
            [] => return Err(ClassificationError::NoOutlet { watershed: watershed_id }),
            [only] => *only,
            many => {
                return Err(ClassificationError::AmbiguousOutlet {
                    watershed: watershed_id,
                    exits: many.iter().map(|&r| network.reach_id(r).clone()).collect(),
                })
            }
        };

        let entries: Vec<ReachIndex> = members
            .iter()
            .copied()
            .filter(|&m| network.upstream_of(m).iter().any(|&u| !inside(u)))
            .collect();

        let mut main_stem: Vec<ReachIndex> = Vec::new();
        for &entry in &entries {
            let mut cursor = Some(entry);
            while let Some(r) = cursor.filter(|&r| inside(r)) {
                if main_stem.contains(&r) {
                    break;
                }
                main_stem.push(r);
                cursor = network.downstream_of(r);
            }
        }

        let kind = if entries.is_empty() {
            WatershedKind::Terminal
        } else {
            WatershedKind::PassThrough
        };
        tracing::debug!(
            watershed = %watershed_id,
            kind = ?kind,
            members = members.len(),
            main_stem = main_stem.len(),
            "watershed classified"
        );

        watersheds.insert(
            watershed_id.clone(),
            WatershedClass {
                watershed_id,
                kind,
                members,
                outlet,
                entries,
                main_stem,
            },
        );
    }

    Ok(Classification { watersheds })
}

/// Origin reaches for a main-stem list.
///
/// Returns every reach that is not itself on the main stem and whose
/// downstream reach is, in network table order. The result never
/// contains a main-stem reach.
pub fn find_origins(network: &NetworkModel, main_stems: &[ReachIndex]) -> Vec<ReachIndex> {
    let mut on_stem = vec![false; network.len()];
    for &r in main_stems {
        on_stem[r.get()] = true;
    }
    network
        .indices()
        .filter(|&r| {
            !on_stem[r.get()] && network.downstream_of(r).is_some_and(|d| on_stem[d.get()])
        })
        .collect()
}

/// Origins for an auto-detected run.
///
/// The [`find_origins`] set for the classification's main stems, followed
/// by every headwater member of every terminal watershed. Terminal
/// watersheds have no main stem, so their headwaters are origins in their
/// own right. Each reach appears once, at its first position.
pub fn auto_origins(network: &NetworkModel, classification: &Classification) -> Vec<ReachIndex> {
    let mut origins: IndexSet<ReachIndex> =
        find_origins(network, &classification.main_stems()).into_iter().collect();
    for class in classification.iter().filter(|c| c.is_terminal()) {
        origins.extend(
            class
                .members
                .iter()
                .copied()
                .filter(|&m| network.is_headwater(m)),
        );
    }
    origins.into_iter().collect()
}

/// Resolve a user-supplied main-stem list of reach identifiers.
///
/// Returns the first identifier that is not in the network as the error.
pub fn resolve_main_stems(
    network: &NetworkModel,
    reaches: &[ReachId],
) -> Result<Vec<ReachIndex>, ReachId> {
    reaches
        .iter()
        .map(|id| network.index_of(id.as_str()).ok_or_else(|| id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishpass_core::ReachRecord;

    fn build(rows: &[(&str, Option<&str>, &str)]) -> (NetworkModel, Vec<WatershedMembership>) {
        let records: Vec<ReachRecord> = rows
            .iter()
            .map(|&(id, down, ws)| ReachRecord::new(id, down).with_watershed(ws))
            .collect();
        let net = NetworkModel::build(&records).unwrap();
        (net, WatershedMembership::from_reaches(&records))
    }

    fn names(net: &NetworkModel, list: &[ReachIndex]) -> Vec<String> {
        list.iter().map(|&r| net.reach_id(r).to_string()).collect()
    }

    /// Two watersheds stacked along one river:
    ///
    /// ```text
    ///   UP:   u2 -> u1 ----------.
    ///                            v
    ///   LOW:  t1 -> m2 <- ... m3 -> m1 (outlet)
    /// ```
    fn stacked() -> (NetworkModel, Vec<WatershedMembership>) {
        build(&[
            ("m1", None, "LOW"),
            ("m2", Some("m1"), "LOW"),
            ("m3", Some("m2"), "LOW"),
            ("t1", Some("m2"), "LOW"),
            ("u1", Some("m3"), "UP"),
            ("u2", Some("u1"), "UP"),
        ])
    }

    #[test]
    fn stacked_watersheds_classify() {
        let (net, rows) = stacked();
        let c = classify(&net, &rows).unwrap();
        assert_eq!(c.len(), 2);

        let low = c.get("LOW").unwrap();
        assert_eq!(low.kind, WatershedKind::PassThrough);
        assert_eq!(names(&net, &low.entries), vec!["m3"]);
        assert_eq!(names(&net, &low.main_stem), vec!["m3", "m2", "m1"]);
        assert_eq!(names(&net, &[low.outlet]), vec!["m1"]);
        assert_eq!(
            names(&net, &low.tributaries().collect::<Vec<_>>()),
            vec!["t1"]
        );

        let up = c.get("UP").unwrap();
        assert!(up.is_terminal());
        assert!(up.main_stem.is_empty());
        assert_eq!(names(&net, &[up.outlet]), vec!["u1"]);
    }

    #[test]
    fn origins_branch_off_main_stem() {
        let (net, rows) = stacked();
        let c = classify(&net, &rows).unwrap();
        let origins = find_origins(&net, &c.main_stems());
        assert_eq!(names(&net, &origins), vec!["t1", "u1"]);
        assert_eq!(names(&net, &auto_origins(&net, &c)), vec!["t1", "u1", "u2"]);
    }

    #[test]
    fn terminal_headwater_on_main_stem_listed_once() {
        let (net, rows) = build(&[
            ("m1", None, "LOW"),
            ("m2", Some("m1"), "LOW"),
            ("u1", Some("m2"), "UP"),
        ]);
        let c = classify(&net, &rows).unwrap();
        assert!(c.get("UP").unwrap().is_terminal());
        assert_eq!(names(&net, &auto_origins(&net, &c)), vec!["u1"]);
    }

    #[test]
    fn single_terminal_watershed_uses_headwaters() {
        let (net, rows) = build(&[
            ("o", None, "W"),
            ("a", Some("o"), "W"),
            ("b", Some("o"), "W"),
        ]);
        let c = classify(&net, &rows).unwrap();
        assert!(c.get("W").unwrap().is_terminal());
        assert!(c.main_stems().is_empty());
        assert_eq!(names(&net, &auto_origins(&net, &c)), vec!["a", "b"]);
    }

    #[test]
    fn ambiguous_outlet_rejected() {
        // Two separate outlets inside one watershed.
        let (net, rows) = build(&[("x", None, "W"), ("y", None, "W")]);
        let err = classify(&net, &rows).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::AmbiguousOutlet {
                watershed: "W".into(),
                exits: vec!["x".into(), "y".into()],
            }
        );
    }

    #[test]
    fn two_members_leaving_into_neighbour_is_ambiguous() {
        let (net, rows) = build(&[
            ("o", None, "B"),
            ("p", Some("o"), "A"),
            ("q", Some("o"), "A"),
        ]);
        let err = classify(&net, &rows).unwrap_err();
        assert!(matches!(err, ClassificationError::AmbiguousOutlet { .. }));
    }

    #[test]
    fn unknown_member_rejected() {
        let (net, _) = stacked();
        let err = classify(&net, &[WatershedMembership::new("W", "nope")]).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::UnknownReach {
                watershed: "W".into(),
                reach: "nope".into(),
            }
        );
    }

    #[test]
    fn overlapping_membership_rejected() {
        let (net, _) = stacked();
        let rows = vec![
            WatershedMembership::new("A", "m1"),
            WatershedMembership::new("B", "m1"),
        ];
        let err = classify(&net, &rows).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::OverlappingWatersheds {
                reach: "m1".into(),
                first: "A".into(),
                second: "B".into(),
            }
        );
    }

    #[test]
    fn repeated_membership_row_is_harmless() {
        let (net, mut rows) = stacked();
        rows.push(WatershedMembership::new("LOW", "m1"));
        let c = classify(&net, &rows).unwrap();
        assert_eq!(c.get("LOW").unwrap().members.len(), 4);
    }

    #[test]
    fn unassigned_reaches_count_as_outside() {
        // "x" belongs to no watershed and feeds W, so W is pass-through.
        let records = vec![
            ReachRecord::new("o", None).with_watershed("W"),
            ReachRecord::new("i", Some("o")).with_watershed("W"),
            ReachRecord::new("x", Some("i")),
        ];
        let net = NetworkModel::build(&records).unwrap();
        let c = classify(&net, &WatershedMembership::from_reaches(&records)).unwrap();
        let w = c.get("W").unwrap();
        assert_eq!(w.kind, WatershedKind::PassThrough);
        assert_eq!(names(&net, &w.main_stem), vec!["i", "o"]);
        assert_eq!(names(&net, &find_origins(&net, &w.main_stem)), vec!["x"]);
    }

    #[test]
    fn resolve_main_stems_reports_unknown() {
        let (net, _) = stacked();
        let ok = resolve_main_stems(&net, &["m1".into(), "m2".into()]).unwrap();
        assert_eq!(names(&net, &ok), vec!["m1", "m2"]);
        let bad = resolve_main_stems(&net, &["m1".into(), "zz".into()]).unwrap_err();
        assert_eq!(bad.as_str(), "zz");
    }
}
