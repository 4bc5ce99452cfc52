//! Reusable stream networks.
//!
//! - [`linear_chain`]: `R1 -> R2 -> ... -> Rn`, `Rn` the outlet.
//! - [`single_confluence`]: outlet `R1` fed by `R2` (area 30) and `R3` (area 70).
//! - [`two_barriers`]: two 50% barriers on one reach.
//! - [`stacked_watersheds`]: a river crossing two watersheds with side tributaries.

use fishpass_core::{BarrierRecord, OriginRecord, ReachRecord, WatershedMembership};

pub const DRAINAGE_AREA: &str = "drainage_area";

/// `R1 -> R2 -> ... -> Rn`. `R1` is the headwater and `Rn` the outlet.
pub fn linear_chain(n: usize) -> Vec<ReachRecord> {
    (1..=n)
        .map(|i| {
            let down = (i < n).then(|| format!("R{}", i + 1));
            ReachRecord::new(format!("R{i}").as_str(), down.as_deref())
        })
        .collect()
}

/// Outlet `R1` with two headwater tributaries, `R2` (drainage area 30)
/// and `R3` (drainage area 70).
pub fn single_confluence() -> Vec<ReachRecord> {
    vec![
        ReachRecord::new("R1", None).with_attribute(DRAINAGE_AREA, 100.0),
        ReachRecord::new("R2", Some("R1")).with_attribute(DRAINAGE_AREA, 30.0),
        ReachRecord::new("R3", Some("R1")).with_attribute(DRAINAGE_AREA, 70.0),
    ]
}

/// Two 50% barriers on `reach`, at positions 1 and 2.
pub fn two_barriers(reach: &str) -> Vec<BarrierRecord> {
    vec![
        BarrierRecord::new("B1", reach, 1.0, 0.5),
        BarrierRecord::new("B2", reach, 2.0, 0.5),
    ]
}

/// A single origin.
pub fn origin(origin_id: &str, reach: &str, population: f64) -> OriginRecord {
    OriginRecord::new(origin_id, reach, population)
}

/// A river running through two watersheds.
///
/// ```text
///   UPPER (terminal):       u3 -> u2 -> u1 ─┐
///                           u4 ──────^      │
///   LOWER (pass-through):                   v
///                           t2 -> t1 -> m2 <- m3
///                                       │
///                                       v
///                                       m1 (outlet)
/// ```
///
/// Main stem of LOWER: `m3, m2, m1`. Origins: `t1` (LOWER tributary)
/// and `u1` (UPPER's outlet, entering the main stem at `m3`).
pub fn stacked_watersheds() -> Vec<ReachRecord> {
    vec![
        ReachRecord::new("m1", None)
            .with_watershed("LOWER")
            .with_attribute(DRAINAGE_AREA, 500.0),
        ReachRecord::new("m2", Some("m1"))
            .with_watershed("LOWER")
            .with_attribute(DRAINAGE_AREA, 450.0),
        ReachRecord::new("m3", Some("m2"))
            .with_watershed("LOWER")
            .with_attribute(DRAINAGE_AREA, 300.0),
        ReachRecord::new("t1", Some("m2"))
            .with_watershed("LOWER")
            .with_attribute(DRAINAGE_AREA, 120.0),
        ReachRecord::new("t2", Some("t1"))
            .with_watershed("LOWER")
            .with_attribute(DRAINAGE_AREA, 60.0),
        ReachRecord::new("u1", Some("m3"))
            .with_watershed("UPPER")
            .with_attribute(DRAINAGE_AREA, 250.0),
        ReachRecord::new("u2", Some("u1"))
            .with_watershed("UPPER")
            .with_attribute(DRAINAGE_AREA, 150.0),
        ReachRecord::new("u3", Some("u2"))
            .with_watershed("UPPER")
            .with_attribute(DRAINAGE_AREA, 50.0),
        ReachRecord::new("u4", Some("u2"))
            .with_watershed("UPPER")
            .with_attribute(DRAINAGE_AREA, 50.0),
    ]
}

/// Membership rows for [`stacked_watersheds`].
pub fn stacked_memberships() -> Vec<WatershedMembership> {
    WatershedMembership::from_reaches(&stacked_watersheds())
}
