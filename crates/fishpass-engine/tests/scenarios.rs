//! End-to-end runs over small hand-built networks.

use fishpass_core::{BarrierRecord, ReachRecord, StopReason};
use fishpass_engine::{Run, RunConfig, RunInputs, RunReport, SplitMode};
use fishpass_test_utils::{linear_chain, origin, single_confluence, two_barriers, DRAINAGE_AREA};

fn rows(report: &RunReport) -> Vec<(&str, f64, StopReason)> {
    report
        .rows
        .iter()
        .map(|r| (r.reach_id.as_str(), r.population, r.stop_reason))
        .collect()
}

fn single_reach_with_barriers(threshold: f64) -> RunReport {
    let inputs = RunInputs::new(vec![ReachRecord::new("R1", None)])
        .with_barriers(two_barriers("R1"))
        .with_origins(vec![origin("O1", "R1", 100.0)]);
    Run::new(RunConfig::with_threshold(threshold), inputs)
        .unwrap()
        .execute()
}

#[test]
fn linear_headwater_origin() {
    let inputs = RunInputs::new(linear_chain(3)).with_origins(vec![origin("O1", "R1", 100.0)]);
    let report = Run::new(RunConfig::with_threshold(1.0), inputs)
        .unwrap()
        .execute();
    assert_eq!(rows(&report), [("R1", 100.0, StopReason::Headwater)]);
}

#[test]
fn proportional_confluence() {
    let config = RunConfig {
        split_mode: SplitMode::Proportional,
        split_attribute: Some(DRAINAGE_AREA.into()),
        ..RunConfig::with_threshold(1.0)
    };
    let inputs =
        RunInputs::new(single_confluence()).with_origins(vec![origin("O1", "R1", 100.0)]);
    let report = Run::new(config, inputs).unwrap().execute();
    assert_eq!(
        rows(&report),
        [
            ("R1", 100.0, StopReason::None),
            ("R2", 30.0, StopReason::Headwater),
            ("R3", 70.0, StopReason::Headwater),
        ]
    );
}

#[test]
fn two_barriers_stay_above_threshold() {
    let report = single_reach_with_barriers(20.0);
    assert_eq!(rows(&report), [("R1", 25.0, StopReason::Headwater)]);
}

#[test]
fn second_barrier_hits_threshold() {
    let report = single_reach_with_barriers(30.0);
    assert_eq!(rows(&report), [("R1", 25.0, StopReason::Threshold)]);
    assert_eq!(report.metrics.threshold_stops, 1);
}

#[test]
fn threshold_stop_blocks_upstream_reaches() {
    let inputs = RunInputs::new(linear_chain(3))
        .with_barriers(two_barriers("R2"))
        .with_origins(vec![origin("O1", "R3", 100.0)]);
    let report = Run::new(RunConfig::with_threshold(30.0), inputs)
        .unwrap()
        .execute();
    assert_eq!(
        rows(&report),
        [
            ("R3", 100.0, StopReason::None),
            ("R2", 25.0, StopReason::Threshold),
        ]
    );
}

#[test]
fn default_efficiency_fills_blank_barriers() {
    let blank = BarrierRecord {
        passage_efficiency: None,
        ..BarrierRecord::new("B", "R1", 0.0, 0.0)
    };
    let config = RunConfig {
        default_passage_efficiency: Some(0.4),
        ..RunConfig::with_threshold(1.0)
    };
    let inputs = RunInputs::new(vec![ReachRecord::new("R1", None)])
        .with_barriers(vec![blank])
        .with_origins(vec![origin("O1", "R1", 100.0)]);
    let report = Run::new(config, inputs).unwrap().execute();
    assert_eq!(rows(&report), [("R1", 40.0, StopReason::Headwater)]);
}

#[test]
fn barrier_on_unknown_reach_is_ignored() {
    let inputs = RunInputs::new(linear_chain(2))
        .with_barriers(two_barriers("elsewhere"))
        .with_origins(vec![origin("O1", "R2", 100.0)]);
    let report = Run::new(RunConfig::with_threshold(1.0), inputs)
        .unwrap()
        .execute();
    assert!(report.rows.iter().all(|r| r.population == 100.0));
}

#[test]
fn origins_are_independent() {
    let inputs = RunInputs::new(linear_chain(3)).with_origins(vec![
        origin("low", "R3", 100.0),
        origin("high", "R1", 7.0),
    ]);
    let report = Run::new(RunConfig::with_threshold(1.0), inputs)
        .unwrap()
        .execute();
    assert_eq!(report.rows_for("low").count(), 3);
    let high: Vec<_> = report.rows_for("high").collect();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].population, 7.0);
    // Input order is preserved.
    assert_eq!(report.rows[3].origin_id.as_str(), "high");
}
