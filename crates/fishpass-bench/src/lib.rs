//! Synthetic networks for benchmarking Fishpass.
//!
//! - [`binary_tree`]: a full binary tree of confluences, outlet at the root
//! - [`random_network`]: `n` reaches with pseudo-random downstream links
//! - [`barriers_every`]: one barrier on every k-th reach
//! - [`deep_chain`]: a long single-thread river, for stack depth

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fishpass_core::{BarrierRecord, OriginRecord, ReachRecord};
use fishpass_engine::{RunConfig, RunInputs};

/// Attribute column carried by every generated reach.
pub const AREA: &str = "drainage_area";

fn lcg(x: u64) -> u64 {
    x.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// Full binary tree of the given depth: `2^depth - 1` reaches.
///
/// Reach `r{i}` drains into `r{(i - 1) / 2}`; `r0` is the outlet.
pub fn binary_tree(depth: u32) -> Vec<ReachRecord> {
    let n = (1usize << depth) - 1;
    (0..n)
        .map(|i| {
            let down = (i > 0).then(|| format!("r{}", (i - 1) / 2));
            ReachRecord::new(format!("r{i}").as_str(), down.as_deref())
                .with_attribute(AREA, 1.0 + (i % 7) as f64)
        })
        .collect()
}

/// `n` reaches where reach `i > 0` drains into a pseudo-random reach
/// `< i`, derived from `seed`. Always a valid tree rooted at `r0`.
pub fn random_network(n: usize, seed: u64) -> Vec<ReachRecord> {
    let mut state = seed;
    (0..n)
        .map(|i| {
            state = lcg(state);
            let down = (i > 0).then(|| format!("r{}", (state >> 33) as usize % i));
            ReachRecord::new(format!("r{i}").as_str(), down.as_deref())
                .with_attribute(AREA, 1.0 + ((state >> 17) % 100) as f64)
        })
        .collect()
}

/// `r0 <- r1 <- ... <- r{n-1}`.
pub fn deep_chain(n: usize) -> Vec<ReachRecord> {
    (0..n)
        .map(|i| {
            let down = (i > 0).then(|| format!("r{}", i - 1));
            ReachRecord::new(format!("r{i}").as_str(), down.as_deref())
        })
        .collect()
}

/// One barrier of the given efficiency on every `k`-th reach of `reaches`.
pub fn barriers_every(reaches: &[ReachRecord], k: usize, efficiency: f64) -> Vec<BarrierRecord> {
    reaches
        .iter()
        .step_by(k.max(1))
        .map(|r| {
            BarrierRecord::new(
                format!("b-{}", r.reach_id).as_str(),
                r.reach_id.clone(),
                0.0,
                efficiency,
            )
        })
        .collect()
}

/// Run inputs with one origin at the outlet `r0`.
pub fn outlet_run(
    reaches: Vec<ReachRecord>,
    barriers: Vec<BarrierRecord>,
    population: f64,
) -> RunInputs {
    RunInputs::new(reaches)
        .with_barriers(barriers)
        .with_origins(vec![OriginRecord::new("O", "r0", population)])
}

/// Run inputs with an origin on every `k`-th reach.
pub fn many_origins(reaches: Vec<ReachRecord>, k: usize, population: f64) -> RunInputs {
    let origins = reaches
        .iter()
        .step_by(k.max(1))
        .map(|r| {
            OriginRecord::new(
                format!("O-{}", r.reach_id).as_str(),
                r.reach_id.clone(),
                population,
            )
        })
        .collect();
    RunInputs::new(reaches).with_origins(origins)
}

/// Threshold 1, persist split, given worker count.
pub fn bench_config(workers: usize) -> RunConfig {
    RunConfig {
        worker_count: Some(workers),
        ..RunConfig::with_threshold(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishpass_engine::Run;

    #[test]
    fn binary_tree_size() {
        assert_eq!(binary_tree(4).len(), 15);
    }

    #[test]
    fn generated_networks_build_and_run() {
        for reaches in [binary_tree(6), random_network(500, 7), deep_chain(200)] {
            let n = reaches.len();
            let report = Run::new(bench_config(1), outlet_run(reaches, vec![], 100.0))
                .unwrap()
                .execute();
            assert_eq!(report.rows.len(), n);
        }
    }

    #[test]
    fn random_network_is_seeded() {
        assert_eq!(random_network(50, 3), random_network(50, 3));
    }

    #[test]
    fn deep_chain_does_not_overflow_the_stack() {
        let report = Run::new(bench_config(1), outlet_run(deep_chain(200_000), vec![], 100.0))
            .unwrap()
            .execute();
        assert_eq!(report.rows.len(), 200_000);
    }
}
