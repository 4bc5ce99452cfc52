//! Run setup and execution.

use std::time::Instant;

use fishpass_core::{
    BarrierRecord, ConfigurationError, DataError, OriginFailure, OriginRecord, PropagationResult,
    ReachId, ReachIndex, ReachRecord, StopReason, WatershedMembership,
};
use fishpass_network::{
    auto_origins, classify, find_origins, resolve_main_stems, Classification, NetworkModel,
};
use fishpass_passage::{BarrierIndex, SplitPolicy};
use tracing::instrument;

use crate::config::RunConfig;
use crate::engine::PropagationEngine;
use crate::error::RunError;
use crate::metrics::RunMetrics;
use crate::origins::{self, Origin, OriginSource};
use crate::workers::{self, Outcome};

// ── RunInputs ──────────────────────────────────────────────────────

/// The tables a run consumes, already parsed.
///
/// Only the reach table is mandatory. Origins come from `origins` when
/// present, otherwise from auto-topology (`RunConfig::use_auto_topology`),
/// otherwise from `main_stems`.
#[derive(Clone, Debug, Default)]
pub struct RunInputs {
    /// Reach table.
    pub reaches: Vec<ReachRecord>,
    /// Barrier table. Empty means no barriers.
    pub barriers: Vec<BarrierRecord>,
    /// Origin table.
    pub origins: Option<Vec<OriginRecord>>,
    /// Watershed membership table. When absent, auto-topology uses the
    /// reach table's `watershed_id` column.
    pub watersheds: Option<Vec<WatershedMembership>>,
    /// Main-stem reach list.
    pub main_stems: Option<Vec<ReachId>>,
}

impl RunInputs {
    /// Inputs with the given reach table and nothing else.
    pub fn new(reaches: Vec<ReachRecord>) -> Self {
        Self {
            reaches,
            ..Self::default()
        }
    }

    /// Set the barrier table.
    pub fn with_barriers(mut self, barriers: Vec<BarrierRecord>) -> Self {
        self.barriers = barriers;
        self
    }

    /// Set the origin table.
    pub fn with_origins(mut self, origins: Vec<OriginRecord>) -> Self {
        self.origins = Some(origins);
        self
    }

    /// Set the watershed membership table.
    pub fn with_watersheds(mut self, watersheds: Vec<WatershedMembership>) -> Self {
        self.watersheds = Some(watersheds);
        self
    }

    /// Set the main-stem list.
    pub fn with_main_stems(mut self, main_stems: Vec<ReachId>) -> Self {
        self.main_stems = Some(main_stems);
        self
    }
}

// ── RunReport ──────────────────────────────────────────────────────

/// Everything a run produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Result rows, by origin input order and then depth-first order.
    pub rows: Vec<PropagationResult>,
    /// One entry per origin that could not be walked, in input order.
    pub failures: Vec<OriginFailure>,
    /// Counters.
    pub metrics: RunMetrics,
}

impl RunReport {
    /// Rows for one origin.
    pub fn rows_for<'a>(
        &'a self,
        origin: &'a str,
    ) -> impl Iterator<Item = &'a PropagationResult> + 'a {
        self.rows.iter().filter(move |r| r.origin_id.as_str() == origin)
    }
}

// ── Run ────────────────────────────────────────────────────────────

/// A validated run, ready to execute.
///
/// # Examples
///
/// ```
/// use fishpass_core::{OriginRecord, ReachRecord};
/// use fishpass_engine::{Run, RunConfig, RunInputs};
///
/// let inputs = RunInputs::new(vec![
///     ReachRecord::new("R1", None),
///     ReachRecord::new("R2", Some("R1")),
/// ])
/// .with_origins(vec![OriginRecord::new("O1", "R1", 100.0)]);
///
/// let run = Run::new(RunConfig::with_threshold(1.0), inputs).unwrap();
/// let report = run.execute();
/// assert_eq!(report.rows.len(), 2);
/// assert!(report.failures.is_empty());
/// ```
pub struct Run {
    config: RunConfig,
    network: NetworkModel,
    barriers: BarrierIndex,
    split: Box<dyn SplitPolicy>,
    classification: Option<Classification>,
    source: OriginSource,
    origins: Vec<Result<Origin, OriginFailure>>,
}

impl Run {
    /// Validate `config`, build the network and barrier index, pick the
    /// split policy, and resolve origins.
    ///
    /// # Errors
    ///
    /// Any [`RunError`]: invalid options, an invalid network, invalid
    /// barriers, a main-stem entry outside the network, an unclassifiable
    /// watershed, or no origins at all. Bad origin table rows are not
    /// errors here; they become failures in the report.
    #[instrument(skip_all, fields(reaches = inputs.reaches.len()))]
    pub fn new(config: RunConfig, inputs: RunInputs) -> Result<Self, RunError> {
        config.validate()?;
        let network = NetworkModel::build(&inputs.reaches)?;
        let barriers = BarrierIndex::build(&inputs.barriers, config.default_passage_efficiency)?;
        for reach in barriers.unmatched(&network) {
            tracing::warn!(%reach, "barrier on a reach that is not in the network; ignored");
        }
        let split = config
            .split_mode
            .policy(config.split_attribute.as_deref(), &network)?;

        let mut classification = None;
        let (source, origins) = if let Some(records) = &inputs.origins {
            if config.use_auto_topology {
                tracing::warn!("origin table supplied; auto-topology ignored");
            }
            (OriginSource::Table, origins::from_table(records, &network))
        } else if config.use_auto_topology {
            let derived;
            let memberships = match &inputs.watersheds {
                Some(rows) => rows.as_slice(),
                None => {
                    derived = WatershedMembership::from_reaches(&inputs.reaches);
                    derived.as_slice()
                }
            };
            let classes = classify(&network, memberships)?;
            let found = auto_origins(&network, &classes);
            classification = Some(classes);
            (
                OriginSource::AutoTopology,
                origins::from_reaches(&found, config.default_initial_population, &network),
            )
        } else if let Some(list) = &inputs.main_stems {
            let stems = resolve_main_stems(&network, list)
                .map_err(|reach| DataError::UnknownMainStemReach { reach })?;
            let found: Vec<ReachIndex> = find_origins(&network, &stems);
            (
                OriginSource::MainStems,
                origins::from_reaches(&found, config.default_initial_population, &network),
            )
        } else {
            return Err(ConfigurationError::NoOrigins.into());
        };
        if origins.is_empty() {
            return Err(ConfigurationError::NoOrigins.into());
        }

        tracing::info!(
            reaches = network.len(),
            barriers = barriers.len(),
            origins = origins.len(),
            %source,
            split = split.name(),
            threshold = config.threshold,
            "run prepared"
        );
        Ok(Self {
            config,
            network,
            barriers,
            split,
            classification,
            source,
            origins,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The network.
    pub fn network(&self) -> &NetworkModel {
        &self.network
    }

    /// The barrier index.
    pub fn barriers(&self) -> &BarrierIndex {
        &self.barriers
    }

    /// The watershed classification, when auto-topology produced the
    /// origins.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Where the origins came from.
    pub fn origin_source(&self) -> OriginSource {
        self.source
    }

    /// Resolved origins and origin-table failures, in input order.
    pub fn origins(&self) -> &[Result<Origin, OriginFailure>] {
        &self.origins
    }

    /// A propagation engine over this run's network and policies.
    pub fn engine(&self) -> PropagationEngine<'_> {
        PropagationEngine::new(
            &self.network,
            &self.barriers,
            self.split.as_ref(),
            self.config.threshold,
            self.config.on_split_failure,
        )
    }

    /// Walk every origin and assemble the report.
    ///
    /// With one worker (or one origin) the walk is sequential; otherwise
    /// origins are spread across scoped worker threads. The report is the
    /// same either way.
    #[instrument(skip_all, fields(origins = self.origins.len()))]
    pub fn execute(&self) -> RunReport {
        let start = Instant::now();
        let engine = self.engine();
        let workers = self.config.resolved_worker_count().min(self.origins.len()).max(1);
        let outcomes: Vec<Outcome> = if workers == 1 {
            self.origins
                .iter()
                .map(|task| workers::process(&engine, task))
                .collect()
        } else {
            workers::run_parallel(&engine, &self.origins, workers)
        };

        let mut report = RunReport::default();
        report.metrics.workers = workers;
        for outcome in outcomes {
            match outcome {
                Ok(walk) => {
                    report.metrics.origins_processed += 1;
                    report.metrics.split_fallbacks += walk.split_fallbacks;
                    report.metrics.threshold_stops += walk.count(StopReason::Threshold);
                    report.metrics.headwater_stops += walk.count(StopReason::Headwater);
                    report.rows.extend(walk.rows);
                }
                Err(failure) => {
                    tracing::warn!(
                        origin = %failure.origin_id,
                        error = %failure.error,
                        "origin failed"
                    );
                    report.metrics.origins_failed += 1;
                    report.failures.push(failure);
                }
            }
        }
        report.metrics.rows_emitted = report.rows.len() as u64;
        report.metrics.total_us = start.elapsed().as_micros() as u64;
        tracing::info!(
            origins = report.metrics.origins_processed,
            failed = report.metrics.origins_failed,
            rows = report.metrics.rows_emitted,
            workers,
            total_us = report.metrics.total_us,
            "run finished"
        );
        report
    }
}
