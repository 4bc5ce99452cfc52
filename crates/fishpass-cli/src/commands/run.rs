//! `fishpass run`: propagate origins upstream and write the result table.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use fishpass_engine::{Run, RunConfig, RunInputs, SplitMode};
use fishpass_tables::{
    create, open, read_barriers, read_main_stems, read_origins, write_failures, write_results,
    BarrierColumns, OriginColumns,
};
use tracing::info;

use super::{load_reaches, load_watersheds};

/// Arguments for `fishpass run`.
#[derive(Args)]
pub struct RunArgs {
    /// Reach table (reach_id, downstream_id, optional watershed_id and attributes)
    #[arg(long)]
    pub reaches: PathBuf,

    /// Barrier table (barrier_id, reach_id, position, passage_efficiency)
    #[arg(long)]
    pub barriers: Option<PathBuf>,

    /// Origin table (origin_id, reach_id, initial_population)
    #[arg(long)]
    pub origins: Option<PathBuf>,

    /// Watershed membership table, for --auto-topology
    #[arg(long)]
    pub watersheds: Option<PathBuf>,

    /// Main-stem reach list (single reach_id column)
    #[arg(long)]
    pub main_stems: Option<PathBuf>,

    /// JSON run configuration; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop-population threshold
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Confluence split mode: persist, proportional, or even
    #[arg(long)]
    pub split_mode: Option<SplitMode>,

    /// Reach attribute column for proportional splitting
    #[arg(long)]
    pub split_attribute: Option<String>,

    /// Derive origins from watershed topology
    #[arg(long)]
    pub auto_topology: bool,

    /// Origin worker threads (default: available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Result table path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Failure table path (default: failures are only logged)
    #[arg(long)]
    pub failures: Option<PathBuf>,
}

impl RunArgs {
    fn config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                RunConfig::from_json_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => match self.threshold {
                Some(threshold) => RunConfig::with_threshold(threshold),
                None => bail!("a threshold is required: pass --threshold or --config"),
            },
        };
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(mode) = self.split_mode {
            config.split_mode = mode;
        }
        if let Some(attribute) = &self.split_attribute {
            config.split_attribute = Some(attribute.clone());
        }
        if self.auto_topology {
            config.use_auto_topology = true;
        }
        if let Some(workers) = self.workers {
            config.worker_count = Some(workers);
        }
        Ok(config)
    }

    fn inputs(&self, config: &RunConfig) -> Result<RunInputs> {
        let reaches = load_reaches(&self.reaches, config.split_attribute.as_deref())?;
        let mut inputs = RunInputs::new(reaches);
        if let Some(path) = &self.barriers {
            inputs.barriers = read_barriers(open(path)?, &BarrierColumns::default())
                .with_context(|| format!("reading barrier table {}", path.display()))?;
        }
        if let Some(path) = &self.origins {
            inputs.origins = Some(
                read_origins(open(path)?, &OriginColumns::default())
                    .with_context(|| format!("reading origin table {}", path.display()))?,
            );
        }
        if let Some(path) = &self.watersheds {
            inputs.watersheds = Some(load_watersheds(path)?);
        }
        if let Some(path) = &self.main_stems {
            inputs.main_stems = Some(
                read_main_stems(open(path)?, "reach_id")
                    .with_context(|| format!("reading main-stem list {}", path.display()))?,
            );
        }
        Ok(inputs)
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let config = args.config()?;
    let inputs = args.inputs(&config)?;
    let run = Run::new(config, inputs)?;
    let report = run.execute();

    match &args.output {
        Some(path) => {
            write_results(create(path)?, &report.rows)?;
            info!(path = %path.display(), rows = report.rows.len(), "results written");
        }
        None => write_results(io::stdout().lock(), &report.rows)?,
    }
    if let Some(path) = &args.failures {
        write_failures(create(path)?, &report.failures)?;
    }

    let m = &report.metrics;
    info!(
        origins = m.origins_processed,
        failed = m.origins_failed,
        threshold_stops = m.threshold_stops,
        headwater_stops = m.headwater_stops,
        split_fallbacks = m.split_fallbacks,
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: Option<PathBuf>, threshold: Option<f64>) -> RunArgs {
        RunArgs {
            reaches: PathBuf::from("reaches.csv"),
            barriers: None,
            origins: None,
            watersheds: None,
            main_stems: None,
            config,
            threshold,
            split_mode: None,
            split_attribute: None,
            auto_topology: false,
            workers: None,
            output: None,
            failures: None,
        }
    }

    #[test]
    fn threshold_required_without_config() {
        assert!(args(None, None).config().is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, r#"{ "threshold": 9.0, "split_mode": "even" }"#).unwrap();

        let mut a = args(Some(path), Some(2.0));
        a.auto_topology = true;
        a.workers = Some(3);
        let config = a.config().unwrap();
        assert_eq!(config.threshold, 2.0);
        assert_eq!(config.split_mode, SplitMode::Even);
        assert!(config.use_auto_topology);
        assert_eq!(config.worker_count, Some(3));
    }

    #[test]
    fn split_attribute_column_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let reaches = dir.path().join("reaches.csv");
        fs::write(
            &reaches,
            "reach_id,downstream_id,name,area\nR1,,Main,10\nR2,R1,Fork,unknown\n",
        )
        .unwrap();

        let mut a = args(None, Some(1.0));
        a.reaches = reaches;
        let lenient = a.config().unwrap();
        assert!(a.inputs(&lenient).is_ok());

        a.split_attribute = Some("area".into());
        let strict = a.config().unwrap();
        assert!(a.inputs(&strict).is_err());
    }

    #[test]
    fn end_to_end_on_files() {
        let dir = tempfile::tempdir().unwrap();
        let reaches = dir.path().join("reaches.csv");
        let origins = dir.path().join("origins.csv");
        let output = dir.path().join("out.csv");
        let failures = dir.path().join("failures.csv");
        fs::write(&reaches, "reach_id,downstream_id\nR1,\nR2,R1\n").unwrap();
        fs::write(
            &origins,
            "origin_id,reach_id,initial_population\nO1,R1,100\nO2,R7,100\n",
        )
        .unwrap();

        let mut a = args(None, Some(1.0));
        a.reaches = reaches;
        a.origins = Some(origins);
        a.output = Some(output.clone());
        a.failures = Some(failures.clone());
        execute(a).unwrap();

        let out = fs::read_to_string(output).unwrap();
        assert_eq!(
            out,
            "origin_id,reach_id,population,stop_reason\nO1,R1,100.0,none\nO1,R2,100.0,headwater\n"
        );
        let failed = fs::read_to_string(failures).unwrap();
        assert!(failed.starts_with("origin_id,error\nO2,"));
    }
}
