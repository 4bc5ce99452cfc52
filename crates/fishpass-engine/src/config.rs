//! Run configuration and validation.
//!
//! [`RunConfig`] is checked once by [`validate()`](RunConfig::validate)
//! before any network is built. It can be written by hand or loaded
//! from JSON with [`RunConfig::from_json_str`].

use fishpass_core::ConfigurationError;
use fishpass_passage::SplitMode;
use serde::{Deserialize, Serialize};

// ── SplitFallback ──────────────────────────────────────────────────

/// What the engine does when the split policy cannot allocate at a
/// confluence (for example a branch without the split attribute).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitFallback {
    /// Log a warning and give every branch the full population.
    #[default]
    Persist,
    /// Fail the origin; its rows are replaced by one failure entry.
    Fail,
}

// ── RunConfig ──────────────────────────────────────────────────────

/// Options for one propagation run.
///
/// Only `threshold` is required in JSON; every other field falls back
/// to its [`Default`] value.
///
/// # Examples
///
/// ```
/// use fishpass_engine::{RunConfig, SplitMode};
///
/// let config = RunConfig::from_json_str(
///     r#"{ "threshold": 5.0, "split_mode": "proportional", "split_attribute": "drainage_area" }"#,
/// )
/// .unwrap();
/// assert_eq!(config.split_mode, SplitMode::Proportional);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Stop-population cutoff. Traversal halts wherever the population
    /// is at or below this value.
    pub threshold: f64,
    /// Confluence split mode. Default: persist.
    #[serde(default)]
    pub split_mode: SplitMode,
    /// Reach attribute used by proportional splitting.
    #[serde(default)]
    pub split_attribute: Option<String>,
    /// Behaviour when a split fails at a confluence. Default: persist.
    #[serde(default)]
    pub on_split_failure: SplitFallback,
    /// Derive origins from watershed topology when no origin table is
    /// supplied. Default: false.
    #[serde(default)]
    pub use_auto_topology: bool,
    /// Population given to origins discovered from main stems or
    /// topology. Default: 100.
    #[serde(default = "default_initial_population")]
    pub default_initial_population: f64,
    /// Efficiency for barrier rows with a blank `passage_efficiency`.
    #[serde(default)]
    pub default_passage_efficiency: Option<f64>,
    /// Number of origin worker threads. `None` = auto-detect.
    #[serde(default)]
    pub worker_count: Option<usize>,
}

fn default_initial_population() -> f64 {
    100.0
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            split_mode: SplitMode::Persist,
            split_attribute: None,
            on_split_failure: SplitFallback::Persist,
            use_auto_topology: false,
            default_initial_population: default_initial_population(),
            default_passage_efficiency: None,
            worker_count: None,
        }
    }
}

impl RunConfig {
    /// Default options with the given threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Parse a JSON document. Does not validate.
    ///
    /// # Errors
    ///
    /// Malformed JSON, a missing `threshold`, or an unknown field.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check every option.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::InvalidThreshold`] for a NaN, infinite,
    ///   or negative threshold.
    /// - [`ConfigurationError::MissingSplitAttribute`] for proportional
    ///   splitting without an attribute.
    /// - [`ConfigurationError::InvalidDefaultPopulation`] and
    ///   [`ConfigurationError::InvalidDefaultEfficiency`] for out-of-range
    ///   defaults.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                value: self.threshold,
            });
        }
        if self.split_mode == SplitMode::Proportional && self.split_attribute.is_none() {
            return Err(ConfigurationError::MissingSplitAttribute);
        }
        let pop = self.default_initial_population;
        if !pop.is_finite() || pop < 0.0 {
            return Err(ConfigurationError::InvalidDefaultPopulation { value: pop });
        }
        if let Some(eff) = self.default_passage_efficiency {
            if !(0.0..=1.0).contains(&eff) {
                return Err(ConfigurationError::InvalidDefaultEfficiency { value: eff });
            }
        }
        Ok(())
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`. Auto-detection uses the
    /// available parallelism, clamped to `[1, 16]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .clamp(1, 16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RunConfig::default();
        assert_eq!(c.split_mode, SplitMode::Persist);
        assert_eq!(c.on_split_failure, SplitFallback::Persist);
        assert_eq!(c.default_initial_population, 100.0);
        assert!(!c.use_auto_topology);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn negative_threshold_rejected() {
        let err = RunConfig::with_threshold(-1.0).validate().unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidThreshold { value: -1.0 });
    }

    #[test]
    fn nan_threshold_rejected() {
        let err = RunConfig::with_threshold(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidThreshold { .. }));
    }

    #[test]
    fn proportional_without_attribute_rejected() {
        let c = RunConfig {
            split_mode: SplitMode::Proportional,
            ..RunConfig::default()
        };
        assert_eq!(
            c.validate().unwrap_err(),
            ConfigurationError::MissingSplitAttribute
        );
    }

    #[test]
    fn default_efficiency_out_of_range_rejected() {
        let c = RunConfig {
            default_passage_efficiency: Some(1.2),
            ..RunConfig::default()
        };
        assert!(matches!(
            c.validate().unwrap_err(),
            ConfigurationError::InvalidDefaultEfficiency { .. }
        ));
    }

    #[test]
    fn negative_default_population_rejected() {
        let c = RunConfig {
            default_initial_population: -5.0,
            ..RunConfig::default()
        };
        assert!(matches!(
            c.validate().unwrap_err(),
            ConfigurationError::InvalidDefaultPopulation { .. }
        ));
    }

    // ── JSON ───────────────────────────────────────────────────

    #[test]
    fn json_requires_threshold() {
        assert!(RunConfig::from_json_str("{}").is_err());
    }

    #[test]
    fn json_fills_defaults() {
        let c = RunConfig::from_json_str(r#"{ "threshold": 2.5 }"#).unwrap();
        assert_eq!(c, RunConfig::with_threshold(2.5));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        assert!(RunConfig::from_json_str(r#"{ "threshold": 1, "thresh": 2 }"#).is_err());
    }

    #[test]
    fn json_reads_every_field() {
        let c = RunConfig::from_json_str(
            r#"{
                "threshold": 0.5,
                "split_mode": "even",
                "on_split_failure": "fail",
                "use_auto_topology": true,
                "default_initial_population": 10,
                "default_passage_efficiency": 0.75,
                "worker_count": 3
            }"#,
        )
        .unwrap();
        assert_eq!(c.split_mode, SplitMode::Even);
        assert_eq!(c.on_split_failure, SplitFallback::Fail);
        assert!(c.use_auto_topology);
        assert_eq!(c.default_initial_population, 10.0);
        assert_eq!(c.default_passage_efficiency, Some(0.75));
        assert_eq!(c.resolved_worker_count(), 3);
    }

    // ── Workers ────────────────────────────────────────────────

    #[test]
    fn worker_count_clamped() {
        let mut c = RunConfig::default();
        c.worker_count = Some(0);
        assert_eq!(c.resolved_worker_count(), 1);
        c.worker_count = Some(1000);
        assert_eq!(c.resolved_worker_count(), 64);
        c.worker_count = None;
        assert!((1..=16).contains(&c.resolved_worker_count()));
    }
}
