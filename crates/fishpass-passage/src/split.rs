//! Confluence split policies.
//!
//! When the upstream walk reaches a confluence, a [`SplitPolicy`] decides
//! how much population enters each upstream branch. Policies are
//! stateless once built and shared by every origin of a run.

use std::fmt;

use fishpass_core::{ConfigurationError, ReachIndex};
use fishpass_network::NetworkModel;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per-branch populations, in the confluence's upstream order.
pub type Allocation = SmallVec<[(ReachIndex, f64); 4]>;

/// How a population divides across the upstream branches of a confluence.
///
/// # Contract
///
/// - The returned allocation lists every element of `upstream` exactly
///   once, in the same order.
/// - `split` is deterministic and takes `&self`; implementations hold
///   no mutable state so one policy can serve concurrent workers.
pub trait SplitPolicy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Allocate `population` across `upstream`, the upstream neighbours
    /// of `confluence`.
    ///
    /// # Errors
    ///
    /// A [`ConfigurationError`] when the policy cannot produce an
    /// allocation for this confluence. The engine decides whether that
    /// falls back to [`Persist`] or fails the origin.
    fn split(
        &self,
        population: f64,
        confluence: ReachIndex,
        upstream: &[ReachIndex],
        network: &NetworkModel,
    ) -> Result<Allocation, ConfigurationError>;
}

// ── SplitMode ──────────────────────────────────────────────────────

/// Run-wide split mode, as named in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Every branch receives the full population.
    #[default]
    Persist,
    /// Branches share the population in proportion to an attribute.
    Proportional,
    /// Branches share the population equally.
    Even,
}

impl SplitMode {
    /// Build the policy for this mode.
    ///
    /// `attribute` is only consulted for [`SplitMode::Proportional`].
    ///
    /// # Errors
    ///
    /// See [`Proportional::new`].
    pub fn policy(
        self,
        attribute: Option<&str>,
        network: &NetworkModel,
    ) -> Result<Box<dyn SplitPolicy>, ConfigurationError> {
        Ok(match self {
            Self::Persist => Box::new(Persist),
            Self::Even => Box::new(Even),
            Self::Proportional => {
                let attribute = attribute.ok_or(ConfigurationError::MissingSplitAttribute)?;
                Box::new(Proportional::new(attribute, network)?)
            }
        })
    }

    /// Configuration spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Persist => "persist",
            Self::Proportional => "proportional",
            Self::Even => "even",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persist" => Ok(Self::Persist),
            "proportional" => Ok(Self::Proportional),
            "even" => Ok(Self::Even),
            other => Err(format!(
                "unknown split mode '{other}' (expected persist, proportional, or even)"
            )),
        }
    }
}

// ── Persist ────────────────────────────────────────────────────────

/// No split: every branch receives the full incoming population.
///
/// Population is not conserved across the confluence. Each branch sees
/// the same colonization pressure as the reach below it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Persist;

impl Persist {
    /// The persist allocation, infallible.
    pub fn allocate(population: f64, upstream: &[ReachIndex]) -> Allocation {
        upstream.iter().map(|&u| (u, population)).collect()
    }
}

impl SplitPolicy for Persist {
    fn name(&self) -> &str {
        "persist"
    }

    fn split(
        &self,
        population: f64,
        _confluence: ReachIndex,
        upstream: &[ReachIndex],
        _network: &NetworkModel,
    ) -> Result<Allocation, ConfigurationError> {
        Ok(Self::allocate(population, upstream))
    }
}

// ── Even ───────────────────────────────────────────────────────────

/// Equal shares across all branches.
#[derive(Clone, Copy, Debug, Default)]
pub struct Even;

impl SplitPolicy for Even {
    fn name(&self) -> &str {
        "even"
    }

    fn split(
        &self,
        population: f64,
        _confluence: ReachIndex,
        upstream: &[ReachIndex],
        _network: &NetworkModel,
    ) -> Result<Allocation, ConfigurationError> {
        let share = population / upstream.len().max(1) as f64;
        Ok(upstream.iter().map(|&u| (u, share)).collect())
    }
}

// ── Proportional ───────────────────────────────────────────────────

/// Shares proportional to a numeric reach attribute:
/// `alloc[u] = population * attr[u] / sum(attr over upstream)`.
///
/// The attribute column is resolved against the network once, at
/// construction; `split` only reads the resolved values.
#[derive(Clone, Debug)]
pub struct Proportional {
    attribute: String,
    values: Vec<Option<f64>>,
}

impl Proportional {
    /// Resolve `attribute` for every reach of `network`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownAttribute`] if no reach carries the
    /// attribute at all.
    pub fn new(attribute: &str, network: &NetworkModel) -> Result<Self, ConfigurationError> {
        if !network.has_attribute(attribute) {
            return Err(ConfigurationError::UnknownAttribute {
                attribute: attribute.to_owned(),
            });
        }
        let values = network
            .indices()
            .map(|r| network.attribute(r, attribute))
            .collect();
        Ok(Self {
            attribute: attribute.to_owned(),
            values,
        })
    }

    /// The attribute column this policy splits by.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    fn weight(&self, reach: ReachIndex, network: &NetworkModel) -> Result<f64, ConfigurationError> {
        let value = self
            .values
            .get(reach.get())
            .copied()
            .flatten()
            .ok_or_else(|| ConfigurationError::MissingAttribute {
                reach: network.reach_id(reach).clone(),
                attribute: self.attribute.clone(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigurationError::InvalidAttribute {
                reach: network.reach_id(reach).clone(),
                attribute: self.attribute.clone(),
                value,
            });
        }
        Ok(value)
    }
}

impl SplitPolicy for Proportional {
    fn name(&self) -> &str {
        "proportional"
    }

    fn split(
        &self,
        population: f64,
        confluence: ReachIndex,
        upstream: &[ReachIndex],
        network: &NetworkModel,
    ) -> Result<Allocation, ConfigurationError> {
        let weights = upstream
            .iter()
            .map(|&u| self.weight(u, network))
            .collect::<Result<SmallVec<[f64; 4]>, _>>()?;
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(ConfigurationError::ZeroAttributeSum {
                reach: network.reach_id(confluence).clone(),
                attribute: self.attribute.clone(),
            });
        }
        Ok(upstream
            .iter()
            .zip(&weights)
            .map(|(&u, &w)| (u, population * w / total))
            .collect())
    }
}
