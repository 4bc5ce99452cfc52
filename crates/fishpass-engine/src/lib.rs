//! Upstream propagation for Fishpass.
//!
//! A [`Run`] ties the pieces together: it validates a [`RunConfig`],
//! builds the network and barrier index, picks the split policy,
//! resolves the origins, and then walks upstream from every origin with
//! a [`PropagationEngine`]. Origins are independent, so
//! [`Run::execute`] can spread them across worker threads; the report is
//! identical for any worker count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod origins;
pub mod run;
mod workers;

pub use config::{RunConfig, SplitFallback};
pub use engine::{PropagationEngine, Walk};
pub use error::RunError;
pub use fishpass_passage::SplitMode;
pub use metrics::RunMetrics;
pub use origins::{Origin, OriginSource};
pub use run::{Run, RunInputs, RunReport};
