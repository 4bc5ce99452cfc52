//! Fishpass: upstream fish-passage propagation over stream networks.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Fishpass sub-crates. For most users, adding `fishpass` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fishpass::prelude::*;
//!
//! let reaches = fishpass::tables::read_reaches(
//!     "reach_id,downstream_id,drainage_area\nR1,,100\nR2,R1,30\nR3,R1,70\n".as_bytes(),
//!     &ReachColumns::default(),
//! )
//! .unwrap();
//!
//! let config = RunConfig {
//!     split_mode: SplitMode::Proportional,
//!     split_attribute: Some("drainage_area".into()),
//!     ..RunConfig::with_threshold(1.0)
//! };
//! let inputs = RunInputs::new(reaches).with_origins(vec![OriginRecord::new("O1", "R1", 100.0)]);
//!
//! let report = Run::new(config, inputs).unwrap().execute();
//! let r3 = report.rows.iter().find(|r| r.reach_id.as_str() == "R3").unwrap();
//! assert_eq!(r3.population, 70.0);
//! assert_eq!(r3.stop_reason, StopReason::Headwater);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fishpass-core` | IDs, table records, result rows, error taxonomy |
//! | [`network`] | `fishpass-network` | Reach graph and watershed topology |
//! | [`passage`] | `fishpass-passage` | Barrier index and split policies |
//! | [`engine`] | `fishpass-engine` | Propagation engine and run orchestration |
//! | [`tables`] | `fishpass-tables` | CSV readers and writers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, records, result rows, and errors (`fishpass-core`).
pub use fishpass_core as types;

/// Reach graph and watershed classification (`fishpass-network`).
///
/// [`network::NetworkModel`] validates the reach table;
/// [`network::classify`] labels watersheds terminal or pass-through.
pub use fishpass_network as network;

/// Barrier attenuation and confluence splitting (`fishpass-passage`).
pub use fishpass_passage as passage;

/// The upstream walk and run orchestration (`fishpass-engine`).
pub use fishpass_engine as engine;

/// CSV input and output (`fishpass-tables`).
pub use fishpass_tables as tables;

/// Common imports for typical Fishpass usage.
///
/// ```rust
/// use fishpass::prelude::*;
/// ```
pub mod prelude {
    // Records and results
    pub use fishpass_core::{
        BarrierRecord, OriginFailure, OriginRecord, PropagationResult, ReachId, ReachRecord,
        StopReason, WatershedMembership,
    };

    // Errors
    pub use fishpass_core::{ClassificationError, ConfigurationError, DataError, ValidationError};

    // Network
    pub use fishpass_network::{classify, find_origins, NetworkModel, WatershedKind};

    // Passage
    pub use fishpass_passage::{BarrierIndex, SplitMode, SplitPolicy};

    // Engine
    pub use fishpass_engine::{Run, RunConfig, RunError, RunInputs, RunMetrics, RunReport};

    // Tables
    pub use fishpass_tables::{
        BarrierColumns, OriginColumns, ReachColumns, TableError, WatershedColumns,
    };
}
