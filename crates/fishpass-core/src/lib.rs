//! Core types for the Fishpass upstream-passage model.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace:
//! identifiers, the input table records, the propagation result row,
//! and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod record;
pub mod result;

pub use error::{ClassificationError, ConfigurationError, DataError, ValidationError};
pub use id::{BarrierId, OriginId, ReachId, ReachIndex, WatershedId};
pub use record::{BarrierRecord, OriginRecord, ReachRecord, WatershedMembership};
pub use result::{OriginFailure, PropagationResult, StopReason};
