//! Stream network structure for Fishpass.
//!
//! This crate owns the reach graph. [`NetworkModel`] validates the reach
//! table (single downstream link, no dangling references, no cycles) and
//! answers the structural queries the propagation engine relies on.
//! The [`topology`] module derives watershed labels (terminal vs
//! pass-through), main stems, and origin reaches when the user does not
//! supply them.
//!
//! A built network is immutable and `Send + Sync`; every other
//! component borrows it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod network;
pub mod topology;

pub use network::NetworkModel;
pub use topology::{
    auto_origins, classify, find_origins, resolve_main_stems, Classification, WatershedClass,
    WatershedKind,
};
