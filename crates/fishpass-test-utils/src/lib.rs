//! Test fixtures for Fishpass development.
//!
//! Fixtures return plain table records so that any crate in the
//! workspace can build its own network, barrier index, or run from them
//! without a dependency cycle on the crate under test.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::*;
