//! CSV tables for Fishpass.
//!
//! Readers turn the reach, barrier, origin, watershed, and main-stem
//! tables into core records; writers emit the result and failure
//! tables. Column names are looked up through role mappings
//! ([`ReachColumns`] and friends) so a table with differently named
//! columns can be read without renaming them first.
//!
//! Every table must have a header row. Header matching ignores ASCII
//! case and surrounding whitespace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod error;
pub mod read;
pub mod write;

pub use columns::{BarrierColumns, OriginColumns, ReachColumns, WatershedColumns};
pub use error::TableError;
pub use read::{
    open, read_barriers, read_main_stems, read_origins, read_reaches, read_watersheds,
};
pub use write::{create, write_failures, write_results};
