//! What happens to a population inside a reach and at a confluence.
//!
//! [`BarrierIndex`] orders the barriers of each reach in the order a fish
//! meets them walking upstream, and [`attenuate`] applies them with the
//! mid-reach threshold stop. [`SplitPolicy`] decides how a population
//! divides across the upstream branches of a confluence.
//!
//! Both are built once before a run and are read-only afterwards.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod barrier;
pub mod split;

pub use barrier::{attenuate, Attenuation, Barrier, BarrierIndex};
pub use split::{Allocation, Even, Persist, Proportional, SplitMode, SplitPolicy};
