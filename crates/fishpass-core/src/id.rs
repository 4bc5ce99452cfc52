//! Strongly-typed identifiers.
//!
//! Table identifiers ([`ReachId`], [`BarrierId`], [`OriginId`],
//! [`WatershedId`]) are opaque strings taken verbatim from the input
//! tables. [`ReachIndex`] is the dense position of a reach inside a
//! built network and is only meaningful for the network that issued it.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(v: &str) -> Self {
                Self(v.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(v: String) -> Self {
                Self(v)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifies a stream reach (graph node).
    ReachId
}

string_id! {
    /// Identifies a passage barrier (dam, culvert, beaver dam).
    BarrierId
}

string_id! {
    /// Identifies an origin population.
    ///
    /// Origins discovered from main stems use their entry reach's id.
    OriginId
}

string_id! {
    /// Identifies a watershed (hydrologic unit grouping reaches).
    WatershedId
}

impl From<&ReachId> for OriginId {
    fn from(v: &ReachId) -> Self {
        Self(v.0.clone())
    }
}

/// Dense index of a reach within a built network.
///
/// `ReachIndex(n)` is the n-th reach of the reach table, after
/// validation. Indices are stable for the lifetime of the network
/// and are not portable across networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReachIndex(pub u32);

impl ReachIndex {
    /// The index as a `usize`, for slice addressing.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ReachIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ReachIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
