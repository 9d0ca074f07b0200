//! Shared utilities.
//!
//! Content hashing for the asset map and run-once cells for async side effects.

pub mod flight;
pub mod hash;

#[cfg(test)]
pub mod testutil;
