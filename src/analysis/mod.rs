//! Analysis modules.
//!
//! Aggregation queries over the immutable funding table.

pub mod aggregator;

pub use aggregator::*;
