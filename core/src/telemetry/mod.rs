//! telemetry/mod.rs
//! Dispatch counters and immutable snapshots.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
