//! telemetry/snapshot.rs
//!
//! Immutable view of the dispatch counters.

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::DispatchCounters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    pub counters: DispatchCounters,
    pub failures: u64,
    /// `bytes_out / bytes_in`; 0.0 before any successful request.
    pub expansion_ratio: f64,
}

impl DispatchSnapshot {
    pub fn from(counters: &DispatchCounters) -> Self {
        let expansion_ratio = if counters.bytes_in > 0 {
            counters.bytes_out as f64 / counters.bytes_in as f64
        } else {
            0.0
        };
        Self {
            counters: counters.clone(),
            failures: counters.failures(),
            expansion_ratio,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
