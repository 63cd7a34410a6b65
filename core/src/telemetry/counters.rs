//! telemetry/counters.rs
//! Mutable counters kept by the dispatch facade.
//!
//! Summary: one request either succeeds (bytes counted) or fails with exactly
//! one error kind. Converted into an immutable `DispatchSnapshot` on demand.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::codec::error::{CodecError, CodecStatus};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounters {
    pub requests: u64,
    pub successes: u64,
    pub unsupported_codec: u64,
    pub corrupt_input: u64,
    pub insufficient_capacity: u64,
    pub unsupported_target_format: u64,
    pub backend_unavailable: u64,
    pub invalid_handle: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl DispatchCounters {
    /// Record one successful request.
    ///
    /// - `src_len`: source bytes consumed
    /// - `written`: destination bytes produced
    pub fn record_success(&mut self, src_len: usize, written: usize) {
        self.requests += 1;
        self.successes += 1;
        self.bytes_in += src_len as u64;
        self.bytes_out += written as u64;
    }

    /// Record one failed request under its error kind.
    pub fn record_failure(&mut self, err: &CodecError) {
        self.requests += 1;
        match err.status() {
            CodecStatus::UnsupportedCodec => self.unsupported_codec += 1,
            CodecStatus::CorruptInput => self.corrupt_input += 1,
            CodecStatus::InsufficientCapacity => self.insufficient_capacity += 1,
            CodecStatus::UnsupportedTargetFormat => self.unsupported_target_format += 1,
            CodecStatus::BackendUnavailable => self.backend_unavailable += 1,
            CodecStatus::InvalidHandle => self.invalid_handle += 1,
        }
    }

    pub fn failures(&self) -> u64 {
        self.unsupported_codec
            + self.corrupt_input
            + self.insufficient_capacity
            + self.unsupported_target_format
            + self.backend_unavailable
            + self.invalid_handle
    }

    pub fn merge(&mut self, other: &DispatchCounters) {
        *self += other.clone();
    }
}

impl AddAssign for DispatchCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.requests                  += rhs.requests;
        self.successes                 += rhs.successes;
        self.unsupported_codec         += rhs.unsupported_codec;
        self.corrupt_input             += rhs.corrupt_input;
        self.insufficient_capacity     += rhs.insufficient_capacity;
        self.unsupported_target_format += rhs.unsupported_target_format;
        self.backend_unavailable       += rhs.backend_unavailable;
        self.invalid_handle            += rhs.invalid_handle;
        self.bytes_in                  += rhs.bytes_in;
        self.bytes_out                 += rhs.bytes_out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::types::CodecKind;

    #[test]
    fn every_request_is_counted_once() {
        let mut c = DispatchCounters::default();
        c.record_success(10, 40);
        c.record_failure(&CodecError::BackendUnavailable { codec: CodecKind::Basis });
        c.record_failure(&CodecError::InvalidHandle { what: "dictionary" });
        assert_eq!(c.requests, 3);
        assert_eq!(c.successes + c.failures(), c.requests);
        assert_eq!(c.backend_unavailable, 1);
        assert_eq!(c.invalid_handle, 1);
    }

    #[test]
    fn merge_adds_fields() {
        let mut a = DispatchCounters::default();
        a.record_success(1, 2);
        let mut b = DispatchCounters::default();
        b.record_success(3, 4);
        b.record_failure(&CodecError::unsupported(CodecKind::JpegXr));
        a.merge(&b);
        assert_eq!(a.requests, 3);
        assert_eq!(a.bytes_in, 4);
        assert_eq!(a.bytes_out, 6);
        assert_eq!(a.unsupported_codec, 1);
    }
}
