//! codec/mod.rs
//! Pluggable decompression / transcoding backends.
//!
//! Notes:
//! - Registry resolves codec kinds to `Backend` implementations.
//! - Backends report faults as `BackendError`; the dispatch facade is the
//!   only place they become `CodecError`.
//! - A backend that is registered but has no native engine says so through
//!   `is_available()` and `BackendUnavailable`, never through a zero-length
//!   success.

pub mod backends;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod types;

pub use dispatch::*;
pub use error::*;
pub use registry::*;
pub use types::*;
