//! codec/error.rs
//! Shared error taxonomy (`CodecError`) and backend-local faults (`BackendError`).
//!
//! Backends report what went wrong in their own terms; the dispatch facade
//! folds every `BackendError` into exactly one `CodecError` before a caller
//! sees it.

use thiserror::Error;

use crate::codec::types::CodecKind;
use crate::utils::enum_name_or_hex;

/// Stable status codes, mirrored by the C ABI (negative on failure).
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CodecStatus {
    UnsupportedCodec        = -1,
    CorruptInput            = -2,
    InsufficientCapacity    = -3,
    UnsupportedTargetFormat = -4,
    BackendUnavailable      = -5,
    InvalidHandle           = -6,
}

fn codec_name(raw: &u16) -> String {
    enum_name_or_hex::<CodecKind>(*raw)
}

fn required_text(required: &Option<usize>) -> String {
    match required {
        Some(n) => n.to_string(),
        None => "more".into(),
    }
}

/// Errors returned by the dispatch facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unsupported codec: {}", codec_name(.raw))]
    UnsupportedCodec { raw: u16 },

    #[error("corrupt {codec} input: {reason}")]
    CorruptInput { codec: CodecKind, reason: String },

    #[error("insufficient capacity: {} bytes required, {capacity} available", required_text(.required))]
    InsufficientCapacity { required: Option<usize>, capacity: usize },

    #[error("unsupported target format: {raw}")]
    UnsupportedTargetFormat { raw: i64 },

    #[error("{codec} backend unavailable on this platform")]
    BackendUnavailable { codec: CodecKind },

    #[error("invalid or released {what} handle")]
    InvalidHandle { what: &'static str },
}

impl CodecError {
    pub fn unsupported(kind: CodecKind) -> Self {
        CodecError::UnsupportedCodec { raw: kind as u16 }
    }

    pub fn status(&self) -> CodecStatus {
        match self {
            CodecError::UnsupportedCodec { .. } => CodecStatus::UnsupportedCodec,
            CodecError::CorruptInput { .. } => CodecStatus::CorruptInput,
            CodecError::InsufficientCapacity { .. } => CodecStatus::InsufficientCapacity,
            CodecError::UnsupportedTargetFormat { .. } => CodecStatus::UnsupportedTargetFormat,
            CodecError::BackendUnavailable { .. } => CodecStatus::BackendUnavailable,
            CodecError::InvalidHandle { .. } => CodecStatus::InvalidHandle,
        }
    }
}

/// Backend-specific faults, before normalization.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{codec}: empty input")]
    EmptyInput { codec: CodecKind },

    #[error("{codec} container: {reason}")]
    Container { codec: CodecKind, reason: String },

    /// Raw zstd error code (`(size_t)-n`).
    #[error("zstd: {name}")]
    Zstd { code: usize, name: &'static str },

    #[error("destination holds {capacity} bytes, {} required", required_text(.required))]
    Capacity { required: Option<usize>, capacity: usize },

    #[error("target format {raw} not supported")]
    TargetFormat { raw: i64 },

    #[error("{codec} engine not present")]
    Unavailable { codec: CodecKind },

    #[error("{codec} engine failed: {msg}")]
    Engine { codec: CodecKind, msg: String },

    #[error("stale or released {what} handle")]
    Handle { what: &'static str },
}

impl BackendError {
    pub fn container(codec: CodecKind, reason: impl Into<String>) -> Self {
        BackendError::Container { codec, reason: reason.into() }
    }
}
