//! codec/dispatch.rs
//! Dispatch facade: the single entry point for callers.
//!
//! Flow per request:
//! 1. source checks (empty, size limit) -> `CorruptInput`
//! 2. registry lookup -> `UnsupportedCodec`
//! 3. availability -> `BackendUnavailable`
//! 4. backend call; any `BackendError` is normalized into `CodecError`
//!
//! Every data request is counted exactly once, success or failure.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::codec::backends::zstd::error_codes;
use crate::codec::backends::{DecompressionContext, DictionaryHandle, ZstdBackend};
use crate::codec::error::{BackendError, CodecError};
use crate::codec::registry::CodecRegistry;
use crate::codec::types::{Backend, CodecKind, CodecRequest, CodecResult, TargetFormat};
use crate::config::{ConfigError, RegistryConfig};
use crate::telemetry::{DispatchCounters, DispatchSnapshot};

/// Initial guess for frames that do not declare their decoded size.
const UNDECLARED_MIN_GUESS: usize = 64 * 1024;

/// Fold a backend fault into the shared taxonomy.
pub fn normalize(err: BackendError) -> CodecError {
    match err {
        BackendError::EmptyInput { codec } => CodecError::CorruptInput {
            codec,
            reason: "empty input".into(),
        },
        BackendError::Container { codec, reason } => CodecError::CorruptInput { codec, reason },
        // dstSize_tooSmall never gets here: the zstd backend turns it into
        // `BackendError::Capacity` while it still knows the capacity.
        BackendError::Zstd { code, name } => match error_codes::number(code) {
            Some(error_codes::MEMORY_ALLOCATION) => CodecError::BackendUnavailable {
                codec: CodecKind::Zstd,
            },
            _ => CodecError::CorruptInput { codec: CodecKind::Zstd, reason: name.into() },
        },
        BackendError::Capacity { required, capacity } => {
            CodecError::InsufficientCapacity { required, capacity }
        }
        BackendError::TargetFormat { raw } => CodecError::UnsupportedTargetFormat { raw },
        BackendError::Unavailable { codec } => CodecError::BackendUnavailable { codec },
        BackendError::Engine { codec, msg } => CodecError::CorruptInput { codec, reason: msg },
        BackendError::Handle { what } => CodecError::InvalidHandle { what },
    }
}

pub struct Dispatcher {
    registry: CodecRegistry,
    config: RegistryConfig,
    counters: Mutex<DispatchCounters>,
}

impl Dispatcher {
    pub fn new(registry: CodecRegistry, config: RegistryConfig) -> Self {
        Self { registry, config, counters: Mutex::new(DispatchCounters::default()) }
    }

    pub fn from_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(CodecRegistry::from_config(&config), config))
    }

    pub fn platform_default() -> Self {
        Self::new(CodecRegistry::platform_default(), RegistryConfig::default())
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn is_available(&self, kind: CodecKind) -> bool {
        self.registry.is_available(kind)
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot::from(&self.counters.lock())
    }

    fn check_source(&self, kind: CodecKind, src: &[u8]) -> Result<(), CodecError> {
        if src.is_empty() {
            return Err(CodecError::CorruptInput { codec: kind, reason: "empty input".into() });
        }
        if src.len() > self.config.max_source_len {
            return Err(CodecError::CorruptInput {
                codec: kind,
                reason: format!("source of {} bytes exceeds limit {}", src.len(), self.config.max_source_len),
            });
        }
        Ok(())
    }

    fn backend(&self, kind: CodecKind) -> Result<Arc<dyn Backend>, CodecError> {
        let backend = self.registry.resolve(kind)?;
        if !backend.is_available() {
            return Err(CodecError::BackendUnavailable { codec: kind });
        }
        Ok(backend)
    }

    fn with_zstd<T>(
        &self,
        f: impl FnOnce(&ZstdBackend) -> Result<T, BackendError>,
    ) -> Result<T, CodecError> {
        let backend = self.backend(CodecKind::Zstd)?;
        let zstd = backend
            .as_zstd()
            .ok_or(CodecError::BackendUnavailable { codec: CodecKind::Zstd })?;
        f(zstd).map_err(normalize)
    }

    fn record(
        &self,
        kind: CodecKind,
        src_len: usize,
        outcome: Result<CodecResult, CodecError>,
    ) -> Result<CodecResult, CodecError> {
        let mut counters = self.counters.lock();
        match &outcome {
            Ok(result) => {
                debug_assert!(result.bytes_written() <= result.capacity());
                counters.record_success(src_len, result.bytes_written());
                trace!(codec = %kind, src_len, written = result.bytes_written(), "request ok");
            }
            Err(err) => {
                counters.record_failure(err);
                debug!(codec = %kind, src_len, error = %err, "request failed");
            }
        }
        outcome
    }

    fn decompress_unrecorded(&self, request: &mut CodecRequest<'_, '_>) -> Result<CodecResult, CodecError> {
        self.check_source(request.kind(), request.source())?;
        let backend = self.backend(request.kind())?;
        backend.decompress(request).map_err(normalize)
    }

    /// Decompress `request.source()` with the backend registered for its kind.
    pub fn decompress(&self, request: &mut CodecRequest<'_, '_>) -> Result<CodecResult, CodecError> {
        let outcome = self.decompress_unrecorded(request);
        self.record(request.kind(), request.source_len(), outcome)
    }

    /// Transcode to the GPU format with raw id `target` (as passed over the C ABI).
    pub fn transcode(
        &self,
        request: &mut CodecRequest<'_, '_>,
        target: i64,
    ) -> Result<CodecResult, CodecError> {
        let outcome = self.transcode_unrecorded(request, target);
        self.record(request.kind(), request.source_len(), outcome)
    }

    fn transcode_unrecorded(
        &self,
        request: &mut CodecRequest<'_, '_>,
        target: i64,
    ) -> Result<CodecResult, CodecError> {
        self.check_source(request.kind(), request.source())?;
        let backend = self.backend(request.kind())?;
        let format = TargetFormat::from_raw(target)
            .ok_or(CodecError::UnsupportedTargetFormat { raw: target })?;
        backend.transcode(request, format).map_err(normalize)
    }

    /// Decompress into a freshly allocated buffer of exactly the decoded size.
    ///
    /// Frames that do not declare their size are retried with a doubling
    /// buffer up to `max_output_len`.
    pub fn decompress_to_vec(&self, kind: CodecKind, src: &[u8]) -> Result<Vec<u8>, CodecError> {
        let (outcome, out) = match self.decompress_to_vec_unrecorded(kind, src) {
            Ok((result, out)) => (Ok(result), out),
            Err(err) => (Err(err), Vec::new()),
        };
        self.record(kind, src.len(), outcome)?;
        Ok(out)
    }

    fn decompress_to_vec_unrecorded(
        &self,
        kind: CodecKind,
        src: &[u8],
    ) -> Result<(CodecResult, Vec<u8>), CodecError> {
        let max = self.config.max_output_len;
        self.check_source(kind, src)?;
        let backend = self.backend(kind)?;
        let declared = backend.decoded_len(src).map_err(normalize)?;
        if let Some(len) = declared {
            if len > max {
                return Err(CodecError::InsufficientCapacity { required: Some(len), capacity: max });
            }
        }

        let mut guess = declared
            .unwrap_or_else(|| src.len().saturating_mul(4).max(UNDECLARED_MIN_GUESS).min(max));
        loop {
            let mut out = vec![0u8; guess];
            let mut request = CodecRequest::new(kind, src, &mut out);
            match backend.decompress(&mut request).map_err(normalize) {
                Ok(result) => {
                    out.truncate(result.bytes_written());
                    return Ok((result, out));
                }
                Err(CodecError::InsufficientCapacity { .. }) if declared.is_none() && guess < max => {
                    guess = guess.saturating_mul(2).min(max);
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn create_context(&self) -> Result<DecompressionContext, CodecError> {
        self.with_zstd(|z| z.create_context())
    }

    pub fn release_context(&self, ctx: &mut DecompressionContext) -> Result<(), CodecError> {
        self.with_zstd(|z| z.release_context(ctx))
    }

    pub fn create_dictionary(&self, dict: &[u8]) -> Result<DictionaryHandle, CodecError> {
        self.with_zstd(|z| z.create_dictionary(dict))
    }

    pub fn release_dictionary(&self, handle: &mut DictionaryHandle) -> Result<(), CodecError> {
        self.with_zstd(|z| z.release_dictionary(handle))
    }

    /// Decompress one zstd frame reusing `ctx`.
    pub fn decompress_with_context(
        &self,
        ctx: &mut DecompressionContext,
        request: &mut CodecRequest<'_, '_>,
    ) -> Result<CodecResult, CodecError> {
        let outcome = self
            .check_zstd_request(request)
            .and_then(|_| self.with_zstd(|z| z.decompress_with_context(ctx, request)));
        self.record(CodecKind::Zstd, request.source_len(), outcome)
    }

    /// Decompress one zstd frame reusing `ctx` and the digested dictionary.
    pub fn decompress_with_dictionary(
        &self,
        ctx: &mut DecompressionContext,
        handle: &DictionaryHandle,
        request: &mut CodecRequest<'_, '_>,
    ) -> Result<CodecResult, CodecError> {
        let outcome = self
            .check_zstd_request(request)
            .and_then(|_| self.with_zstd(|z| z.decompress_with_dictionary(ctx, handle, request)));
        self.record(CodecKind::Zstd, request.source_len(), outcome)
    }

    fn check_zstd_request(&self, request: &CodecRequest<'_, '_>) -> Result<(), CodecError> {
        if request.kind() != CodecKind::Zstd {
            return Err(CodecError::unsupported(request.kind()));
        }
        self.check_source(CodecKind::Zstd, request.source())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::platform_default()
    }
}
