//! codec/backends/zstd.rs
//!
//! Zstd decompression backend over `zstd-safe`.
//!
//! Design notes:
//! - One-shot `decompress` uses a throwaway `DCtx`; callers that decode many
//!   frames create a `DecompressionContext` once and reuse it.
//! - Contexts and dictionaries are owned by their creator. Releasing empties
//!   the wrapper, so a second release or any later use is a `Handle` error.
//! - Raw zstd codes (`(size_t)-n`) stay in `BackendError::Zstd`; the facade
//!   decides what they mean for the caller.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};
use zstd_safe::{DCtx, DDict};

use crate::codec::error::BackendError;
use crate::codec::types::{Backend, CodecKind, CodecRequest, CodecResult};

/// zstd error numbers and the `(size_t)-n` encoding.
pub mod error_codes {
    pub const PREFIX_UNKNOWN: usize       = 10;
    pub const DICTIONARY_CORRUPTED: usize = 30;
    pub const MEMORY_ALLOCATION: usize    = 64;
    pub const DST_SIZE_TOO_SMALL: usize   = 70;
    pub const MAX_CODE: usize             = 120;

    /// Encode an error number as zstd does: `(size_t)-n`.
    pub const fn to_code(number: usize) -> usize {
        0usize.wrapping_sub(number)
    }

    pub const fn is_error(code: usize) -> bool {
        code > to_code(MAX_CODE)
    }

    /// Error number of `code`, or `None` if it is a regular size.
    pub const fn number(code: usize) -> Option<usize> {
        if is_error(code) {
            Some(0usize.wrapping_sub(code))
        } else {
            None
        }
    }
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}

fn zstd_error(code: usize) -> BackendError {
    BackendError::Zstd { code, name: zstd_safe::get_error_name(code) }
}

fn zstd_error_number(number: usize) -> BackendError {
    zstd_error(error_codes::to_code(number))
}

/// Caller-owned zstd decompression context.
pub struct DecompressionContext {
    id: u64,
    dctx: Option<DCtx<'static>>,
}

impl DecompressionContext {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_released(&self) -> bool {
        self.dctx.is_none()
    }

    fn live(&mut self) -> Result<&mut DCtx<'static>, BackendError> {
        self.dctx.as_mut().ok_or(BackendError::Handle { what: "context" })
    }
}

impl fmt::Debug for DecompressionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecompressionContext")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Caller-owned digested zstd dictionary.
pub struct DictionaryHandle {
    id: u64,
    dict_len: usize,
    ddict: Option<DDict<'static>>,
}

impl DictionaryHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Length of the dictionary buffer this handle was built from.
    pub fn dict_len(&self) -> usize {
        self.dict_len
    }

    pub fn is_released(&self) -> bool {
        self.ddict.is_none()
    }

    fn live(&self) -> Result<&DDict<'static>, BackendError> {
        self.ddict.as_ref().ok_or(BackendError::Handle { what: "dictionary" })
    }
}

impl fmt::Debug for DictionaryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryHandle")
            .field("id", &self.id)
            .field("dict_len", &self.dict_len)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Zstd backend. Stateless; all state lives in caller-owned handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZstdBackend;

impl ZstdBackend {
    pub fn new() -> Self {
        Self
    }

    /// Declared content size of the first frame in `src`, if any.
    pub fn frame_content_size(src: &[u8]) -> Option<u64> {
        zstd_safe::get_frame_content_size(src).ok().flatten()
    }

    /// Decoded size of every frame in `src` together, or `None` if any frame
    /// leaves its content size out.
    ///
    /// # Errors
    /// `BackendError::Zstd` if `src` is not a sequence of complete frames.
    pub fn total_content_size(src: &[u8]) -> Result<Option<u64>, BackendError> {
        let mut rest = src;
        let mut total = 0u64;
        while !rest.is_empty() {
            let frame_len = zstd_safe::find_frame_compressed_size(rest).map_err(zstd_error)?;
            if frame_len == 0 || frame_len > rest.len() {
                return Err(zstd_error_number(error_codes::PREFIX_UNKNOWN));
            }
            match zstd_safe::get_frame_content_size(rest) {
                Ok(Some(n)) => total = total.saturating_add(n),
                Ok(None) => return Ok(None),
                Err(_) => return Err(zstd_error_number(error_codes::PREFIX_UNKNOWN)),
            }
            rest = &rest[frame_len..];
        }
        Ok(Some(total))
    }

    /// # Errors
    /// `BackendError::Zstd` (memory_allocation) if zstd cannot allocate a context.
    pub fn create_context(&self) -> Result<DecompressionContext, BackendError> {
        let dctx = DCtx::try_create()
            .ok_or_else(|| zstd_error_number(error_codes::MEMORY_ALLOCATION))?;
        let ctx = DecompressionContext { id: next_id(), dctx: Some(dctx) };
        trace!(id = ctx.id, "zstd context created");
        Ok(ctx)
    }

    /// # Errors
    /// `BackendError::Handle` if the context was already released.
    pub fn release_context(&self, ctx: &mut DecompressionContext) -> Result<(), BackendError> {
        match ctx.dctx.take() {
            Some(dctx) => {
                drop(dctx);
                trace!(id = ctx.id, "zstd context released");
                Ok(())
            }
            None => {
                warn!(id = ctx.id, "zstd context released twice");
                Err(BackendError::Handle { what: "context" })
            }
        }
    }

    /// Digest `dict` into a reusable decompression dictionary.
    ///
    /// Buffers without the zstd dictionary magic are loaded as raw content.
    ///
    /// # Errors
    /// - `BackendError::EmptyInput` for an empty buffer.
    /// - `BackendError::Zstd` (dictionary_corrupted) if zstd rejects it.
    pub fn create_dictionary(&self, dict: &[u8]) -> Result<DictionaryHandle, BackendError> {
        if dict.is_empty() {
            return Err(BackendError::EmptyInput { codec: CodecKind::Zstd });
        }
        let ddict = DDict::try_create(dict)
            .ok_or_else(|| zstd_error_number(error_codes::DICTIONARY_CORRUPTED))?;
        let handle = DictionaryHandle { id: next_id(), dict_len: dict.len(), ddict: Some(ddict) };
        trace!(id = handle.id, dict_len = dict.len(), "zstd dictionary created");
        Ok(handle)
    }

    /// # Errors
    /// `BackendError::Handle` if the dictionary was already released.
    pub fn release_dictionary(&self, handle: &mut DictionaryHandle) -> Result<(), BackendError> {
        match handle.ddict.take() {
            Some(ddict) => {
                drop(ddict);
                trace!(id = handle.id, "zstd dictionary released");
                Ok(())
            }
            None => {
                warn!(id = handle.id, "zstd dictionary released twice");
                Err(BackendError::Handle { what: "dictionary" })
            }
        }
    }

    pub fn decompress_with_context(
        &self,
        ctx: &mut DecompressionContext,
        request: &mut CodecRequest<'_, '_>,
    ) -> Result<CodecResult, BackendError> {
        run(ctx.live()?, None, request)
    }

    pub fn decompress_with_dictionary(
        &self,
        ctx: &mut DecompressionContext,
        handle: &DictionaryHandle,
        request: &mut CodecRequest<'_, '_>,
    ) -> Result<CodecResult, BackendError> {
        let ddict = handle.live()?;
        run(ctx.live()?, Some(ddict), request)
    }
}

fn precheck(src: &[u8], capacity: usize) -> Result<(), BackendError> {
    if src.is_empty() {
        return Err(BackendError::EmptyInput { codec: CodecKind::Zstd });
    }
    if let Some(declared) = ZstdBackend::frame_content_size(src) {
        if declared > capacity as u64 {
            return Err(BackendError::Capacity {
                required: usize::try_from(declared).ok(),
                capacity,
            });
        }
    }
    Ok(())
}

fn run(
    dctx: &mut DCtx<'static>,
    ddict: Option<&DDict<'static>>,
    request: &mut CodecRequest<'_, '_>,
) -> Result<CodecResult, BackendError> {
    let capacity = request.capacity();
    let (src, dst) = request.buffers_mut();
    precheck(src, capacity)?;

    let written = match ddict {
        Some(d) => dctx.decompress_using_ddict(dst, src, d),
        None => dctx.decompress(dst, src),
    }
    .map_err(|code| match error_codes::number(code) {
        Some(error_codes::DST_SIZE_TOO_SMALL) => BackendError::Capacity { required: None, capacity },
        _ => zstd_error(code),
    })?;

    request.complete(written)
}

impl Backend for ZstdBackend {
    fn kind(&self) -> CodecKind {
        CodecKind::Zstd
    }

    fn is_available(&self) -> bool {
        true
    }

    fn decompress(&self, request: &mut CodecRequest<'_, '_>) -> Result<CodecResult, BackendError> {
        let mut ctx = self.create_context()?;
        run(ctx.live()?, None, request)
    }

    fn decoded_len(&self, source: &[u8]) -> Result<Option<usize>, BackendError> {
        if source.is_empty() {
            return Err(BackendError::EmptyInput { codec: CodecKind::Zstd });
        }
        let total = Self::total_content_size(source)?;
        Ok(total.map(|n| usize::try_from(n).unwrap_or(usize::MAX)))
    }

    fn as_zstd(&self) -> Option<&ZstdBackend> {
        Some(self)
    }
}
