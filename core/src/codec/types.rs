//! codec/types.rs
//! Codec identifiers, request/result types and the backend contract.
//!
//! Notes:
//! - `CodecKind` and `TargetFormat` carry stable raw ids that cross the C ABI.
//! - A `CodecRequest` is fixed at construction; backends may only write the
//!   destination bytes, never swap buffers or change the kind.
//! - `CodecResult` can only be produced through `CodecRequest::complete`, which
//!   enforces `bytes_written <= capacity`.

use std::fmt;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::codec::backends::ZstdBackend;
use crate::codec::error::BackendError;
use crate::constants::{codec_ids, target_ids};

/// Codec identifiers (registry keys).
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    JpegXr = codec_ids::JPEG_XR,
    Basis  = codec_ids::BASIS,
    Zstd   = codec_ids::ZSTD,
}

impl CodecKind {
    pub const ALL: [CodecKind; 3] = [CodecKind::JpegXr, CodecKind::Basis, CodecKind::Zstd];

    /// Resolve a raw id as passed over the C ABI.
    pub fn from_raw(raw: i64) -> Option<Self> {
        u16::try_from(raw).ok().and_then(|r| Self::try_from_primitive(r).ok())
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::JpegXr => "jpeg-xr",
            CodecKind::Basis => "basis",
            CodecKind::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Basis Universal transcoder output formats.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum TargetFormat {
    Etc1Rgb      = target_ids::ETC1_RGB,
    Etc2Rgba     = target_ids::ETC2_RGBA,
    Bc1Rgb       = target_ids::BC1_RGB,
    Bc3Rgba      = target_ids::BC3_RGBA,
    Bc4R         = target_ids::BC4_R,
    Bc5Rg        = target_ids::BC5_RG,
    Bc7Rgba      = target_ids::BC7_RGBA,
    Pvrtc1_4Rgb  = target_ids::PVRTC1_4_RGB,
    Pvrtc1_4Rgba = target_ids::PVRTC1_4_RGBA,
    Astc4x4Rgba  = target_ids::ASTC_4X4_RGBA,
    AtcRgb       = target_ids::ATC_RGB,
    AtcRgba      = target_ids::ATC_RGBA,
    Rgba32       = target_ids::RGBA32,
    Rgb565       = target_ids::RGB565,
    Bgr565       = target_ids::BGR565,
    Rgba4444     = target_ids::RGBA4444,
    Etc2EacR11   = target_ids::ETC2_EAC_R11,
    Etc2EacRg11  = target_ids::ETC2_EAC_RG11,
}

impl TargetFormat {
    /// Resolve a raw id as passed over the C ABI.
    pub fn from_raw(raw: i64) -> Option<Self> {
        u16::try_from(raw).ok().and_then(|r| Self::try_from_primitive(r).ok())
    }

    /// Bytes per 4x4 block, or `None` for uncompressed formats.
    pub fn bytes_per_block(self) -> Option<usize> {
        use TargetFormat::*;
        match self {
            Etc1Rgb | Bc1Rgb | Bc4R | Pvrtc1_4Rgb | Pvrtc1_4Rgba | AtcRgb | Etc2EacR11 => Some(8),
            Etc2Rgba | Bc3Rgba | Bc5Rg | Bc7Rgba | Astc4x4Rgba | AtcRgba | Etc2EacRg11 => Some(16),
            Rgba32 | Rgb565 | Bgr565 | Rgba4444 => None,
        }
    }

    /// Bytes per pixel for uncompressed formats.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            TargetFormat::Rgba32 => Some(4),
            TargetFormat::Rgb565 | TargetFormat::Bgr565 | TargetFormat::Rgba4444 => Some(2),
            _ => None,
        }
    }

    fn is_pvrtc1(self) -> bool {
        matches!(self, TargetFormat::Pvrtc1_4Rgb | TargetFormat::Pvrtc1_4Rgba)
    }

    /// Size of a transcoded `width x height` image in this format, or `None`
    /// if it does not fit in `usize`.
    ///
    /// PVRTC1 block grids are padded to a power of two, minimum 2x2 blocks.
    pub fn output_len(self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width as usize, height as usize);
        if let Some(bpp) = self.bytes_per_pixel() {
            return w.checked_mul(h)?.checked_mul(bpp);
        }
        let mut bx = w.div_ceil(4);
        let mut by = h.div_ceil(4);
        if self.is_pvrtc1() {
            bx = bx.checked_next_power_of_two()?.max(2);
            by = by.checked_next_power_of_two()?.max(2);
        }
        bx.checked_mul(by)?.checked_mul(self.bytes_per_block().unwrap_or(16))
    }
}

/// One decompress/transcode request.
///
/// Source length and destination capacity are those of the slices.
pub struct CodecRequest<'s, 'd> {
    kind: CodecKind,
    source: &'s [u8],
    destination: &'d mut [u8],
}

impl<'s, 'd> CodecRequest<'s, 'd> {
    pub fn new(kind: CodecKind, source: &'s [u8], destination: &'d mut [u8]) -> Self {
        Self { kind, source, destination }
    }

    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    pub fn source(&self) -> &[u8] {
        self.source
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn capacity(&self) -> usize {
        self.destination.len()
    }

    /// Source (read-only) and destination (writable) at once.
    pub fn buffers_mut(&mut self) -> (&[u8], &mut [u8]) {
        (self.source, &mut *self.destination)
    }

    /// Seal the request into its result.
    ///
    /// # Errors
    /// `BackendError::Capacity` if `bytes_written` exceeds the destination capacity.
    pub fn complete(&self, bytes_written: usize) -> Result<CodecResult, BackendError> {
        if bytes_written > self.capacity() {
            return Err(BackendError::Capacity {
                required: Some(bytes_written),
                capacity: self.capacity(),
            });
        }
        Ok(CodecResult { kind: self.kind, bytes_written, capacity: self.capacity() })
    }
}

impl fmt::Debug for CodecRequest<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRequest")
            .field("kind", &self.kind)
            .field("source_len", &self.source.len())
            .field("capacity", &self.destination.len())
            .finish()
    }
}

/// Outcome of a successful request. Failures travel as `Err(CodecError)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CodecResult {
    kind: CodecKind,
    bytes_written: usize,
    capacity: usize,
}

impl CodecResult {
    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    /// Bytes written (or transcoded size). Never exceeds `capacity()`.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Contract every codec backend implements.
pub trait Backend: Send + Sync {
    fn kind(&self) -> CodecKind;

    /// Whether the backend can service requests on this platform.
    fn is_available(&self) -> bool;

    /// Decompress `request.source()` into the request destination.
    fn decompress(&self, request: &mut CodecRequest<'_, '_>) -> Result<CodecResult, BackendError>;

    /// Transcode into a GPU-native format. Only Basis supports this.
    fn transcode(
        &self,
        _request: &mut CodecRequest<'_, '_>,
        target: TargetFormat,
    ) -> Result<CodecResult, BackendError> {
        Err(BackendError::TargetFormat { raw: target as u16 as i64 })
    }

    /// Decoded size declared by the source, if the format declares one.
    fn decoded_len(&self, source: &[u8]) -> Result<Option<usize>, BackendError>;

    fn as_zstd(&self) -> Option<&ZstdBackend> {
        None
    }
}
