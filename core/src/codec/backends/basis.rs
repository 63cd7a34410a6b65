//! codec/backends/basis.rs
//!
//! Basis Universal backend.
//!
//! Design notes:
//! - The `.basis` file header and the first slice description are parsed and
//!   CRC-checked here so corrupt input is rejected even without an engine.
//! - Output size is derived from the slice's original dimensions and the
//!   target format, and checked against the destination before transcoding.
//! - The actual transcode is done by a `BasisEngine`. `decompress` means
//!   "transcode to RGBA32".

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};

use crate::codec::error::BackendError;
use crate::codec::types::{Backend, CodecKind, CodecRequest, CodecResult, TargetFormat};
use crate::utils::crc16;

/// `"sB"` read as a little-endian u16.
pub const BASIS_SIGNATURE: u16 = 0x4273;
pub const BASIS_VERSION: u16 = 0x13;
pub const BASIS_HEADER_LEN: usize = 77;
pub const BASIS_SLICE_DESC_LEN: usize = 23;

/// Byte offsets inside the file header.
mod header_ofs {
    pub const SIG: usize            = 0;
    pub const VERSION: usize        = 2;
    pub const HEADER_SIZE: usize    = 4;
    pub const HEADER_CRC16: usize   = 6;
    pub const DATA_SIZE: usize      = 8;
    pub const DATA_CRC16: usize     = 12;
    pub const TOTAL_SLICES: usize   = 14;
    pub const TOTAL_IMAGES: usize   = 17;
    pub const TEX_FORMAT: usize     = 20;
    pub const SLICE_DESC_OFS: usize = 65;
}

/// Byte offsets inside one slice description.
mod slice_ofs {
    pub const IMAGE_INDEX: usize = 0;
    pub const LEVEL_INDEX: usize = 3;
    pub const ORIG_WIDTH: usize  = 5;
    pub const ORIG_HEIGHT: usize = 7;
}

/// Parsed `.basis` header plus the base image dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisFileInfo {
    pub version: u16,
    pub data_size: u32,
    pub total_slices: u32,
    pub total_images: u32,
    /// 0 = ETC1S, 1 = UASTC 4x4.
    pub tex_format: u8,
    pub width: u32,
    pub height: u32,
}

impl BasisFileInfo {
    pub fn parse(src: &[u8]) -> Result<Self, BackendError> {
        let corrupt = |reason: &str| BackendError::container(CodecKind::Basis, reason);

        if src.is_empty() {
            return Err(BackendError::EmptyInput { codec: CodecKind::Basis });
        }
        if src.len() < BASIS_HEADER_LEN {
            return Err(corrupt("truncated header"));
        }
        if LittleEndian::read_u16(&src[header_ofs::SIG..]) != BASIS_SIGNATURE {
            return Err(corrupt("bad signature"));
        }
        let version = LittleEndian::read_u16(&src[header_ofs::VERSION..]);
        if version != BASIS_VERSION {
            return Err(corrupt("unsupported version"));
        }
        let header_size = LittleEndian::read_u16(&src[header_ofs::HEADER_SIZE..]) as usize;
        if header_size != BASIS_HEADER_LEN {
            return Err(corrupt("unexpected header size"));
        }

        let header_crc = LittleEndian::read_u16(&src[header_ofs::HEADER_CRC16..]);
        if crc16(&src[header_ofs::DATA_SIZE..BASIS_HEADER_LEN]) != header_crc {
            return Err(corrupt("header checksum mismatch"));
        }

        let data_size = LittleEndian::read_u32(&src[header_ofs::DATA_SIZE..]);
        let data_end = BASIS_HEADER_LEN as u64 + data_size as u64;
        if data_size == 0 || data_end > src.len() as u64 {
            return Err(corrupt("data size out of range"));
        }
        let data = &src[BASIS_HEADER_LEN..data_end as usize];
        let data_crc = LittleEndian::read_u16(&src[header_ofs::DATA_CRC16..]);
        if crc16(data) != data_crc {
            return Err(corrupt("data checksum mismatch"));
        }

        let total_slices = LittleEndian::read_u24(&src[header_ofs::TOTAL_SLICES..]);
        let total_images = LittleEndian::read_u24(&src[header_ofs::TOTAL_IMAGES..]);
        if total_slices == 0 || total_images == 0 {
            return Err(corrupt("no slices"));
        }
        let tex_format = src[header_ofs::TEX_FORMAT];
        if tex_format > 1 {
            return Err(corrupt("unknown texture format"));
        }

        let slices_at = LittleEndian::read_u32(&src[header_ofs::SLICE_DESC_OFS..]) as u64;
        let slices_end = slices_at + total_slices as u64 * BASIS_SLICE_DESC_LEN as u64;
        if slices_at < BASIS_HEADER_LEN as u64 || slices_end > data_end {
            return Err(corrupt("slice descriptions out of range"));
        }

        let (width, height) = (0..total_slices as usize)
            .map(|i| {
                let at = slices_at as usize + i * BASIS_SLICE_DESC_LEN;
                &src[at..at + BASIS_SLICE_DESC_LEN]
            })
            .find(|s| {
                LittleEndian::read_u24(&s[slice_ofs::IMAGE_INDEX..]) == 0
                    && s[slice_ofs::LEVEL_INDEX] == 0
            })
            .map(|s| {
                (
                    LittleEndian::read_u16(&s[slice_ofs::ORIG_WIDTH..]) as u32,
                    LittleEndian::read_u16(&s[slice_ofs::ORIG_HEIGHT..]) as u32,
                )
            })
            .ok_or_else(|| corrupt("no base slice"))?;
        if width == 0 || height == 0 {
            return Err(corrupt("zero image dimensions"));
        }

        Ok(Self { version, data_size, total_slices, total_images, tex_format, width, height })
    }
}

fn output_len(info: &BasisFileInfo, target: TargetFormat) -> Result<usize, BackendError> {
    target
        .output_len(info.width, info.height)
        .ok_or_else(|| BackendError::container(CodecKind::Basis, "image dimensions overflow"))
}

/// Native Basis Universal transcoder.
pub trait BasisEngine: Send + Sync {
    fn supports(&self, target: TargetFormat) -> bool;

    /// Transcode image 0, level 0 into `dst` (exactly the target's output size).
    /// Returns bytes written.
    fn transcode(
        &self,
        info: &BasisFileInfo,
        source: &[u8],
        target: TargetFormat,
        dst: &mut [u8],
    ) -> Result<usize, String>;
}

#[derive(Default, Clone)]
pub struct BasisBackend {
    engine: Option<Arc<dyn BasisEngine>>,
}

impl BasisBackend {
    pub fn unavailable() -> Self {
        Self { engine: None }
    }

    pub fn with_engine(engine: Arc<dyn BasisEngine>) -> Self {
        Self { engine: Some(engine) }
    }
}

impl Backend for BasisBackend {
    fn kind(&self) -> CodecKind {
        CodecKind::Basis
    }

    fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    fn decompress(&self, request: &mut CodecRequest<'_, '_>) -> Result<CodecResult, BackendError> {
        self.transcode(request, TargetFormat::Rgba32)
    }

    fn transcode(
        &self,
        request: &mut CodecRequest<'_, '_>,
        target: TargetFormat,
    ) -> Result<CodecResult, BackendError> {
        let info = BasisFileInfo::parse(request.source())?;
        let engine = self
            .engine
            .as_ref()
            .ok_or(BackendError::Unavailable { codec: CodecKind::Basis })?;
        if !engine.supports(target) {
            return Err(BackendError::TargetFormat { raw: target as u16 as i64 });
        }

        let needed = output_len(&info, target)?;
        let capacity = request.capacity();
        if needed > capacity {
            return Err(BackendError::Capacity { required: Some(needed), capacity });
        }

        let (src, dst) = request.buffers_mut();
        let written = engine
            .transcode(&info, src, target, &mut dst[..needed])
            .map_err(|msg| BackendError::Engine { codec: CodecKind::Basis, msg })?;
        if written == 0 || written > needed {
            return Err(BackendError::Engine {
                codec: CodecKind::Basis,
                msg: format!("engine reported {} bytes for a {} byte image", written, needed),
            });
        }
        request.complete(written)
    }

    fn decoded_len(&self, source: &[u8]) -> Result<Option<usize>, BackendError> {
        let info = BasisFileInfo::parse(source)?;
        output_len(&info, TargetFormat::Rgba32).map(Some)
    }
}
