//! codec/backends/jpegxr.rs
//!
//! JPEG-XR backend: container validation plus a pluggable pixel decoder.
//!
//! The container is TIFF-like: `"II"`, `0xBC`, a version byte, the offset of
//! the first IFD, then 12-byte IFD entries. Only the tags needed to size and
//! locate the coded image are read. Pixel decoding is done by a `JxrEngine`;
//! without one the backend reports itself unavailable.

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};

use crate::codec::error::BackendError;
use crate::codec::types::{Backend, CodecKind, CodecRequest, CodecResult};
use crate::constants::JXR_OUTPUT_BPP;

const HEADER_LEN: usize = 8;
const IFD_ENTRY_LEN: usize = 12;
const PIXEL_FORMAT_LEN: usize = 16;

pub mod tags {
    pub const PIXEL_FORMAT: u16     = 0xBC01;
    pub const IMAGE_WIDTH: u16      = 0xBC80;
    pub const IMAGE_HEIGHT: u16     = 0xBC81;
    pub const IMAGE_OFFSET: u16     = 0xBCC0;
    pub const IMAGE_BYTE_COUNT: u16 = 0xBCC1;
}

/// What the container says about the coded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JxrImageInfo {
    pub version: u8,
    pub width: u32,
    pub height: u32,
    pub pixel_format: [u8; PIXEL_FORMAT_LEN],
    pub image_offset: u32,
    pub image_byte_count: u32,
}

impl JxrImageInfo {
    /// Size of the BGRA32 decoder output.
    ///
    /// # Errors
    /// `BackendError::Container` if the dimensions do not fit in `usize`.
    pub fn output_len(&self) -> Result<usize, BackendError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(JXR_OUTPUT_BPP))
            .ok_or_else(|| BackendError::container(CodecKind::JpegXr, "image dimensions overflow"))
    }

    /// The coded image bytes inside `source`.
    pub fn image_bytes<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        let start = self.image_offset as usize;
        &source[start..start + self.image_byte_count as usize]
    }

    /// Parse and bounds-check a JPEG-XR container.
    pub fn parse(src: &[u8]) -> Result<Self, BackendError> {
        let corrupt = |reason: &str| BackendError::container(CodecKind::JpegXr, reason);

        if src.is_empty() {
            return Err(BackendError::EmptyInput { codec: CodecKind::JpegXr });
        }
        if src.len() < HEADER_LEN {
            return Err(corrupt("truncated header"));
        }
        if &src[0..2] != b"II" || src[2] != 0xBC {
            return Err(corrupt("bad signature"));
        }
        let version = src[3];
        if version > 1 {
            return Err(corrupt("unsupported version"));
        }

        let ifd = LittleEndian::read_u32(&src[4..8]) as usize;
        if ifd < HEADER_LEN || ifd + 2 > src.len() {
            return Err(corrupt("IFD offset out of range"));
        }
        let count = LittleEndian::read_u16(&src[ifd..ifd + 2]) as usize;
        let entries_end = ifd + 2 + count * IFD_ENTRY_LEN;
        if entries_end > src.len() {
            return Err(corrupt("IFD entries truncated"));
        }

        let mut width = None;
        let mut height = None;
        let mut pixel_format = None;
        let mut image_offset = None;
        let mut image_byte_count = None;

        for i in 0..count {
            let e = &src[ifd + 2 + i * IFD_ENTRY_LEN..ifd + 2 + (i + 1) * IFD_ENTRY_LEN];
            let tag = LittleEndian::read_u16(&e[0..2]);
            let value = LittleEndian::read_u32(&e[8..12]);
            match tag {
                tags::IMAGE_WIDTH => width = Some(value),
                tags::IMAGE_HEIGHT => height = Some(value),
                tags::IMAGE_OFFSET => image_offset = Some(value),
                tags::IMAGE_BYTE_COUNT => image_byte_count = Some(value),
                tags::PIXEL_FORMAT => {
                    let at = value as usize;
                    let guid = src
                        .get(at..at + PIXEL_FORMAT_LEN)
                        .ok_or_else(|| corrupt("pixel format out of range"))?;
                    let mut buf = [0u8; PIXEL_FORMAT_LEN];
                    buf.copy_from_slice(guid);
                    pixel_format = Some(buf);
                }
                _ => {}
            }
        }

        let width = width.filter(|w| *w > 0).ok_or_else(|| corrupt("missing image width"))?;
        let height = height.filter(|h| *h > 0).ok_or_else(|| corrupt("missing image height"))?;
        let pixel_format = pixel_format.ok_or_else(|| corrupt("missing pixel format"))?;
        let image_offset = image_offset.ok_or_else(|| corrupt("missing image offset"))?;
        let image_byte_count = image_byte_count
            .filter(|n| *n > 0)
            .ok_or_else(|| corrupt("missing image byte count"))?;

        let end = image_offset as u64 + image_byte_count as u64;
        if end > src.len() as u64 {
            return Err(corrupt("image data out of range"));
        }

        Ok(Self { version, width, height, pixel_format, image_offset, image_byte_count })
    }
}

/// Native JPEG-XR pixel decoder.
pub trait JxrEngine: Send + Sync {
    /// Decode the coded image into `dst` as BGRA32. `dst` is exactly
    /// `info.output_len()` bytes. Returns bytes written.
    fn decode(&self, info: &JxrImageInfo, coded: &[u8], dst: &mut [u8]) -> Result<usize, String>;
}

#[derive(Default, Clone)]
pub struct JpegXrBackend {
    engine: Option<Arc<dyn JxrEngine>>,
}

impl JpegXrBackend {
    /// Backend with no engine: validates input, then reports unavailable.
    pub fn unavailable() -> Self {
        Self { engine: None }
    }

    pub fn with_engine(engine: Arc<dyn JxrEngine>) -> Self {
        Self { engine: Some(engine) }
    }
}

impl Backend for JpegXrBackend {
    fn kind(&self) -> CodecKind {
        CodecKind::JpegXr
    }

    fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    fn decompress(&self, request: &mut CodecRequest<'_, '_>) -> Result<CodecResult, BackendError> {
        let info = JxrImageInfo::parse(request.source())?;
        let engine = self
            .engine
            .as_ref()
            .ok_or(BackendError::Unavailable { codec: CodecKind::JpegXr })?;

        let needed = info.output_len()?;
        let capacity = request.capacity();
        if needed > capacity {
            return Err(BackendError::Capacity { required: Some(needed), capacity });
        }

        let (src, dst) = request.buffers_mut();
        let written = engine
            .decode(&info, info.image_bytes(src), &mut dst[..needed])
            .map_err(|msg| BackendError::Engine { codec: CodecKind::JpegXr, msg })?;
        if written == 0 || written > needed {
            return Err(BackendError::Engine {
                codec: CodecKind::JpegXr,
                msg: format!("engine reported {} bytes for a {} byte image", written, needed),
            });
        }
        request.complete(written)
    }

    fn decoded_len(&self, source: &[u8]) -> Result<Option<usize>, BackendError> {
        let info = JxrImageInfo::parse(source)?;
        info.output_len().map(Some)
    }
}
