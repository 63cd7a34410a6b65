//! exports.rs
//! `extern "C"` texture entry points.
//!
//! Return conventions:
//! - `JPEGXR_Decompress`: bytes written (> 0), or a negative status.
//! - `BASIS_Transcode`: 1, with `*transcodedSize` set to bytes written, or a
//!   negative status.
//! - `GEODECOMP_IsCodecAvailable`: 1 or 0.
//!
//! Zero is never a success value, so an absent engine cannot pass for an
//! empty image.

#![allow(non_snake_case)]

use std::slice;

use geodecomp_core::codec::{CodecError, CodecKind, CodecRequest};
use libc::{c_int, c_void};

use crate::{dispatcher, guard, status_of, BoundaryStatus};

const INVALID_ARGUMENT: c_int = BoundaryStatus::InvalidArgument as c_int;
const PANIC: c_int = BoundaryStatus::Panic as c_int;

/// Borrow the caller's buffers, or `None` for null pointers / negative lengths.
///
/// # Safety
/// `src` must be readable for `src_len` bytes and `dst` writable for
/// `dst_len` bytes, and the two regions must not overlap.
unsafe fn buffers<'a>(
    src: *const u8,
    src_len: c_int,
    dst: *mut u8,
    dst_len: c_int,
) -> Option<(&'a [u8], &'a mut [u8])> {
    if src.is_null() || dst.is_null() {
        return None;
    }
    let src_len = usize::try_from(src_len).ok()?;
    let dst_len = usize::try_from(dst_len).ok()?;
    Some((slice::from_raw_parts(src, src_len), slice::from_raw_parts_mut(dst, dst_len)))
}

/// Decode a JPEG-XR image into `dst` as BGRA32.
///
/// # Safety
/// `source` must be readable for `srcLength` bytes, `dst` writable for
/// `dstLength` bytes, and the regions must not overlap.
#[no_mangle]
pub unsafe extern "C" fn JPEGXR_Decompress(
    source: *mut c_void,
    srcLength: c_int,
    dst: *mut c_void,
    dstLength: c_int,
) -> c_int {
    guard("JPEGXR_Decompress", PANIC, || {
        let Some((src, out)) = buffers(source as *const u8, srcLength, dst as *mut u8, dstLength)
        else {
            return INVALID_ARGUMENT;
        };
        let mut request = CodecRequest::new(CodecKind::JpegXr, src, out);
        match dispatcher().decompress(&mut request) {
            // bytes_written <= dstLength, so it fits.
            Ok(result) => result.bytes_written() as c_int,
            Err(err) => status_of(&err),
        }
    })
}

/// Transcode a `.basis` file into the GPU format `textureFormat`.
///
/// `*transcodedSize` is the capacity of `output` on entry and the bytes
/// written on success. On `InsufficientCapacity` it is set to the required
/// size when that is known.
///
/// # Safety
/// `source` must be readable for `srcLength` bytes, `transcodedSize` must
/// point to a valid `int`, and `output` must be writable for
/// `*transcodedSize` bytes without overlapping `source`.
#[no_mangle]
pub unsafe extern "C" fn BASIS_Transcode(
    source: *mut c_void,
    srcLength: c_int,
    textureFormat: c_int,
    output: *mut u8,
    transcodedSize: *mut c_int,
) -> c_int {
    guard("BASIS_Transcode", PANIC, || {
        if transcodedSize.is_null() {
            return INVALID_ARGUMENT;
        }
        let capacity = *transcodedSize;
        let Some((src, out)) = buffers(source as *const u8, srcLength, output, capacity) else {
            return INVALID_ARGUMENT;
        };
        let mut request = CodecRequest::new(CodecKind::Basis, src, out);
        match dispatcher().transcode(&mut request, textureFormat as i64) {
            Ok(result) => {
                *transcodedSize = result.bytes_written() as c_int;
                1
            }
            Err(err) => {
                if let CodecError::InsufficientCapacity { required: Some(n), .. } = &err {
                    if let Ok(n) = c_int::try_from(*n) {
                        *transcodedSize = n;
                    }
                }
                status_of(&err)
            }
        }
    })
}

/// 1 if `codecKind` is registered and has a working engine, else 0.
#[no_mangle]
pub extern "C" fn GEODECOMP_IsCodecAvailable(codecKind: c_int) -> c_int {
    guard("GEODECOMP_IsCodecAvailable", 0, || {
        CodecKind::from_raw(codecKind as i64)
            .map(|kind| dispatcher().is_available(kind) as c_int)
            .unwrap_or(0)
    })
}
