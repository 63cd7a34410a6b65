/// Stable codec IDs (u16) shared with the C ABI.
pub mod codec_ids {
    pub const JPEG_XR: u16 = 0x0001;
    pub const BASIS: u16   = 0x0002;
    pub const ZSTD: u16    = 0x0003;
}

/// Stable Basis Universal transcoder target ids (`transcoder_texture_format`).
pub mod target_ids {
    pub const ETC1_RGB: u16       = 0;
    pub const ETC2_RGBA: u16      = 1;
    pub const BC1_RGB: u16        = 2;
    pub const BC3_RGBA: u16       = 3;
    pub const BC4_R: u16          = 4;
    pub const BC5_RG: u16         = 5;
    pub const BC7_RGBA: u16       = 6;
    pub const PVRTC1_4_RGB: u16   = 8;
    pub const PVRTC1_4_RGBA: u16  = 9;
    pub const ASTC_4X4_RGBA: u16  = 10;
    pub const ATC_RGB: u16        = 11;
    pub const ATC_RGBA: u16       = 12;
    pub const RGBA32: u16         = 13;
    pub const RGB565: u16         = 14;
    pub const BGR565: u16         = 15;
    pub const RGBA4444: u16       = 16;
    pub const ETC2_EAC_R11: u16   = 20;
    pub const ETC2_EAC_RG11: u16  = 21;
}

/// Default sanity bound on a single source buffer (256 MiB).
pub const DEFAULT_MAX_SOURCE_LEN: usize = 256 * 1024 * 1024;

/// Default sanity bound on a single destination buffer (1 GiB).
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 1024 * 1024 * 1024;

/// Bytes per pixel of the JPEG-XR decoder output (BGRA32).
pub const JXR_OUTPUT_BPP: usize = 4;
