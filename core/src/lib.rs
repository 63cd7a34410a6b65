//! geodecomp-core
//!
//! Codec registry, backends and dispatch facade for JPEG-XR, Basis Universal
//! and Zstandard payloads.
//! No raw pointers here; the C ABI lives in `geodecomp-ffi`.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod utils;

pub mod codec;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::backends::{
        BasisBackend, BasisEngine, BasisFileInfo, DecompressionContext, DictionaryHandle,
        JpegXrBackend, JxrEngine, JxrImageInfo, ZstdBackend,
    };
    pub use crate::codec::{
        Backend, BackendError, CodecError, CodecKind, CodecRegistry, CodecRequest, CodecResult,
        CodecStatus, Dispatcher, TargetFormat,
    };
    pub use crate::config::RegistryConfig;
    pub use crate::telemetry::DispatchSnapshot;
}
