//! codec/backends/mod.rs
//! Concrete `Backend` variants.

pub mod basis;
pub mod jpegxr;
pub mod zstd;

pub use basis::*;
pub use jpegxr::*;
pub use zstd::{DecompressionContext, DictionaryHandle, ZstdBackend};
