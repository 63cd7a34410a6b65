//! geodecomp-ffi
//!
//! C ABI over geodecomp-core.
//!
//! Notes:
//! - Exports the texture entry points (`JPEGXR_Decompress`, `BASIS_Transcode`)
//!   and the availability predicate. The `ZSTD_*` symbols of the same C
//!   surface are libzstd's own, carried into this library by `zstd-safe`.
//! - All exports share one process-wide `Dispatcher`, built on first use.
//! - No panic crosses the boundary; every export runs under `guard`.

use std::env;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use geodecomp_core::codec::{CodecError, Dispatcher};
use geodecomp_core::config::{ConfigError, RegistryConfig};
use tracing::{debug, error, warn};

mod exports;

pub use exports::*;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "GEODECOMP_CONFIG";

/// Status codes that only exist at the C boundary. They extend the
/// `CodecStatus` range (-1..=-6) used by the core.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryStatus {
    InvalidArgument = -7,
    Panic           = -8,
}

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

fn load_config() -> Result<RegistryConfig, ConfigError> {
    match env::var_os(CONFIG_ENV) {
        Some(path) => RegistryConfig::from_path(path),
        None => Ok(RegistryConfig::default()),
    }
}

fn build_dispatcher() -> Dispatcher {
    match load_config().and_then(Dispatcher::from_config) {
        Ok(dispatcher) => {
            debug!(config = ?dispatcher.config(), "dispatcher ready");
            dispatcher
        }
        Err(err) => {
            warn!(error = %err, "config rejected, using defaults");
            Dispatcher::platform_default()
        }
    }
}

/// Install `dispatcher` as the one behind every export, e.g. with engines
/// registered. Must run before the first export call; afterwards the
/// dispatcher is fixed and `dispatcher` is handed back.
pub fn install_dispatcher(dispatcher: Dispatcher) -> Result<(), Dispatcher> {
    DISPATCHER.set(dispatcher)?;
    debug!("dispatcher installed by host");
    Ok(())
}

/// The dispatcher behind every export.
pub fn dispatcher() -> &'static Dispatcher {
    DISPATCHER.get_or_init(build_dispatcher)
}

pub(crate) fn status_of(err: &CodecError) -> i32 {
    err.status() as i32
}

/// Run `f`, turning a panic into `on_panic`.
pub(crate) fn guard<T>(export: &'static str, on_panic: T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error!(export, "panic caught at C boundary");
            on_panic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_passes_values_through() {
        assert_eq!(guard("test", -1, || 42), 42);
    }

    #[test]
    fn guard_catches_panics() {
        let code = guard("test", BoundaryStatus::Panic as i32, || -> i32 { panic!("boom") });
        assert_eq!(code, -8);
    }

    #[test]
    fn boundary_codes_do_not_overlap_core_codes() {
        use geodecomp_core::codec::CodecStatus;
        let core = [
            CodecStatus::UnsupportedCodec,
            CodecStatus::CorruptInput,
            CodecStatus::InsufficientCapacity,
            CodecStatus::UnsupportedTargetFormat,
            CodecStatus::BackendUnavailable,
            CodecStatus::InvalidHandle,
        ];
        for s in core {
            assert_ne!(s as i32, BoundaryStatus::InvalidArgument as i32);
            assert_ne!(s as i32, BoundaryStatus::Panic as i32);
        }
    }
}
