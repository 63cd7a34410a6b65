//! codec/registry.rs
//! Codec registry: codec kind -> backend.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::codec::backends::{BasisBackend, JpegXrBackend, ZstdBackend};
use crate::codec::error::CodecError;
use crate::codec::types::{Backend, CodecKind};
use crate::config::RegistryConfig;

#[derive(Default, Clone)]
pub struct CodecRegistry {
    backends: BTreeMap<CodecKind, Arc<dyn Backend>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All three variants. JPEG-XR and Basis have no native engine here, so
    /// they resolve but report themselves unavailable.
    pub fn platform_default() -> Self {
        Self::from_config(&RegistryConfig::default())
    }

    /// Register the platform backends for every codec the config enables.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let mut registry = Self::new();
        for kind in CodecKind::ALL {
            if !config.is_enabled(kind) {
                continue;
            }
            let backend: Arc<dyn Backend> = match kind {
                CodecKind::JpegXr => Arc::new(JpegXrBackend::unavailable()),
                CodecKind::Basis => Arc::new(BasisBackend::unavailable()),
                CodecKind::Zstd => Arc::new(ZstdBackend::new()),
            };
            registry.register(backend);
        }
        registry
    }

    /// Register `backend`, replacing any backend of the same kind.
    /// Returns the replaced backend.
    pub fn register(&mut self, backend: Arc<dyn Backend>) -> Option<Arc<dyn Backend>> {
        let kind = backend.kind();
        debug!(codec = %kind, available = backend.is_available(), "backend registered");
        self.backends.insert(kind, backend)
    }

    pub fn unregister(&mut self, kind: CodecKind) -> Option<Arc<dyn Backend>> {
        self.backends.remove(&kind)
    }

    /// # Errors
    /// `CodecError::UnsupportedCodec` if nothing is registered for `kind`.
    pub fn resolve(&self, kind: CodecKind) -> Result<Arc<dyn Backend>, CodecError> {
        self.backends
            .get(&kind)
            .cloned()
            .ok_or_else(|| CodecError::unsupported(kind))
    }

    /// Registered and able to service requests on this platform.
    pub fn is_available(&self, kind: CodecKind) -> bool {
        self.backends.get(&kind).is_some_and(|b| b.is_available())
    }

    pub fn kinds(&self) -> Vec<CodecKind> {
        self.backends.keys().copied().collect()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.backends.iter().map(|(k, b)| (k, b.is_available())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_default_registers_all_kinds() {
        let registry = CodecRegistry::platform_default();
        assert_eq!(registry.kinds(), CodecKind::ALL.to_vec());
    }

    #[test]
    fn only_zstd_is_available_by_default() {
        let registry = CodecRegistry::platform_default();
        assert!(registry.is_available(CodecKind::Zstd));
        assert!(!registry.is_available(CodecKind::JpegXr));
        assert!(!registry.is_available(CodecKind::Basis));
    }

    #[test]
    fn resolve_unregistered_kind_fails() {
        let mut registry = CodecRegistry::platform_default();
        registry.unregister(CodecKind::Basis);
        let err = registry.resolve(CodecKind::Basis).err().unwrap();
        assert_eq!(err, CodecError::UnsupportedCodec { raw: CodecKind::Basis as u16 });
        assert!(!registry.is_available(CodecKind::Basis));
    }

    #[test]
    fn register_replaces_previous_backend() {
        let mut registry = CodecRegistry::new();
        assert!(registry.register(Arc::new(ZstdBackend::new())).is_none());
        assert!(registry.register(Arc::new(ZstdBackend::new())).is_some());
        assert_eq!(registry.kinds(), vec![CodecKind::Zstd]);
    }
}
