//! Provider registry: the primitive provider and key codec used for each
//! algorithm family.

use crate::{Error, Result};
use accord_crypto::{native_provider, AlgorithmFamily, KeyCodec, PrimitiveProvider, StandardKeyCodec};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Maps algorithm families to providers and codecs.
///
/// Engines look up their provider and codec once, at construction. The
/// process-wide default from [`ProviderRegistry::global`] carries the native
/// providers; build a custom registry and pass it to
/// `Initiator::with_registry` / `Responder::with_registry` to substitute one.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<AlgorithmFamily, Arc<dyn PrimitiveProvider>>,
    codecs: HashMap<AlgorithmFamily, Arc<dyn KeyCodec>>,
}

impl ProviderRegistry {
    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
            codecs: HashMap::new(),
        }
    }

    /// Registry with the native provider and standard codec for every family.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        let codec: Arc<dyn KeyCodec> = Arc::new(StandardKeyCodec);
        for family in AlgorithmFamily::ALL {
            registry.register(native_provider(family));
            registry.register_codec(family, Arc::clone(&codec));
        }
        registry
    }

    /// Process-wide default registry.
    pub fn global() -> Arc<ProviderRegistry> {
        static GLOBAL: OnceLock<Arc<ProviderRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ProviderRegistry::with_defaults())))
    }

    /// Register `provider` for the family it reports, returning the one it replaces.
    pub fn register(
        &mut self,
        provider: Arc<dyn PrimitiveProvider>,
    ) -> Option<Arc<dyn PrimitiveProvider>> {
        self.providers.insert(provider.family(), provider)
    }

    /// Register `codec` for `family`, returning the one it replaces.
    pub fn register_codec(
        &mut self,
        family: AlgorithmFamily,
        codec: Arc<dyn KeyCodec>,
    ) -> Option<Arc<dyn KeyCodec>> {
        self.codecs.insert(family, codec)
    }

    /// Provider for `family`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSpec` if none is registered.
    pub fn provider(&self, family: AlgorithmFamily) -> Result<Arc<dyn PrimitiveProvider>> {
        self.providers
            .get(&family)
            .cloned()
            .ok_or_else(|| Error::InvalidSpec(format!("no provider registered for {:?}", family)))
    }

    /// Codec for `family`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSpec` if none is registered.
    pub fn codec(&self, family: AlgorithmFamily) -> Result<Arc<dyn KeyCodec>> {
        self.codecs
            .get(&family)
            .cloned()
            .ok_or_else(|| Error::InvalidSpec(format!("no codec registered for {:?}", family)))
    }

    /// Families with a registered provider, sorted by wire identifier.
    pub fn families(&self) -> Vec<AlgorithmFamily> {
        let mut families: Vec<_> = self.providers.keys().copied().collect();
        families.sort();
        families
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl core::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("families", &self.families())
            .finish()
    }
}
