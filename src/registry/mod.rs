pub mod builtin;
pub mod converter;

pub use converter::*;

use crate::error::RegistrationError;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only lookup table from canonical node-type keys (and known aliases)
/// to converter implementations.
///
/// Built once at construction and never mutated afterwards, which makes it
/// safe to share by reference across concurrent conversions.
#[derive(Default)]
pub struct TypeRegistry {
    converters: AHashMap<String, ConverterHandle>,
    aliases: AHashMap<String, String>,
}

/// Capability summary for coverage reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatistics {
    pub total_converters: usize,
    pub total_aliases: usize,
    pub by_category: BTreeMap<String, usize>,
}

/// Discovery payload for external callers (UI, CLI `capabilities`).
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub total_converters: usize,
    pub supported_types: Vec<String>,
    pub categories: Vec<String>,
    pub aliases: BTreeMap<String, String>,
}

impl TypeRegistry {
    /// An empty registry; useful for tests and fully custom converter sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in converter set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_builtin_converters(&mut registry);
        registry
    }

    /// Registers a converter under its canonical key and all of its aliases.
    /// Fails if any claim is already taken; duplicate registration is a
    /// programming mistake, not a user-facing condition.
    pub fn register(&mut self, converter: ConverterHandle) -> Result<(), RegistrationError> {
        let key = converter.converter_key().to_string();
        if self.is_claimed(&key) {
            return Err(RegistrationError::DuplicateKey(key));
        }
        for alias in converter.aliases() {
            if self.is_claimed(alias) {
                return Err(RegistrationError::DuplicateKey(alias.to_string()));
            }
        }
        for alias in converter.aliases() {
            self.aliases.insert(alias.to_string(), key.clone());
        }
        self.converters.insert(key, converter);
        Ok(())
    }

    /// Alias-then-canonical lookup.
    pub fn resolve(&self, type_key: &str) -> Option<ConverterHandle> {
        let canonical = self
            .aliases
            .get(type_key)
            .map(String::as_str)
            .unwrap_or(type_key);
        self.converters.get(canonical).map(Arc::clone)
    }

    pub fn is_supported(&self, type_key: &str) -> bool {
        self.resolve(type_key).is_some()
    }

    pub fn statistics(&self) -> RegistryStatistics {
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for converter in self.converters.values() {
            *by_category
                .entry(converter.category().to_string())
                .or_default() += 1;
        }
        RegistryStatistics {
            total_converters: self.converters.len(),
            total_aliases: self.aliases.len(),
            by_category,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut supported_types: Vec<String> = self.converters.keys().cloned().collect();
        supported_types.sort();
        let mut categories: Vec<String> = self
            .converters
            .values()
            .map(|c| c.category().to_string())
            .collect();
        categories.sort();
        categories.dedup();
        let aliases = self
            .aliases
            .iter()
            .map(|(alias, key)| (alias.clone(), key.clone()))
            .collect();
        Capabilities {
            total_converters: self.converters.len(),
            supported_types,
            categories,
            aliases,
        }
    }

    fn is_claimed(&self, key: &str) -> bool {
        self.converters.contains_key(key) || self.aliases.contains_key(key)
    }
}
