//! Feature Registry
//!
//! Owned table of feature declarations, handed to the composer at
//! construction. Runtime registration may replace an existing declaration;
//! the replaced one is returned so callers can react (e.g. drop cached
//! variants that were built from it). Ids that could not round-trip through
//! a feature key (empty, or containing `+`) are rejected.

use rustc_hash::FxHashMap;

use crate::errors::{Result, ShaderError};
use crate::feature::FeatureDecl;
use crate::features;
use crate::key::is_valid_feature_id;

/// Lookup table from feature id to its declaration.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: FxHashMap<String, FeatureDecl>,
}

impl FeatureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            features: FxHashMap::default(),
        }
    }

    /// Creates a registry pre-populated with the built-in feature catalog.
    #[must_use]
    pub fn with_builtin_features() -> Self {
        let mut registry = Self::new();
        for decl in features::builtin_features() {
            registry.insert(decl);
        }
        registry
    }

    /// Registers a feature, returning the declaration it replaced, if any.
    pub fn register(&mut self, decl: FeatureDecl) -> Result<Option<FeatureDecl>> {
        if !is_valid_feature_id(&decl.id) {
            return Err(ShaderError::InvalidFeatureId {
                id: decl.id.to_string(),
            });
        }
        Ok(self.insert(decl))
    }

    fn insert(&mut self, decl: FeatureDecl) -> Option<FeatureDecl> {
        let id = decl.id.to_string();
        let previous = self.features.insert(id, decl);
        if let Some(prev) = &previous {
            log::info!("Feature '{}' overridden by a new registration", prev.id);
        }
        previous
    }

    /// Removes a feature from the registry.
    pub fn unregister(&mut self, id: &str) -> Option<FeatureDecl> {
        self.features.remove(id)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FeatureDecl> {
        self.features.get(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.features.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ShaderStage;

    #[test]
    fn builtin_catalog_is_registered() {
        let registry = FeatureRegistry::with_builtin_features();
        for id in ["textured", "shadow", "ibl", "wind", "wetness", "snow", "ssr", "probes"] {
            assert!(registry.contains(id), "missing builtin feature {id}");
        }
        assert_eq!(registry.ids().first(), Some(&"ibl"));
    }

    #[test]
    fn override_returns_previous() {
        let mut registry = FeatureRegistry::new();
        assert!(
            registry
                .register(FeatureDecl::new("fog", ShaderStage::Fragment))
                .unwrap()
                .is_none()
        );

        let previous = registry
            .register(FeatureDecl::new("fog", ShaderStage::Both))
            .unwrap()
            .expect("second registration replaces the first");
        assert_eq!(previous.stage, ShaderStage::Fragment);
        assert_eq!(registry.get("fog").map(|f| f.stage), Some(ShaderStage::Both));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn ids_that_break_feature_keys_are_rejected() {
        let mut registry = FeatureRegistry::new();
        for id in ["", "wind+shadow"] {
            assert!(matches!(
                registry.register(FeatureDecl::new(id, ShaderStage::Fragment)),
                Err(ShaderError::InvalidFeatureId { id: ref rejected }) if rejected == id
            ));
        }
        assert!(registry.is_empty());
    }
}
