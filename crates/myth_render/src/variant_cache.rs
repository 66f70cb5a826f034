//! Shader Variant Cache
//!
//! Memoizes composition plus compilation per [`FeatureKey`]. A hit returns
//! the very same `Arc<VariantEntry>` that the first request produced; nothing
//! is recomposed or recompiled.
//!
//! Compiled modules are additionally deduplicated by the xxh3-128 hash of the
//! final source, so keys that resolve to the same feature list (for example
//! `snow` and `snow+wetness`) share one module.
//!
//! Invalidation only forgets entries. Pipelines or bind groups already built
//! from a removed entry keep their `Arc`s and remain valid until dropped.

use std::sync::Arc;

use myth_shader::{
    ComposedShader, FeatureDecl, FeatureKey, Result, ShaderComposer, ShaderError,
    canonical_ids, is_valid_feature_id,
};
use rustc_hash::FxHashMap;

use crate::backend::GraphicsBackend;

/// A composed shader paired with its compiled module.
pub struct VariantEntry<B: GraphicsBackend> {
    pub shader: ComposedShader,
    pub module: Arc<B::ShaderModule>,
}

impl<B: GraphicsBackend> VariantEntry<B> {
    #[inline]
    #[must_use]
    pub fn feature_key(&self) -> &FeatureKey {
        &self.shader.feature_key
    }

    /// Resolved feature ids, dependencies first.
    #[inline]
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.shader.features
    }
}

impl<B: GraphicsBackend> std::fmt::Debug for VariantEntry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantEntry")
            .field("feature_key", &self.shader.feature_key)
            .field("features", &self.shader.features)
            .field("source_hash", &format_args!("{:032x}", self.shader.source_hash))
            .finish_non_exhaustive()
    }
}

/// Feature key → composed and compiled variant.
pub struct VariantCache<B: GraphicsBackend> {
    composer: ShaderComposer,
    entries: FxHashMap<FeatureKey, Arc<VariantEntry<B>>>,
    /// xxh3-128 of final WGSL → compiled module.
    modules: FxHashMap<u128, Arc<B::ShaderModule>>,
    dump_shader_source: bool,
}

impl<B: GraphicsBackend> VariantCache<B> {
    #[must_use]
    pub fn new(composer: ShaderComposer) -> Self {
        Self {
            composer,
            entries: FxHashMap::default(),
            modules: FxHashMap::default(),
            dump_shader_source: false,
        }
    }

    /// Logs each newly composed source at `trace` level.
    pub fn set_dump_shader_source(&mut self, enabled: bool) {
        self.dump_shader_source = enabled;
    }

    #[inline]
    #[must_use]
    pub fn composer(&self) -> &ShaderComposer {
        &self.composer
    }

    /// Returns the cached variant for `ids`, composing and compiling it on
    /// first use.
    pub fn get_or_create<S: AsRef<str>>(
        &mut self,
        backend: &B,
        ids: &[S],
    ) -> Result<Arc<VariantEntry<B>>> {
        // Such ids can never be registered, and their keys would alias
        // other requests ("" or "a+b").
        if let Some(id) = canonical_ids(ids).into_iter().find(|id| !is_valid_feature_id(id)) {
            return Err(ShaderError::UnknownFeature {
                id: id.to_string(),
                required_by: None,
            });
        }

        let key = FeatureKey::new(ids);
        if let Some(entry) = self.entries.get(&key) {
            log::trace!("Variant cache hit: {key}");
            return Ok(Arc::clone(entry));
        }

        let shader = self.composer.compose(ids)?;
        if self.dump_shader_source {
            log::trace!("Generated shader for variant '{key}':\n{}", shader.source);
        }

        let module = self
            .modules
            .entry(shader.source_hash)
            .or_insert_with(|| {
                log::debug!("Compiling shader module for variant '{key}'");
                Arc::new(backend.compile_shader_module(&shader.source, &format!("Variant {key}")))
            })
            .clone();

        let entry = Arc::new(VariantEntry { shader, module });
        self.entries.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    /// Looks up a variant without creating it.
    #[must_use]
    pub fn get<S: AsRef<str>>(&self, ids: &[S]) -> Option<Arc<VariantEntry<B>>> {
        self.entries.get(&FeatureKey::new(ids)).cloned()
    }

    #[must_use]
    pub fn has<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        self.entries.contains_key(&FeatureKey::new(ids))
    }

    /// Forgets one variant, or every variant when `key` is `None`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, key: Option<&FeatureKey>) -> usize {
        let removed = match key {
            Some(key) => usize::from(self.entries.remove(key).is_some()),
            None => {
                let n = self.entries.len();
                self.entries.clear();
                self.modules.clear();
                n
            }
        };
        self.release_unused_modules();
        if removed > 0 {
            log::info!(
                "Invalidated {removed} shader variant(s){}",
                key.map(|k| format!(" for '{k}'")).unwrap_or_default()
            );
        }
        removed
    }

    /// Registers or overrides a feature and forgets every variant whose
    /// resolved feature list contains it.
    ///
    /// Returns the replaced declaration and the keys that were invalidated.
    pub fn register_feature(
        &mut self,
        decl: FeatureDecl,
    ) -> Result<(Option<FeatureDecl>, Vec<FeatureKey>)> {
        let id = decl.id.to_string();
        let previous = self.composer.register_feature(decl)?;

        let stale: Vec<FeatureKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.features().iter().any(|f| *f == id))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            self.entries.remove(key);
        }
        self.release_unused_modules();

        if !stale.is_empty() {
            log::info!(
                "Feature '{id}' changed; invalidated {} dependent variant(s)",
                stale.len()
            );
        }
        Ok((previous, stale))
    }

    /// Re-reads the base template and forgets every variant.
    pub fn reload_template(&mut self) {
        self.composer.reload_template();
        self.invalidate(None);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct compiled modules currently held.
    #[inline]
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Drops modules no entry references any more.
    fn release_unused_modules(&mut self) {
        self.modules.retain(|_, module| Arc::strong_count(module) > 1);
    }
}
