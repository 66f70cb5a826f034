//! Variant Pipeline Manager
//!
//! Builds and caches the full render pipeline for a `(feature key, cull mode)`
//! pair on top of the [`VariantCache`].
//!
//! # Bind group layouts
//!
//! | Group | Layout used                                                         |
//! |-------|---------------------------------------------------------------------|
//! | 0     | host-supplied global layout                                         |
//! | 1     | host-supplied per-object layout                                     |
//! | 2     | the host's canonical textures layout **by identity** if the variant |
//! |       | declares texture bindings, otherwise a fresh empty layout           |
//! | 3     | the environment collaborator's layout for the variant's capability  |
//! |       | mask, or a fresh empty layout when the mask is zero                 |
//!
//! Per-mesh texture bind groups are created against the canonical Group 2
//! layout object, and real devices check pipeline/bind-group compatibility
//! by layout identity. The manager therefore hands out that exact `Arc`
//! instead of building an equal layout.

use std::sync::Arc;

use myth_shader::{
    EnvironmentMask, FeatureDecl, FeatureKey, Result, ShaderComposer, mask_for_features,
};
use rustc_hash::FxHashMap;

use crate::backend::{CullMode, GraphicsBackend, VariantPipelineDescriptor};
use crate::environment::EnvironmentLayouts;
use crate::settings::VariantPipelineSettings;
use crate::variant_cache::{VariantCache, VariantEntry};

/// Pipeline cache key. Cull mode is baked into the pipeline object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub feature_key: FeatureKey,
    pub cull_mode: CullMode,
}

/// A built variant pipeline and the layouts it was built against.
pub struct PipelineEntry<B: GraphicsBackend> {
    pub variant: Arc<VariantEntry<B>>,
    pub pipeline: B::RenderPipeline,
    pub pipeline_layout: B::PipelineLayout,
    /// Group 2 layout; the canonical one when `has_texture_bindings`.
    pub textures_layout: Arc<B::BindGroupLayout>,
    /// Group 3 layout; from the environment collaborator when `env_mask` is non-zero.
    pub environment_layout: Arc<B::BindGroupLayout>,
    pub env_mask: EnvironmentMask,
    pub cull_mode: CullMode,
    pub has_texture_bindings: bool,
    pub has_environment_bindings: bool,
}

impl<B: GraphicsBackend> PipelineEntry<B> {
    #[inline]
    #[must_use]
    pub fn feature_key(&self) -> &FeatureKey {
        self.variant.feature_key()
    }

    #[inline]
    #[must_use]
    pub fn module(&self) -> &Arc<B::ShaderModule> {
        &self.variant.module
    }
}

impl<B: GraphicsBackend> std::fmt::Debug for PipelineEntry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEntry")
            .field("feature_key", self.feature_key())
            .field("cull_mode", &self.cull_mode)
            .field("env_mask", &self.env_mask)
            .field("has_texture_bindings", &self.has_texture_bindings)
            .field("has_environment_bindings", &self.has_environment_bindings)
            .finish_non_exhaustive()
    }
}

/// Diagnostic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub pipelines: usize,
    pub variants: usize,
    /// Distinct compiled shader modules.
    pub shader_modules: usize,
}

/// Owns the variant cache and the pipeline cache built on top of it.
pub struct VariantPipelineManager<B: GraphicsBackend> {
    global_layout: Arc<B::BindGroupLayout>,
    object_layout: Arc<B::BindGroupLayout>,
    textures_layout: Arc<B::BindGroupLayout>,

    variants: VariantCache<B>,
    pipelines: FxHashMap<PipelineKey, Arc<PipelineEntry<B>>>,

    settings: VariantPipelineSettings,
}

impl<B: GraphicsBackend> VariantPipelineManager<B> {
    /// Creates a manager over the host's shared Group 0, 1 and canonical
    /// Group 2 layouts.
    #[must_use]
    pub fn new(
        global_layout: Arc<B::BindGroupLayout>,
        object_layout: Arc<B::BindGroupLayout>,
        textures_layout: Arc<B::BindGroupLayout>,
        composer: ShaderComposer,
        settings: VariantPipelineSettings,
    ) -> Self {
        let mut variants = VariantCache::new(composer);
        variants.set_dump_shader_source(settings.dump_shader_source);
        Self {
            global_layout,
            object_layout,
            textures_layout,
            variants,
            pipelines: FxHashMap::default(),
            settings,
        }
    }

    /// Returns the pipeline for `ids` culled by `cull_mode`, building the
    /// variant and its layouts on first use.
    pub fn get_or_create<S: AsRef<str>>(
        &mut self,
        backend: &B,
        ids: &[S],
        cull_mode: CullMode,
        environment: &mut impl EnvironmentLayouts<B>,
    ) -> Result<Arc<PipelineEntry<B>>> {
        let variant = self.variants.get_or_create(backend, ids)?;
        let key = PipelineKey {
            feature_key: variant.feature_key().clone(),
            cull_mode,
        };

        if let Some(entry) = self.pipelines.get(&key) {
            log::trace!("Pipeline cache hit: {} ({:?})", key.feature_key, cull_mode);
            return Ok(Arc::clone(entry));
        }

        let entry = Arc::new(self.build(backend, variant, cull_mode, environment));
        self.pipelines.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    fn build(
        &self,
        backend: &B,
        variant: Arc<VariantEntry<B>>,
        cull_mode: CullMode,
        environment: &mut impl EnvironmentLayouts<B>,
    ) -> PipelineEntry<B> {
        let shader = &variant.shader;
        let key = &shader.feature_key;

        // ---- Group 2 ----
        let has_texture_bindings = shader.has_texture_bindings();
        let textures_layout = if has_texture_bindings {
            Arc::clone(&self.textures_layout)
        } else {
            Arc::new(backend.create_bind_group_layout(&format!("Empty Textures Layout {key}"), &[]))
        };

        // ---- Group 3 ----
        let env_mask = mask_for_features(shader.features.iter().map(String::as_str));
        let uncovered = shader.declared_environment_mask().difference(env_mask);
        if !uncovered.is_empty() {
            log::warn!(
                "Variant '{key}' declares environment bindings outside its capability mask ({:#06x}); \
                 the environment layout will not contain them",
                uncovered.bits()
            );
        }
        let environment_layout = if env_mask.is_empty() {
            Arc::new(backend.create_bind_group_layout(&format!("Empty Environment Layout {key}"), &[]))
        } else {
            environment.layout_for_mask(backend, env_mask)
        };

        let pipeline_layout = backend.create_pipeline_layout(
            &format!("Variant Pipeline Layout {key}"),
            [
                &*self.global_layout,
                &*self.object_layout,
                &*textures_layout,
                &*environment_layout,
            ],
        );

        let label = format!("Variant Pipeline {key} ({cull_mode:?})");
        let pipeline = backend.create_render_pipeline(&VariantPipelineDescriptor {
            label: &label,
            layout: &pipeline_layout,
            module: &variant.module,
            cull_mode,
            color_format: self.settings.color_format,
            depth_format: self.settings.depth_format,
            depth_compare: self.settings.depth_compare,
        });

        log::debug!(
            "Created pipeline for variant '{key}' (cull {cull_mode:?}, env mask {:#06x})",
            env_mask.bits()
        );

        PipelineEntry {
            pipeline,
            pipeline_layout,
            textures_layout,
            environment_layout,
            env_mask,
            cull_mode,
            has_texture_bindings,
            has_environment_bindings: shader.has_environment_bindings(),
            variant,
        }
    }

    /// Forgets the variant for `ids` and all of its cull-mode pipelines.
    pub fn invalidate<S: AsRef<str>>(&mut self, ids: &[S]) {
        let key = FeatureKey::new(ids);
        self.pipelines.retain(|k, _| k.feature_key != key);
        self.variants.invalidate(Some(&key));
    }

    /// Clears the pipeline cache and every cached variant.
    pub fn invalidate_all(&mut self) {
        let n = self.pipelines.len();
        self.pipelines.clear();
        self.variants.invalidate(None);
        log::info!("Invalidated all variant pipelines ({n})");
    }

    /// Registers or overrides a feature, dropping every pipeline whose
    /// variant used it.
    pub fn register_feature(&mut self, decl: FeatureDecl) -> Result<Option<FeatureDecl>> {
        let (previous, stale) = self.variants.register_feature(decl)?;
        self.pipelines.retain(|k, _| !stale.contains(&k.feature_key));
        Ok(previous)
    }

    /// Re-reads the base template and drops every cached variant and pipeline.
    pub fn reload_template(&mut self) {
        self.pipelines.clear();
        self.variants.reload_template();
    }

    /// Replaces the render-target settings. Cached pipelines are dropped;
    /// compiled modules survive.
    pub fn set_settings(&mut self, settings: VariantPipelineSettings) {
        if settings == self.settings {
            return;
        }
        self.variants.set_dump_shader_source(settings.dump_shader_source);
        self.pipelines.clear();
        self.settings = settings;
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            pipelines: self.pipelines.len(),
            variants: self.variants.len(),
            shader_modules: self.variants.module_count(),
        }
    }

    /// Clears both caches. The shared layouts belong to the host and are
    /// left untouched.
    pub fn destroy(&mut self) {
        self.pipelines.clear();
        self.variants.invalidate(None);
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &VariantPipelineSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn variant_cache(&self) -> &VariantCache<B> {
        &self.variants
    }

    #[inline]
    #[must_use]
    pub fn global_layout(&self) -> &Arc<B::BindGroupLayout> {
        &self.global_layout
    }

    #[inline]
    #[must_use]
    pub fn object_layout(&self) -> &Arc<B::BindGroupLayout> {
        &self.object_layout
    }

    #[inline]
    #[must_use]
    pub fn textures_layout(&self) -> &Arc<B::BindGroupLayout> {
        &self.textures_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::environment::SharedEnvironment;

    fn manager(backend: &HeadlessBackend) -> VariantPipelineManager<HeadlessBackend> {
        let _ = env_logger::builder().is_test(true).try_init();
        VariantPipelineManager::new(
            Arc::new(backend.create_bind_group_layout("global", &[])),
            Arc::new(backend.create_bind_group_layout("object", &[])),
            Arc::new(backend.create_bind_group_layout("textures", &[])),
            ShaderComposer::default(),
            VariantPipelineSettings::default(),
        )
    }

    #[test]
    fn cull_modes_share_the_module() {
        let backend = HeadlessBackend::new();
        let mut env = SharedEnvironment::<HeadlessBackend, ()>::new();
        let mut manager = manager(&backend);

        let back = manager
            .get_or_create(&backend, &["shadow"], CullMode::Back, &mut env)
            .unwrap();
        let none = manager
            .get_or_create(&backend, &["shadow"], CullMode::None, &mut env)
            .unwrap();

        assert!(!Arc::ptr_eq(&back, &none));
        assert!(Arc::ptr_eq(back.module(), none.module()));
        assert_eq!(back.pipeline.cull_mode, CullMode::Back);
        assert_eq!(none.pipeline.cull_mode, CullMode::None);
        assert_eq!(manager.stats().pipelines, 2);
        assert_eq!(manager.stats().variants, 1);
    }

    #[test]
    fn hit_returns_same_entry() {
        let backend = HeadlessBackend::new();
        let mut env = SharedEnvironment::<HeadlessBackend, ()>::new();
        let mut manager = manager(&backend);
        let a = manager
            .get_or_create(&backend, &["wind"], CullMode::Back, &mut env)
            .unwrap();
        let pipelines_before = backend.counts().render_pipelines;
        let b = manager
            .get_or_create(&backend, &["wind"], CullMode::Back, &mut env)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(backend.counts().render_pipelines, pipelines_before);
    }

    #[test]
    fn settings_change_drops_pipelines_only() {
        let backend = HeadlessBackend::new();
        let mut env = SharedEnvironment::<HeadlessBackend, ()>::new();
        let mut manager = manager(&backend);
        manager
            .get_or_create(&backend, &["wind"], CullMode::Back, &mut env)
            .unwrap();

        manager.set_settings(VariantPipelineSettings {
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            ..Default::default()
        });
        assert_eq!(manager.stats().pipelines, 0);
        assert_eq!(manager.stats().variants, 1);

        let entry = manager
            .get_or_create(&backend, &["wind"], CullMode::Back, &mut env)
            .unwrap();
        assert_eq!(entry.pipeline.color_format, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(backend.counts().shader_modules, 1);
    }
}
