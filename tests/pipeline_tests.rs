//! Variant Pipeline Tests
//!
//! Tests for:
//! - Variant cache reference stability and invalidation
//! - Pipeline keying by (feature key, cull mode)
//! - Group 2 layout reuse by identity, empty layouts otherwise
//! - Group 3 layout selection by capability mask
//! - Cache coherence after feature overrides and invalidation
//!
//! All tests run against the recording backend; no GPU is required.

use std::sync::Arc;

use myth_variants::render::layout::texture_layout_entries;
use myth_variants::render::{
    CullMode, EnvironmentLayouts, GraphicsBackend, HeadlessBackend, PipelineEntry, PipelineStats,
    SharedEnvironment, VariantCache, VariantPipelineManager, VariantPipelineSettings,
};
use myth_variants::shader::{
    EnvironmentMask, FeatureDecl, FeatureRegistry, ResourceRequirement, ShaderComposer,
    ShaderError, ShaderStage, ValueType,
};

type Manager = VariantPipelineManager<HeadlessBackend>;

/// Built-in features that declare texture-group resources.
const TEXTURE_GROUP_FEATURES: [&str; 2] = ["textured", "wetness"];

const ALL_BUILTIN: [&str; 8] = [
    "textured", "shadow", "ibl", "wind", "wetness", "snow", "ssr", "probes",
];
type Environment = SharedEnvironment<HeadlessBackend, ()>;

struct Fixture {
    backend: HeadlessBackend,
    manager: Manager,
    environment: Environment,
}

fn fixture() -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();

    let backend = HeadlessBackend::new();
    let composer = ShaderComposer::new(FeatureRegistry::with_builtin_features());
    let all_textures = composer.compose(&TEXTURE_GROUP_FEATURES).unwrap();

    let global = Arc::new(backend.create_bind_group_layout("Global", &[]));
    let object = Arc::new(backend.create_bind_group_layout("Object", &[]));
    let textures = Arc::new(backend.create_bind_group_layout(
        "Mesh Textures",
        &texture_layout_entries(&all_textures.binding_layout),
    ));

    let manager = Manager::new(
        global,
        object,
        textures,
        composer,
        VariantPipelineSettings::default(),
    );

    Fixture {
        backend,
        manager,
        environment: Environment::new(),
    }
}

impl Fixture {
    fn get(&mut self, ids: &[&str], cull: CullMode) -> Arc<PipelineEntry<HeadlessBackend>> {
        self.manager
            .get_or_create(&self.backend, ids, cull, &mut self.environment)
            .unwrap()
    }
}

// ============================================================================
// Variant Cache
// ============================================================================

#[test]
fn variant_cache_returns_the_same_entry() {
    let backend = HeadlessBackend::new();
    let mut cache = VariantCache::<HeadlessBackend>::new(ShaderComposer::default());

    let first = cache.get_or_create(&backend, &["wind", "shadow"]).unwrap();
    let second = cache.get_or_create(&backend, &["shadow", "wind", "wind"]).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(backend.counts().shader_modules, 1, "second call must not recompile");
}

#[test]
fn variant_cache_invalidate_produces_a_new_entry() {
    let backend = HeadlessBackend::new();
    let mut cache = VariantCache::<HeadlessBackend>::new(ShaderComposer::default());

    let first = cache.get_or_create(&backend, &["ibl"]).unwrap();
    cache.invalidate(None);
    let second = cache.get_or_create(&backend, &["ibl"]).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first.module, &second.module));
    assert_eq!(backend.counts().shader_modules, 2);
}

#[test]
fn variant_cache_surfaces_configuration_errors() {
    let backend = HeadlessBackend::new();
    let mut cache = VariantCache::<HeadlessBackend>::new(ShaderComposer::default());
    assert!(matches!(
        cache.get_or_create(&backend, &["unknown"]),
        Err(ShaderError::UnknownFeature { .. })
    ));
    assert_eq!(backend.counts().shader_modules, 0);
}

// ============================================================================
// Pipeline Keying
// ============================================================================

#[test]
fn cull_modes_get_distinct_pipelines_over_one_module() {
    let mut f = fixture();
    let back = f.get(&["textured", "shadow"], CullMode::Back);
    let none = f.get(&["textured", "shadow"], CullMode::None);

    assert!(!Arc::ptr_eq(&back, &none));
    assert!(Arc::ptr_eq(&back.variant, &none.variant));
    assert_eq!(back.pipeline.module, none.pipeline.module);
    assert_ne!(back.pipeline.id, none.pipeline.id);
    assert_eq!(f.backend.counts().shader_modules, 1);
}

#[test]
fn repeated_requests_hit_the_pipeline_cache() {
    let mut f = fixture();
    let a = f.get(&["ibl", "textured"], CullMode::Back);
    let counts = f.backend.counts();
    let b = f.get(&["textured", "ibl"], CullMode::Back);

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(f.backend.counts(), counts, "cache hit must not touch the backend");
}

#[test]
fn pipeline_state_follows_settings() {
    let mut f = fixture();
    let entry = f.get(&["wind"], CullMode::Front);
    let settings = VariantPipelineSettings::default();
    assert_eq!(entry.pipeline.cull_mode, CullMode::Front);
    assert_eq!(entry.pipeline.color_format, settings.color_format);
    assert_eq!(entry.pipeline.depth_format, settings.depth_format);
    assert_eq!(entry.pipeline.depth_compare, wgpu::CompareFunction::Greater);
}

// ============================================================================
// Group 2: Textures Layout
// ============================================================================

#[test]
fn textured_variants_reuse_the_canonical_layout_object() {
    let mut f = fixture();
    let a = f.get(&["textured"], CullMode::Back);
    let b = f.get(&["textured", "shadow", "ibl"], CullMode::None);

    let canonical = f.manager.textures_layout();
    assert!(a.has_texture_bindings);
    assert!(Arc::ptr_eq(&a.textures_layout, canonical));
    assert!(Arc::ptr_eq(&b.textures_layout, canonical));
    assert_eq!(a.pipeline_layout.bind_group_layouts[2], canonical.id);
}

#[test]
fn canonical_layout_covers_every_builtin_combination() {
    let composer = ShaderComposer::default();
    let canonical =
        texture_layout_entries(&composer.compose(&TEXTURE_GROUP_FEATURES).unwrap().binding_layout);

    for bits in 0u32..(1 << ALL_BUILTIN.len()) {
        let ids: Vec<&str> = ALL_BUILTIN
            .iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << i) != 0)
            .map(|(_, id)| *id)
            .collect();
        let shader = composer.compose(ids.as_slice()).unwrap();
        for entry in texture_layout_entries(&shader.binding_layout) {
            assert!(
                canonical.contains(&entry),
                "variant '{}' binding {} is not covered by the canonical layout",
                shader.feature_key,
                entry.binding
            );
        }
    }
}

#[test]
fn textured_alone_does_not_cover_wetness() {
    let composer = ShaderComposer::default();
    let textured_only =
        texture_layout_entries(&composer.compose(&["textured"]).unwrap().binding_layout);
    let shader = composer.compose(&["textured", "wetness"]).unwrap();
    let missing: Vec<u32> = texture_layout_entries(&shader.binding_layout)
        .into_iter()
        .filter(|e| !textured_only.contains(e))
        .map(|e| e.binding)
        .collect();
    assert_eq!(missing, [10, 11]);
}

#[test]
fn variants_without_textures_get_a_fresh_empty_layout() {
    let mut f = fixture();
    let a = f.get(&["wind"], CullMode::Back);
    let b = f.get(&["shadow"], CullMode::Back);

    assert!(!a.has_texture_bindings);
    assert!(a.textures_layout.entries.is_empty());
    assert!(!Arc::ptr_eq(&a.textures_layout, f.manager.textures_layout()));
    assert_ne!(a.textures_layout.id, b.textures_layout.id);
}

// ============================================================================
// Group 3: Environment Layout
// ============================================================================

#[test]
fn environment_layout_comes_from_the_collaborator_by_mask() {
    let mut f = fixture();
    let a = f.get(&["shadow", "textured"], CullMode::Back);
    let b = f.get(&["shadow", "wind"], CullMode::Back);

    let expected = EnvironmentMask::SHADOW_MAP
        | EnvironmentMask::SHADOW_SAMPLER
        | EnvironmentMask::CASCADED_SHADOW_MAP
        | EnvironmentMask::CASCADE_UNIFORMS;
    assert_eq!(a.env_mask, expected);
    assert!(a.has_environment_bindings);
    assert!(Arc::ptr_eq(&a.environment_layout, &b.environment_layout));

    let from_env = f.environment.layout_for_mask(&f.backend, expected);
    assert!(Arc::ptr_eq(&a.environment_layout, &from_env));
    assert_eq!(f.environment.layout_count(), 1);
}

#[test]
fn zero_mask_skips_the_collaborator() {
    let mut f = fixture();
    let entry = f.get(&["textured", "wind", "wetness"], CullMode::Back);
    assert!(entry.env_mask.is_empty());
    assert!(!entry.has_environment_bindings);
    assert!(entry.environment_layout.entries.is_empty());
    assert_eq!(f.environment.layout_count(), 0);
}

#[test]
fn dependency_features_contribute_to_the_mask() {
    let mut f = fixture();
    let entry = f.get(&["ssr"], CullMode::Back);
    assert!(entry.env_mask.contains(EnvironmentMask::BRDF_LUT), "ibl comes in through ssr");
    assert!(entry.env_mask.contains(EnvironmentMask::SSR_TEXTURE | EnvironmentMask::SSR_SAMPLER));
    assert_eq!(entry.environment_layout.entries.len(), 7);
}

#[test]
fn pipeline_layout_uses_groups_in_order() {
    let mut f = fixture();
    let entry = f.get(&["textured", "ibl"], CullMode::Back);
    assert_eq!(
        entry.pipeline_layout.bind_group_layouts,
        [
            f.manager.global_layout().id,
            f.manager.object_layout().id,
            entry.textures_layout.id,
            entry.environment_layout.id,
        ]
    );
    assert_eq!(entry.pipeline.layout, entry.pipeline_layout.id);
}

// ============================================================================
// Invalidation & Stats
// ============================================================================

#[test]
fn stats_count_pipelines_variants_and_modules() {
    let mut f = fixture();
    f.get(&["snow"], CullMode::Back);
    f.get(&["snow"], CullMode::None);
    f.get(&["snow", "wetness"], CullMode::Back);

    let stats = f.manager.stats();
    assert_eq!(stats.pipelines, 3);
    assert_eq!(stats.variants, 2);
    assert_eq!(stats.shader_modules, 1);
}

#[test]
fn invalidate_drops_every_cull_mode_of_one_variant() {
    let mut f = fixture();
    let old = f.get(&["wind"], CullMode::Back);
    f.get(&["wind"], CullMode::None);
    f.get(&["shadow"], CullMode::Back);

    f.manager.invalidate(&["wind"]);
    let stats = f.manager.stats();
    assert_eq!(stats.pipelines, 1);
    assert_eq!(stats.variants, 1);

    let new = f.get(&["wind"], CullMode::Back);
    assert!(!Arc::ptr_eq(&old, &new));
}

#[test]
fn invalidate_all_and_destroy_clear_everything() {
    let mut f = fixture();
    f.get(&["wind"], CullMode::Back);
    f.get(&["ibl"], CullMode::Back);

    f.manager.invalidate_all();
    assert_eq!(f.manager.stats(), PipelineStats::default());

    f.get(&["wind"], CullMode::Back);
    let canonical = Arc::clone(f.manager.textures_layout());
    f.manager.destroy();
    assert_eq!(f.manager.stats().pipelines, 0);
    assert!(Arc::ptr_eq(f.manager.textures_layout(), &canonical));
}

#[test]
fn overriding_a_feature_rebuilds_dependent_pipelines() {
    let mut f = fixture();
    let snow = f.get(&["snow"], CullMode::Back);
    let wind = f.get(&["wind"], CullMode::Back);

    let previous = f.manager.register_feature(
        FeatureDecl::new("wetness", ShaderStage::Fragment)
            .resource(ResourceRequirement::per_object("puddleDepth", ValueType::F32)),
    )
    .unwrap();
    assert!(previous.is_some());

    let snow_after = f.get(&["snow"], CullMode::Back);
    let wind_after = f.get(&["wind"], CullMode::Back);
    assert!(!Arc::ptr_eq(&snow, &snow_after));
    assert!(Arc::ptr_eq(&wind, &wind_after));
    assert!(snow_after.variant.shader.uniform_layout.get("puddleDepth").is_some());
}
