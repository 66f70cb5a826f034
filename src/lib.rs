//! # Myth Variants
//!
//! Feature-composed shader variants for the Myth engine.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_variants::prelude::*;
//!
//! let backend = WgpuBackend::new(device.clone());
//! let composer = ShaderComposer::new(FeatureRegistry::with_builtin_features());
//!
//! // The canonical textures layout, shared by identity with every textured
//! // variant. It must cover every texture-group resource in use, so it is
//! // built from the union of the features that declare them.
//! let all_textures = composer.compose(&["textured", "wetness"])?;
//! let textures_layout = Arc::new(backend.create_bind_group_layout(
//!     "Mesh Textures",
//!     &texture_layout_entries(&all_textures.binding_layout),
//! ));
//!
//! let mut pipelines = VariantPipelineManager::new(
//!     global_layout,
//!     object_layout,
//!     textures_layout,
//!     composer,
//!     VariantPipelineSettings::default(),
//! );
//! let mut environment = SharedEnvironment::<WgpuBackend, GpuResource>::new();
//!
//! let entry = pipelines.get_or_create(
//!     &backend,
//!     &["textured", "shadow", "ibl"],
//!     CullMode::Back,
//!     &mut environment,
//! )?;
//! ```

pub use myth_render as render;
pub use myth_shader as shader;

pub mod prelude {
    pub use myth_render::{
        CullMode, EnvironmentLayouts, EnvironmentResources, GpuResource, GraphicsBackend,
        HeadlessBackend, PipelineEntry, PipelineStats, ResolvedBinding, ResourceProvider,
        ResourceResolver, SharedEnvironment, VariantCache, VariantEntry, VariantPipelineManager,
        VariantPipelineSettings, WgpuBackend, bind_group_entries, environment_layout_entries,
        resolve_environment, texture_layout_entries,
    };
    pub use myth_shader::{
        ComposedShader, EnvironmentMask, FeatureDecl, FeatureKey, FeatureRegistry,
        ResourceGroup, ResourceKind, ResourceRequirement, ShaderComposer, ShaderError,
        ShaderStage, ValueType, Varying, build_feature_key,
    };
}
