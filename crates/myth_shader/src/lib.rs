//! # Myth Shader
//!
//! Feature-based WGSL composition for the Myth variant pipeline.
//!
//! Shader capabilities (shadows, IBL, texturing, wind, weathering, reflections)
//! are authored independently as [`FeatureDecl`]s. The [`ShaderComposer`]
//! combines any set of them into one module: it orders features by their
//! dependencies, merges the resources they declare, assigns binding indices
//! and fills the base template's injection markers.
//!
//! This crate performs no GPU calls. Compilation, caching and pipeline
//! construction live in `myth_render`.
//!
//! ## Bind group convention
//!
//! | Group | Owner                | Indices                               |
//! |-------|----------------------|---------------------------------------|
//! | 0     | host (frame globals) | fixed by the base template            |
//! | 1     | host (per object)    | one uniform, fields appended per feature |
//! | 2     | per-mesh textures    | `0..N`, first-seen order              |
//! | 3     | shared environment   | [`ENVIRONMENT_SLOTS`]                 |

pub mod composer;
pub mod environment;
pub mod errors;
pub mod feature;
pub mod features;
pub mod key;
pub mod registry;
pub mod resource;
pub mod template;

pub use composer::{
    BindingEntry, ComposedShader, FieldOffset, ShaderComposer, UniformField, UniformLayout,
};
pub use environment::{
    ENVIRONMENT_SLOTS, EnvironmentMask, EnvironmentSlot, environment_slot, mask_for_features,
    slots_for_mask,
};
pub use errors::{Result, ShaderError};
pub use feature::FeatureDecl;
pub use key::{FeatureKey, build_feature_key, canonical_ids, is_valid_feature_id};
pub use registry::FeatureRegistry;
pub use resource::{
    ResourceGroup, ResourceKind, ResourceRequirement, SamplerKind, ShaderStage, TextureDimension,
    TextureSampleKind, ValueType, Varying,
};
pub use template::{MARKERS, ShaderSections, ShaderTemplate};
