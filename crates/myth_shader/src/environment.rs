//! Environment Binding Contract
//!
//! Group 3 bindings are owned by the shared environment, not by the composer.
//! Their indices come from the fixed [`ENVIRONMENT_SLOTS`] table, which both
//! the composer and the environment collaborator read, so indices agree across
//! subsystems without any runtime negotiation.
//!
//! Each slot's binding index doubles as its bit in [`EnvironmentMask`]; the
//! collaborator builds one layout per mask containing exactly the slots whose
//! bits are set.

use std::borrow::Cow;

use crate::resource::{ResourceKind, SamplerKind, TextureDimension, TextureSampleKind, ValueType};

bitflags::bitflags! {
    /// Environment capabilities a composed variant needs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EnvironmentMask: u32 {
        const SHADOW_MAP          = 1 << 0;
        const SHADOW_SAMPLER      = 1 << 1;
        const CASCADED_SHADOW_MAP = 1 << 2;
        const CASCADE_UNIFORMS    = 1 << 3;
        const DIFFUSE_CUBEMAP     = 1 << 4;
        const SPECULAR_CUBEMAP    = 1 << 5;
        const BRDF_LUT            = 1 << 6;
        const CUBEMAP_SAMPLER     = 1 << 7;
        const BRDF_SAMPLER        = 1 << 8;
        const SSR_TEXTURE         = 1 << 9;
        const SSR_SAMPLER         = 1 << 10;
        const PROBE_CUBEMAP       = 1 << 11;
    }
}

/// WGSL definition of the cascaded shadow uniform block.
pub const CASCADE_UNIFORMS_STRUCT: &str = "struct CascadeUniforms {
    light_view_projection: array<mat4x4<f32>, 4>,
    split_depths: vec4<f32>,
    cascade_count: u32,
    depth_bias: f32,
    normal_bias: f32,
    _pad: f32,
};";

/// One entry of the canonical environment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSlot {
    pub name: &'static str,
    pub binding: u32,
    pub kind: ResourceKind,
    /// Struct definition the binding's type needs, emitted ahead of the binding.
    pub struct_def: Option<&'static str>,
}

impl EnvironmentSlot {
    /// The capability bit this slot occupies.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> EnvironmentMask {
        EnvironmentMask::from_bits_truncate(1 << self.binding)
    }
}

const DEPTH_2D: ResourceKind = ResourceKind::Texture {
    sample: TextureSampleKind::Depth,
    dimension: TextureDimension::D2,
};

const DEPTH_2D_ARRAY: ResourceKind = ResourceKind::Texture {
    sample: TextureSampleKind::Depth,
    dimension: TextureDimension::D2Array,
};

/// Canonical environment name → binding table.
pub static ENVIRONMENT_SLOTS: [EnvironmentSlot; 12] = [
    EnvironmentSlot {
        name: "shadowMap",
        binding: 0,
        kind: DEPTH_2D,
        struct_def: None,
    },
    EnvironmentSlot {
        name: "shadowSampler",
        binding: 1,
        kind: ResourceKind::Sampler(SamplerKind::Comparison),
        struct_def: None,
    },
    EnvironmentSlot {
        name: "cascadedShadowMap",
        binding: 2,
        kind: DEPTH_2D_ARRAY,
        struct_def: None,
    },
    EnvironmentSlot {
        name: "cascadeUniforms",
        binding: 3,
        kind: ResourceKind::Uniform(ValueType::Struct(Cow::Borrowed("CascadeUniforms"))),
        struct_def: Some(CASCADE_UNIFORMS_STRUCT),
    },
    EnvironmentSlot {
        name: "diffuseCubemap",
        binding: 4,
        kind: ResourceKind::TEXTURE_CUBE,
        struct_def: None,
    },
    EnvironmentSlot {
        name: "specularCubemap",
        binding: 5,
        kind: ResourceKind::TEXTURE_CUBE,
        struct_def: None,
    },
    EnvironmentSlot {
        name: "brdfLut",
        binding: 6,
        kind: ResourceKind::TEXTURE_2D,
        struct_def: None,
    },
    EnvironmentSlot {
        name: "cubemapSampler",
        binding: 7,
        kind: ResourceKind::Sampler(SamplerKind::Filtering),
        struct_def: None,
    },
    EnvironmentSlot {
        name: "brdfSampler",
        binding: 8,
        kind: ResourceKind::Sampler(SamplerKind::Filtering),
        struct_def: None,
    },
    EnvironmentSlot {
        name: "ssrTexture",
        binding: 9,
        kind: ResourceKind::TEXTURE_2D,
        struct_def: None,
    },
    EnvironmentSlot {
        name: "ssrSampler",
        binding: 10,
        kind: ResourceKind::Sampler(SamplerKind::Filtering),
        struct_def: None,
    },
    EnvironmentSlot {
        name: "probeCubemap",
        binding: 11,
        kind: ResourceKind::TEXTURE_CUBE,
        struct_def: None,
    },
];

/// Looks up a canonical environment slot by name.
#[must_use]
pub fn environment_slot(name: &str) -> Option<&'static EnvironmentSlot> {
    ENVIRONMENT_SLOTS.iter().find(|slot| slot.name == name)
}

/// Capability bits contributed by each recognised feature.
pub const FEATURE_ENVIRONMENT_BITS: &[(&str, EnvironmentMask)] = &[
    (
        "shadow",
        EnvironmentMask::SHADOW_MAP
            .union(EnvironmentMask::SHADOW_SAMPLER)
            .union(EnvironmentMask::CASCADED_SHADOW_MAP)
            .union(EnvironmentMask::CASCADE_UNIFORMS),
    ),
    (
        "ibl",
        EnvironmentMask::DIFFUSE_CUBEMAP
            .union(EnvironmentMask::SPECULAR_CUBEMAP)
            .union(EnvironmentMask::BRDF_LUT)
            .union(EnvironmentMask::CUBEMAP_SAMPLER)
            .union(EnvironmentMask::BRDF_SAMPLER),
    ),
    (
        "ssr",
        EnvironmentMask::SSR_TEXTURE.union(EnvironmentMask::SSR_SAMPLER),
    ),
    (
        "probes",
        EnvironmentMask::PROBE_CUBEMAP.union(EnvironmentMask::CUBEMAP_SAMPLER),
    ),
];

/// ORs the capability bits of every recognised feature in `features`.
///
/// Unrecognised ids contribute nothing.
pub fn mask_for_features<'a>(features: impl IntoIterator<Item = &'a str>) -> EnvironmentMask {
    features
        .into_iter()
        .filter_map(|id| {
            FEATURE_ENVIRONMENT_BITS
                .iter()
                .find(|(feature, _)| *feature == id)
                .map(|(_, bits)| *bits)
        })
        .fold(EnvironmentMask::empty(), |acc, bits| acc | bits)
}

/// Slots selected by `mask`, in binding order.
pub fn slots_for_mask(mask: EnvironmentMask) -> impl Iterator<Item = &'static EnvironmentSlot> {
    ENVIRONMENT_SLOTS
        .iter()
        .filter(move |slot| mask.contains(slot.mask()))
}
