//! Cascaded shadow maps with a single-map fallback. Owns the shadow slot.

use crate::environment::environment_slot;
use crate::feature::FeatureDecl;
use crate::resource::{ResourceRequirement, ShaderStage};

use super::SHADOW;

const ENVIRONMENT: [&str; 4] = ["shadowMap", "shadowSampler", "cascadedShadowMap", "cascadeUniforms"];

const FUNCTIONS: &str = "\
fn select_cascade(view_distance: f32) -> u32 {
    var cascade = 0u;
    for (var i = 0u; i < min(cascadeUniforms.cascade_count, 4u); i = i + 1u) {
        if (view_distance > cascadeUniforms.split_depths[i]) {
            cascade = i + 1u;
        }
    }
    return min(cascade, max(cascadeUniforms.cascade_count, 1u) - 1u);
}

fn sample_shadow(world_position: vec3<f32>, N: vec3<f32>, L: vec3<f32>) -> f32 {
    let cascade = select_cascade(distance(u_global.camera_position, world_position));
    let biased_position = world_position + N * cascadeUniforms.normal_bias;
    let light_space = cascadeUniforms.light_view_projection[cascade] * vec4<f32>(biased_position, 1.0);
    let ndc = light_space.xyz / light_space.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z > 1.0) {
        return 1.0;
    }
    let bias = max(cascadeUniforms.depth_bias * (1.0 - dot(N, L)), cascadeUniforms.depth_bias * 0.1);
    let depth = ndc.z - bias;
    if (cascadeUniforms.cascade_count == 0u) {
        return textureSampleCompareLevel(shadowMap, shadowSampler, uv, depth);
    }
    let texel = 1.0 / vec2<f32>(textureDimensions(cascadedShadowMap));
    var visibility = 0.0;
    for (var x = -1; x <= 1; x = x + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            visibility = visibility + textureSampleCompareLevel(cascadedShadowMap, shadowSampler, uv + offset, i32(cascade), depth);
        }
    }
    return visibility / 9.0;
}";

pub(super) fn feature() -> FeatureDecl {
    let resources = ENVIRONMENT
        .iter()
        .filter_map(|name| environment_slot(name))
        .map(|slot| ResourceRequirement::environment(slot.name, slot.kind.clone()));

    FeatureDecl::new(SHADOW, ShaderStage::Fragment)
        .resources(resources)
        .functions(FUNCTIONS)
        .fragment_inject("shadow = sample_shadow(in.world_position, N, L);")
}
