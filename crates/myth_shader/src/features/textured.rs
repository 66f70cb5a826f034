//! PBR texture set: base color, normal, metallic-roughness, occlusion and
//! emissive maps. Owns the texture-sampling slot.

use crate::feature::FeatureDecl;
use crate::resource::{ResourceRequirement, SamplerKind, ShaderStage, TextureDimension, TextureSampleKind};

use super::TEXTURED;

const MAPS: [(&str, &str); 5] = [
    ("baseColorTexture", "baseColorSampler"),
    ("normalTexture", "normalSampler"),
    ("metallicRoughnessTexture", "metallicRoughnessSampler"),
    ("occlusionTexture", "occlusionSampler"),
    ("emissiveTexture", "emissiveSampler"),
];

const FUNCTIONS: &str = "\
fn perturb_normal(N: vec3<f32>, world_position: vec3<f32>, uv: vec2<f32>, tangent_normal: vec3<f32>) -> vec3<f32> {
    let dp1 = dpdx(world_position);
    let dp2 = dpdy(world_position);
    let duv1 = dpdx(uv);
    let duv2 = dpdy(uv);
    let dp2perp = cross(dp2, N);
    let dp1perp = cross(N, dp1);
    let T = dp2perp * duv1.x + dp1perp * duv2.x;
    let B = dp2perp * duv1.y + dp1perp * duv2.y;
    let inv_max = inverseSqrt(max(max(dot(T, T), dot(B, B)), 1e-8));
    let tbn = mat3x3<f32>(T * inv_max, B * inv_max, N);
    return normalize(tbn * (tangent_normal * 2.0 - vec3<f32>(1.0)));
}";

const SAMPLING: &str = "\
let base_color_sample = textureSample(baseColorTexture, baseColorSampler, in.uv);
albedo = albedo * base_color_sample.rgb;
alpha = alpha * base_color_sample.a;
let metallic_roughness = textureSample(metallicRoughnessTexture, metallicRoughnessSampler, in.uv);
roughness = roughness * metallic_roughness.g;
metallic = metallic * metallic_roughness.b;
ao = textureSample(occlusionTexture, occlusionSampler, in.uv).r;
emissive = emissive * textureSample(emissiveTexture, emissiveSampler, in.uv).rgb;
N = perturb_normal(N, in.world_position, in.uv, textureSample(normalTexture, normalSampler, in.uv).xyz);";

pub(super) fn feature() -> FeatureDecl {
    let resources = MAPS.iter().flat_map(|&(texture, sampler)| {
        [
            ResourceRequirement::texture(texture, TextureSampleKind::Float, TextureDimension::D2)
                .provided_by("material"),
            ResourceRequirement::sampler(sampler, SamplerKind::Filtering).provided_by("material"),
        ]
    });

    FeatureDecl::new(TEXTURED, ShaderStage::Fragment)
        .resources(resources)
        .functions(FUNCTIONS)
        .fragment_inject(SAMPLING)
}
