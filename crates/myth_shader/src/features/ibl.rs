//! Image-based ambient lighting from prefiltered cubemaps and a BRDF LUT.
//! Owns the ambient slot.

use crate::environment::environment_slot;
use crate::feature::FeatureDecl;
use crate::resource::{ResourceRequirement, ShaderStage};

use super::IBL;

const ENVIRONMENT: [&str; 5] = [
    "diffuseCubemap",
    "specularCubemap",
    "brdfLut",
    "cubemapSampler",
    "brdfSampler",
];

const FUNCTIONS: &str = "\
fn ibl_ambient(N: vec3<f32>, V: vec3<f32>, albedo: vec3<f32>, metallic: f32, roughness: f32) -> vec3<f32> {
    let n_dot_v = max(dot(N, V), 1e-4);
    let f0 = mix(vec3<f32>(0.04), albedo, metallic);
    let F = fresnel_schlick(n_dot_v, f0);
    let kd = (vec3<f32>(1.0) - F) * (1.0 - metallic);
    let irradiance = textureSampleLevel(diffuseCubemap, cubemapSampler, N, 0.0).rgb;
    let R = reflect(-V, N);
    let max_lod = f32(textureNumLevels(specularCubemap) - 1u);
    let prefiltered = textureSampleLevel(specularCubemap, cubemapSampler, R, roughness * max_lod).rgb;
    let brdf = textureSampleLevel(brdfLut, brdfSampler, vec2<f32>(n_dot_v, roughness), 0.0).rg;
    return kd * irradiance * albedo + prefiltered * (F * brdf.x + brdf.y);
}";

pub(super) fn feature() -> FeatureDecl {
    let resources = ENVIRONMENT
        .iter()
        .filter_map(|name| environment_slot(name))
        .map(|slot| ResourceRequirement::environment(slot.name, slot.kind.clone()));

    FeatureDecl::new(IBL, ShaderStage::Fragment)
        .resources(resources)
        .functions(FUNCTIONS)
        .fragment_inject("ambient = ibl_ambient(N, V, albedo, metallic, roughness) * ao * u_global.ambient_intensity;")
}
