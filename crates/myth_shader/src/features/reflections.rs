//! Reflection sources layered on top of IBL: screen-space reflections and
//! local reflection probes. Both modify the final color.

use crate::environment::environment_slot;
use crate::feature::FeatureDecl;
use crate::resource::{ResourceRequirement, ShaderStage, ValueType};

use super::{IBL, PROBES, SSR};

const SSR_FUNCTIONS: &str = "\
fn apply_ssr(color: vec3<f32>, frag_coord: vec2<f32>, roughness: f32) -> vec3<f32> {
    let size = vec2<f32>(textureDimensions(ssrTexture));
    let reflection = textureSampleLevel(ssrTexture, ssrSampler, frag_coord / size, 0.0);
    let weight = reflection.a * (1.0 - roughness) * u_object.ssrIntensity;
    return mix(color, reflection.rgb, clamp(weight, 0.0, 1.0));
}";

const PROBE_FUNCTIONS: &str = "\
fn probe_reflection(N: vec3<f32>, V: vec3<f32>, roughness: f32) -> vec3<f32> {
    let R = reflect(-V, N);
    let lod = roughness * f32(textureNumLevels(probeCubemap) - 1u);
    return textureSampleLevel(probeCubemap, cubemapSampler, R, lod).rgb;
}";

const PROBE_POST: &str = "\
let probe_f0 = mix(vec3<f32>(0.04), albedo, metallic);
color = color + probe_reflection(N, V, roughness) * probe_f0 * u_object.probeBlend * ao;";

fn environment(names: &[&str]) -> Vec<ResourceRequirement> {
    names
        .iter()
        .filter_map(|name| environment_slot(name))
        .map(|slot| ResourceRequirement::environment(slot.name, slot.kind.clone()))
        .collect()
}

pub(super) fn ssr() -> FeatureDecl {
    FeatureDecl::new(SSR, ShaderStage::Fragment)
        .resource(ResourceRequirement::per_object("ssrIntensity", ValueType::F32).provided_by("reflections"))
        .resources(environment(&["ssrTexture", "ssrSampler"]))
        .functions(SSR_FUNCTIONS)
        .fragment_post_inject("color = apply_ssr(color, in.clip_position.xy, roughness);")
        .depends_on(IBL)
}

pub(super) fn probes() -> FeatureDecl {
    FeatureDecl::new(PROBES, ShaderStage::Fragment)
        .resource(ResourceRequirement::per_object("probeBlend", ValueType::F32).provided_by("reflections"))
        .resources(environment(&["probeCubemap", "cubemapSampler"]))
        .functions(PROBE_FUNCTIONS)
        .fragment_post_inject(PROBE_POST)
        .depends_on(IBL)
}
