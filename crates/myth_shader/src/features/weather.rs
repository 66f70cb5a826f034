//! Surface weathering. `wetness` darkens and smooths surfaces through a mask;
//! `snow` builds on it, covering upward-facing surfaces.

use crate::feature::FeatureDecl;
use crate::resource::{ResourceRequirement, SamplerKind, ShaderStage, TextureDimension, TextureSampleKind, ValueType};

use super::{SNOW, WETNESS};

const WETNESS_FUNCTIONS: &str = "\
fn wetness_amount(uv: vec2<f32>) -> f32 {
    let mask = textureSample(wetnessMaskTexture, wetnessMaskSampler, uv).r;
    return clamp(u_object.wetness * mask, 0.0, 1.0);
}";

const WETNESS_PRE_LIGHTING: &str = "\
let wet = wetness_amount(in.uv);
albedo = albedo * mix(1.0, u_object.wetnessDarkening, wet);
roughness = mix(roughness, 0.08, wet);";

const SNOW_FUNCTIONS: &str = "\
fn snow_coverage(N: vec3<f32>) -> f32 {
    return smoothstep(1.0 - u_object.snowAmount, 1.0, max(N.y, 0.0));
}";

const SNOW_PRE_LIGHTING: &str = "\
let snow = snow_coverage(N);
albedo = mix(albedo, u_object.snowColor, snow);
roughness = mix(roughness, 0.9, snow);
metallic = metallic * (1.0 - snow);";

pub(super) fn wetness() -> FeatureDecl {
    FeatureDecl::new(WETNESS, ShaderStage::Fragment)
        .resource(ResourceRequirement::per_object("wetness", ValueType::F32).provided_by("weather"))
        .resource(
            ResourceRequirement::per_object("wetnessDarkening", ValueType::F32).provided_by("weather"),
        )
        .resource(
            ResourceRequirement::texture("wetnessMaskTexture", TextureSampleKind::Float, TextureDimension::D2)
                .provided_by("weather"),
        )
        .resource(
            ResourceRequirement::sampler("wetnessMaskSampler", SamplerKind::Filtering)
                .provided_by("weather"),
        )
        .functions(WETNESS_FUNCTIONS)
        .fragment_pre_lighting_inject(WETNESS_PRE_LIGHTING)
}

pub(super) fn snow() -> FeatureDecl {
    FeatureDecl::new(SNOW, ShaderStage::Fragment)
        .resource(ResourceRequirement::per_object("snowAmount", ValueType::F32).provided_by("weather"))
        .resource(ResourceRequirement::per_object("snowColor", ValueType::Vec3).provided_by("weather"))
        .functions(SNOW_FUNCTIONS)
        .fragment_pre_lighting_inject(SNOW_PRE_LIGHTING)
        .depends_on(WETNESS)
}
