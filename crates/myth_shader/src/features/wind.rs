//! Vegetation wind: displaces vertices along the wind direction, weighted by
//! how far up the mesh (in UV space) the vertex sits.

use crate::feature::FeatureDecl;
use crate::resource::{ResourceRequirement, ShaderStage, ValueType, Varying};

use super::WIND;

const FUNCTIONS: &str = "\
fn wind_offset(position: vec3<f32>, height_weight: f32) -> vec3<f32> {
    let phase = dot(position, u_object.windDirection) * u_object.windFrequency + u_global.time * u_object.windSpeed;
    let gust = sin(phase * 0.37 + u_global.time * 1.3) * u_object.windGust;
    let sway = (sin(phase) + gust) * u_object.windStrength * height_weight * u_object.windFlexibility;
    return u_object.windDirection * sway;
}";

const VERTEX: &str = "\
let wind_displacement = wind_offset(local_position, clamp(1.0 - in.uv.y, 0.0, 1.0));
local_position = local_position + wind_displacement;
out.windSway = length(wind_displacement);";

pub(super) fn feature() -> FeatureDecl {
    let fields = [
        ("windDirection", ValueType::Vec3),
        ("windStrength", ValueType::F32),
        ("windSpeed", ValueType::F32),
        ("windFrequency", ValueType::F32),
        ("windGust", ValueType::F32),
        ("windFlexibility", ValueType::F32),
    ];

    FeatureDecl::new(WIND, ShaderStage::Vertex)
        .resources(
            fields
                .into_iter()
                .map(|(name, ty)| ResourceRequirement::per_object(name, ty).provided_by("wind")),
        )
        .functions(FUNCTIONS)
        .vertex_inject(VERTEX)
        .varying(Varying::new("windSway", ValueType::F32))
}
