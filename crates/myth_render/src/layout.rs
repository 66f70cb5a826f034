//! Layout Conversion
//!
//! Maps composed binding metadata onto `wgpu` bind group layout entries.
//! Hosts use these to build the canonical textures layout once at startup;
//! the environment collaborator uses them to build per-mask layouts.

use myth_shader::{
    BindingEntry, EnvironmentMask, ResourceKind, SamplerKind, ShaderStage, TextureDimension,
    TextureSampleKind, slots_for_mask,
};

#[inline]
#[must_use]
pub fn shader_stages(stage: ShaderStage) -> wgpu::ShaderStages {
    match stage {
        ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
        ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        ShaderStage::Both => wgpu::ShaderStages::VERTEX_FRAGMENT,
    }
}

#[must_use]
pub fn binding_type(kind: &ResourceKind) -> wgpu::BindingType {
    match kind {
        ResourceKind::Uniform(_) => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        ResourceKind::Storage { read_only, .. } => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage {
                read_only: *read_only,
            },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        ResourceKind::Texture { sample, dimension } => wgpu::BindingType::Texture {
            sample_type: match sample {
                TextureSampleKind::Float => wgpu::TextureSampleType::Float { filterable: true },
                TextureSampleKind::UnfilterableFloat => {
                    wgpu::TextureSampleType::Float { filterable: false }
                }
                TextureSampleKind::Depth => wgpu::TextureSampleType::Depth,
                TextureSampleKind::Sint => wgpu::TextureSampleType::Sint,
                TextureSampleKind::Uint => wgpu::TextureSampleType::Uint,
            },
            view_dimension: match dimension {
                TextureDimension::D2 => wgpu::TextureViewDimension::D2,
                TextureDimension::D2Array => wgpu::TextureViewDimension::D2Array,
                TextureDimension::Cube => wgpu::TextureViewDimension::Cube,
                TextureDimension::CubeArray => wgpu::TextureViewDimension::CubeArray,
            },
            multisampled: false,
        },
        ResourceKind::Sampler(kind) => wgpu::BindingType::Sampler(match kind {
            SamplerKind::Filtering => wgpu::SamplerBindingType::Filtering,
            SamplerKind::NonFiltering => wgpu::SamplerBindingType::NonFiltering,
            SamplerKind::Comparison => wgpu::SamplerBindingType::Comparison,
        }),
    }
}

#[must_use]
pub fn layout_entry(
    binding: u32,
    kind: &ResourceKind,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: binding_type(kind),
        count: None,
    }
}

/// Layout entries for a composed shader's textures group.
///
/// The host's canonical Group 2 layout is shared by identity with every
/// textured variant, so build it from a composition that declares every
/// texture-group resource in use (for the built-in catalog,
/// `["textured", "wetness"]`), not from `textured` alone.
#[must_use]
pub fn texture_layout_entries(bindings: &[BindingEntry]) -> Vec<wgpu::BindGroupLayoutEntry> {
    bindings
        .iter()
        .map(|b| layout_entry(b.binding, &b.kind, shader_stages(b.visibility)))
        .collect()
}

/// Layout entries for the environment slots selected by `mask`.
///
/// Environment bindings are visible to both stages so one layout per mask
/// serves every variant regardless of which stage reads a slot.
#[must_use]
pub fn environment_layout_entries(mask: EnvironmentMask) -> Vec<wgpu::BindGroupLayoutEntry> {
    slots_for_mask(mask)
        .map(|slot| layout_entry(slot.binding, &slot.kind, wgpu::ShaderStages::VERTEX_FRAGMENT))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use myth_shader::ShaderComposer;

    #[test]
    fn textured_layout_matches_declarations() {
        let shader = ShaderComposer::default().compose(&["textured"]).unwrap();
        let entries = texture_layout_entries(&shader.binding_layout);
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].visibility, wgpu::ShaderStages::FRAGMENT);
        assert!(matches!(
            entries[0].ty,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                ..
            }
        ));
        assert_eq!(
            entries[1].ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
        );
    }

    #[test]
    fn shadow_environment_entries() {
        let entries = environment_layout_entries(myth_shader::mask_for_features(["shadow"]));
        let bindings: Vec<u32> = entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, [0, 1, 2, 3]);
        assert_eq!(
            entries[1].ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        );
        assert!(matches!(
            entries[3].ty,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                ..
            }
        ));
    }
}
