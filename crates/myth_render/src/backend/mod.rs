//! Graphics Backend Seam
//!
//! The caches never talk to a device directly. They go through
//! [`GraphicsBackend`], which accepts shader source and layout descriptions
//! and hands back opaque handles. Two implementations ship with the crate:
//!
//! | Backend             | Handles                  | Use                       |
//! |---------------------|--------------------------|---------------------------|
//! | [`WgpuBackend`]     | real `wgpu` objects      | the renderer              |
//! | [`HeadlessBackend`] | recorded descriptions    | tests, offline validation |
//!
//! Calls return immediately. Any asynchronous compilation or validation
//! failure is reported through the backend's own channel (for `wgpu`, error
//! scopes or the uncaptured-error handler), never through these methods.

mod headless;
mod wgpu_backend;

pub use headless::{
    HeadlessBackend, HeadlessBindGroupLayout, HeadlessCounts, HeadlessPipelineLayout,
    HeadlessRenderPipeline, HeadlessShaderModule,
};
pub use wgpu_backend::WgpuBackend;

/// Bytes per interleaved vertex: position, normal, uv.
pub const VERTEX_STRIDE: wgpu::BufferAddress = 32;

/// `position` (0, 3×f32, offset 0), `normal` (1, 3×f32, offset 12), `uv` (2, 2×f32, offset 24).
pub static VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// The single vertex buffer layout every variant pipeline uses.
#[must_use]
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Face culling baked into a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

impl CullMode {
    #[inline]
    #[must_use]
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            Self::None => None,
            Self::Front => Some(wgpu::Face::Front),
            Self::Back => Some(wgpu::Face::Back),
        }
    }
}

/// Everything a backend needs to build one variant pipeline.
pub struct VariantPipelineDescriptor<'a, B: GraphicsBackend + ?Sized> {
    pub label: &'a str,
    pub layout: &'a B::PipelineLayout,
    /// Module containing both `vs_main` and `fs_main`.
    pub module: &'a B::ShaderModule,
    pub cull_mode: CullMode,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub depth_compare: wgpu::CompareFunction,
}

/// Device operations the variant caches depend on.
///
/// Layout compatibility is decided by handle identity on real devices, so
/// callers share layouts through `Arc`s rather than rebuilding equal ones.
pub trait GraphicsBackend {
    type ShaderModule;
    type BindGroupLayout;
    type PipelineLayout;
    type RenderPipeline;

    fn compile_shader_module(&self, source: &str, label: &str) -> Self::ShaderModule;

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Self::BindGroupLayout;

    /// `layouts` are bound at groups 0, 1, 2, 3 in that order.
    fn create_pipeline_layout(
        &self,
        label: &str,
        layouts: [&Self::BindGroupLayout; 4],
    ) -> Self::PipelineLayout;

    fn create_render_pipeline(
        &self,
        descriptor: &VariantPipelineDescriptor<'_, Self>,
    ) -> Self::RenderPipeline;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_offsets() {
        let layout = vertex_buffer_layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 24]);
        let locations: Vec<_> = layout
            .attributes
            .iter()
            .map(|a| a.shader_location)
            .collect();
        assert_eq!(locations, [0, 1, 2]);
    }

    #[test]
    fn cull_modes() {
        assert_eq!(CullMode::None.to_wgpu(), None);
        assert_eq!(CullMode::Back.to_wgpu(), Some(wgpu::Face::Back));
        assert_eq!(CullMode::default(), CullMode::Back);
    }
}
