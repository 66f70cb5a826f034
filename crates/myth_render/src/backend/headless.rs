//! Recording backend.
//!
//! Produces plain-data handles carrying a unique id plus the description they
//! were created from, and counts every call. Handle ids make identity visible
//! in assertions without a device.

use std::cell::Cell;

use super::{CullMode, GraphicsBackend, VariantPipelineDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessShaderModule {
    pub id: u64,
    pub label: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessBindGroupLayout {
    pub id: u64,
    pub label: String,
    pub entries: Vec<wgpu::BindGroupLayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessPipelineLayout {
    pub id: u64,
    pub label: String,
    /// Ids of the group 0..=3 layouts.
    pub bind_group_layouts: [u64; 4],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessRenderPipeline {
    pub id: u64,
    pub label: String,
    pub layout: u64,
    pub module: u64,
    pub cull_mode: CullMode,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub depth_compare: wgpu::CompareFunction,
}

/// Call counts of a [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessCounts {
    pub shader_modules: usize,
    pub bind_group_layouts: usize,
    pub pipeline_layouts: usize,
    pub render_pipelines: usize,
}

/// [`GraphicsBackend`] that records instead of creating GPU objects.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: Cell<u64>,
    counts: Cell<HeadlessCounts>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn counts(&self) -> HeadlessCounts {
        self.counts.get()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn record(&self, f: impl FnOnce(&mut HeadlessCounts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }
}

impl GraphicsBackend for HeadlessBackend {
    type ShaderModule = HeadlessShaderModule;
    type BindGroupLayout = HeadlessBindGroupLayout;
    type PipelineLayout = HeadlessPipelineLayout;
    type RenderPipeline = HeadlessRenderPipeline;

    fn compile_shader_module(&self, source: &str, label: &str) -> HeadlessShaderModule {
        self.record(|c| c.shader_modules += 1);
        HeadlessShaderModule {
            id: self.next_id(),
            label: label.to_owned(),
            source: source.to_owned(),
        }
    }

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> HeadlessBindGroupLayout {
        self.record(|c| c.bind_group_layouts += 1);
        HeadlessBindGroupLayout {
            id: self.next_id(),
            label: label.to_owned(),
            entries: entries.to_vec(),
        }
    }

    fn create_pipeline_layout(
        &self,
        label: &str,
        layouts: [&HeadlessBindGroupLayout; 4],
    ) -> HeadlessPipelineLayout {
        self.record(|c| c.pipeline_layouts += 1);
        HeadlessPipelineLayout {
            id: self.next_id(),
            label: label.to_owned(),
            bind_group_layouts: layouts.map(|l| l.id),
        }
    }

    fn create_render_pipeline(
        &self,
        descriptor: &VariantPipelineDescriptor<'_, Self>,
    ) -> HeadlessRenderPipeline {
        self.record(|c| c.render_pipelines += 1);
        HeadlessRenderPipeline {
            id: self.next_id(),
            label: descriptor.label.to_owned(),
            layout: descriptor.layout.id,
            module: descriptor.module.id,
            cull_mode: descriptor.cull_mode,
            color_format: descriptor.color_format,
            depth_format: descriptor.depth_format,
            depth_compare: descriptor.depth_compare,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_get_unique_ids_and_calls_are_counted() {
        let backend = HeadlessBackend::new();
        let a = backend.create_bind_group_layout("a", &[]);
        let b = backend.create_bind_group_layout("b", &[]);
        assert_ne!(a.id, b.id);

        let layout = backend.create_pipeline_layout("p", [&a, &b, &a, &b]);
        assert_eq!(layout.bind_group_layouts, [a.id, b.id, a.id, b.id]);

        let counts = backend.counts();
        assert_eq!(counts.bind_group_layouts, 2);
        assert_eq!(counts.pipeline_layouts, 1);
        assert_eq!(counts.shader_modules, 0);
    }
}
