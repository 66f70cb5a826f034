use std::borrow::Cow;

use super::{GraphicsBackend, VariantPipelineDescriptor, vertex_buffer_layout};

/// [`GraphicsBackend`] over a `wgpu::Device`.
#[derive(Debug, Clone)]
pub struct WgpuBackend {
    device: wgpu::Device,
}

impl WgpuBackend {
    #[must_use]
    pub fn new(device: wgpu::Device) -> Self {
        Self { device }
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

impl GraphicsBackend for WgpuBackend {
    type ShaderModule = wgpu::ShaderModule;
    type BindGroupLayout = wgpu::BindGroupLayout;
    type PipelineLayout = wgpu::PipelineLayout;
    type RenderPipeline = wgpu::RenderPipeline;

    fn compile_shader_module(&self, source: &str, label: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_owned())),
            })
    }

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> wgpu::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
    }

    fn create_pipeline_layout(
        &self,
        label: &str,
        layouts: [&wgpu::BindGroupLayout; 4],
    ) -> wgpu::PipelineLayout {
        self.device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &layouts.map(Some),
                immediate_size: 0,
            })
    }

    fn create_render_pipeline(
        &self,
        descriptor: &VariantPipelineDescriptor<'_, Self>,
    ) -> wgpu::RenderPipeline {
        let buffers = [vertex_buffer_layout()];
        let targets = [Some(wgpu::ColorTargetState {
            format: descriptor.color_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(descriptor.label),
                layout: Some(descriptor.layout),
                vertex: wgpu::VertexState {
                    module: descriptor.module,
                    entry_point: Some("vs_main"),
                    buffers: &buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: descriptor.module,
                    entry_point: Some("fs_main"),
                    targets: &targets,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: descriptor.cull_mode.to_wgpu(),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: descriptor.depth_format,
                    depth_write_enabled: Some(true),
                    depth_compare: Some(descriptor.depth_compare),
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
    }
}
