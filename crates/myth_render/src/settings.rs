//! Variant Pipeline Settings
//!
//! Fixed render-target state baked into every variant pipeline.
//!
//! ```rust,ignore
//! use myth_render::VariantPipelineSettings;
//!
//! // HDR forward target, reversed-Z depth (the defaults)
//! let settings = VariantPipelineSettings::default();
//!
//! // LDR swapchain target, dump generated WGSL while debugging
//! let settings = VariantPipelineSettings {
//!     color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
//!     dump_shader_source: true,
//!     ..Default::default()
//! };
//! ```

/// Render-target state shared by all variant pipelines.
///
/// Changing settings on a live manager drops its cached pipelines; compiled
/// shader modules are independent of these values and survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPipelineSettings {
    /// Format of the single color target.
    pub color_format: wgpu::TextureFormat,
    /// Depth attachment format.
    pub depth_format: wgpu::TextureFormat,
    /// Depth test. `Greater` for the engine's reversed-Z convention.
    pub depth_compare: wgpu::CompareFunction,
    /// Log each newly composed shader's full source at `trace` level.
    pub dump_shader_source: bool,
}

impl Default for VariantPipelineSettings {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba16Float,
            depth_format: wgpu::TextureFormat::Depth32Float,
            depth_compare: wgpu::CompareFunction::Greater,
            dump_shader_source: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_reversed_z() {
        let settings = VariantPipelineSettings::default();
        assert_eq!(settings.depth_compare, wgpu::CompareFunction::Greater);
        assert_eq!(settings.depth_format, wgpu::TextureFormat::Depth32Float);
        assert_eq!(settings.color_format, wgpu::TextureFormat::Rgba16Float);
        assert!(!settings.dump_shader_source);
    }
}
