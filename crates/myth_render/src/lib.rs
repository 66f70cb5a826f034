//! # Myth Render
//!
//! GPU side of the Myth shader variant system.
//!
//! - [`VariantCache`]: composes and compiles each feature combination once.
//! - [`VariantPipelineManager`]: builds and caches the render pipeline for a
//!   variant and cull mode, wiring in the shared bind group layouts.
//! - [`ResourceResolver`]: fills a variant's bindings from entity components
//!   and the shared environment at draw time.
//!
//! All device access goes through [`GraphicsBackend`]. [`WgpuBackend`] drives
//! a real `wgpu::Device`; [`HeadlessBackend`] records calls for tests.
//!
//! Everything here runs on the thread that owns the graphics context. There
//! is no internal locking.

pub mod backend;
pub mod environment;
pub mod layout;
pub mod pipeline_manager;
pub mod resolver;
pub mod settings;
pub mod variant_cache;

pub use backend::{
    CullMode, GraphicsBackend, HeadlessBackend, VERTEX_ATTRIBUTES, VERTEX_STRIDE,
    VariantPipelineDescriptor, WgpuBackend, vertex_buffer_layout,
};
pub use environment::{EnvironmentLayouts, EnvironmentResources, SharedEnvironment};
pub use layout::{environment_layout_entries, texture_layout_entries};
pub use pipeline_manager::{PipelineEntry, PipelineKey, PipelineStats, VariantPipelineManager};
pub use resolver::{
    GpuResource, ResolvedBinding, ResourceProvider, ResourceResolver, bind_group_entries,
    resolve_environment,
};
pub use settings::VariantPipelineSettings;
pub use variant_cache::{VariantCache, VariantEntry};
