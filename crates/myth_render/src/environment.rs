//! Environment Collaborator
//!
//! Group 3 is owned by a shared environment object outside the variant
//! caches. The pipeline manager only asks it for a layout matching a
//! capability mask; the draw path asks it for named resources.
//!
//! [`SharedEnvironment`] is the reference implementation: it keeps one layout
//! per distinct mask (built from the canonical environment table) so every
//! variant with the same mask binds against the same layout object.

use std::sync::Arc;

use myth_shader::EnvironmentMask;
use rustc_hash::FxHashMap;

use crate::backend::GraphicsBackend;
use crate::layout::environment_layout_entries;

/// Supplies Group 3 layouts by capability mask.
pub trait EnvironmentLayouts<B: GraphicsBackend> {
    /// Layout containing exactly the slots selected by `mask`.
    ///
    /// Repeated calls with the same mask should return the same layout.
    fn layout_for_mask(&mut self, backend: &B, mask: EnvironmentMask) -> Arc<B::BindGroupLayout>;
}

/// Name-indexed access to live environment resources.
pub trait EnvironmentResources<R> {
    fn resource(&self, name: &str) -> Option<R>;
}

/// Layout-per-mask cache plus a named resource table.
pub struct SharedEnvironment<B: GraphicsBackend, R> {
    layouts: FxHashMap<EnvironmentMask, Arc<B::BindGroupLayout>>,
    resources: FxHashMap<String, R>,
}

impl<B: GraphicsBackend, R> Default for SharedEnvironment<B, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GraphicsBackend, R> SharedEnvironment<B, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            layouts: FxHashMap::default(),
            resources: FxHashMap::default(),
        }
    }

    /// Binds `resource` under an environment slot name, returning the old one.
    pub fn set_resource(&mut self, name: impl Into<String>, resource: R) -> Option<R> {
        self.resources.insert(name.into(), resource)
    }

    pub fn remove_resource(&mut self, name: &str) -> Option<R> {
        self.resources.remove(name)
    }

    #[inline]
    #[must_use]
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Drops cached layouts. Pipelines built against them stay valid.
    pub fn clear_layouts(&mut self) {
        self.layouts.clear();
    }
}

impl<B: GraphicsBackend, R> EnvironmentLayouts<B> for SharedEnvironment<B, R> {
    fn layout_for_mask(&mut self, backend: &B, mask: EnvironmentMask) -> Arc<B::BindGroupLayout> {
        self.layouts
            .entry(mask)
            .or_insert_with(|| {
                log::debug!("Creating environment layout for mask {:#06x}", mask.bits());
                Arc::new(backend.create_bind_group_layout(
                    &format!("Environment Layout {:#06x}", mask.bits()),
                    &environment_layout_entries(mask),
                ))
            })
            .clone()
    }
}

impl<B: GraphicsBackend, R: Clone> EnvironmentResources<R> for SharedEnvironment<B, R> {
    fn resource(&self, name: &str) -> Option<R> {
        self.resources.get(name).cloned()
    }
}
