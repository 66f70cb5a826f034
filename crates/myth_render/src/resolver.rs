//! Resource Resolver
//!
//! Maps a composed shader's binding declarations to live resources at draw
//! time. Each binding names a provider label; the resolver keeps a registry
//! from label to a typed accessor that pulls the named resource out of an
//! entity. Bindings whose provider is unknown, absent on the entity, or unable
//! to supply the name are omitted, so the result may be shorter than the
//! layout. Completeness is left to backend validation.
//!
//! ```rust,ignore
//! let mut resolver = ResourceResolver::<Entity, GpuResource>::new();
//! resolver.register_provider("material", |e: &Entity| e.material.as_ref());
//! resolver.register("weather", |e: &Entity, name| e.weather.as_ref()?.lookup(name));
//!
//! let resolved = resolver.resolve(&entity, &pipeline.variant.shader.binding_layout);
//! let entries = bind_group_entries(&resolved);
//! ```

use std::borrow::Cow;

use myth_shader::BindingEntry;
use rustc_hash::FxHashMap;

use crate::environment::EnvironmentResources;

/// A component able to supply resources by name.
pub trait ResourceProvider<R> {
    fn resource(&self, name: &str) -> Option<R>;
}

type Accessor<E, R> = Box<dyn Fn(&E, &str) -> Option<R>>;

/// One binding paired with the resource that fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding<R> {
    pub binding: u32,
    pub name: Cow<'static, str>,
    pub resource: R,
}

/// Provider label → accessor registry.
pub struct ResourceResolver<E, R> {
    accessors: FxHashMap<String, Accessor<E, R>>,
}

impl<E: 'static, R: 'static> Default for ResourceResolver<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static, R: 'static> ResourceResolver<E, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accessors: FxHashMap::default(),
        }
    }

    /// Registers an accessor for `provider`. Returns `true` if one was replaced.
    pub fn register(
        &mut self,
        provider: impl Into<String>,
        accessor: impl Fn(&E, &str) -> Option<R> + 'static,
    ) -> bool {
        self.accessors
            .insert(provider.into(), Box::new(accessor))
            .is_some()
    }

    /// Registers `provider` as a component of type `C`, located on the entity
    /// by `component`.
    pub fn register_provider<C: ResourceProvider<R> + 'static>(
        &mut self,
        provider: impl Into<String>,
        component: impl Fn(&E) -> Option<&C> + 'static,
    ) -> bool {
        self.register(provider, move |entity: &E, name: &str| {
            component(entity)?.resource(name)
        })
    }

    #[must_use]
    pub fn has_provider(&self, provider: &str) -> bool {
        self.accessors.contains_key(provider)
    }

    /// Resolves `bindings` against `entity`, in binding order.
    pub fn resolve(&self, entity: &E, bindings: &[BindingEntry]) -> Vec<ResolvedBinding<R>> {
        bindings
            .iter()
            .filter_map(|b| {
                let resource = self
                    .accessors
                    .get(&*b.provider)
                    .and_then(|accessor| accessor(entity, &*b.name));
                if resource.is_none() {
                    log::trace!(
                        "Binding {} '{}' not supplied by provider '{}'; omitted",
                        b.binding,
                        b.name,
                        b.provider
                    );
                }
                resource.map(|resource| resolved(b, resource))
            })
            .collect()
    }
}

/// Resolves environment `bindings` against the shared environment.
pub fn resolve_environment<R>(
    environment: &impl EnvironmentResources<R>,
    bindings: &[BindingEntry],
) -> Vec<ResolvedBinding<R>> {
    bindings
        .iter()
        .filter_map(|b| {
            let resource = environment.resource(&b.name);
            if resource.is_none() {
                log::trace!("Environment binding {} '{}' unavailable; omitted", b.binding, b.name);
            }
            resource.map(|resource| resolved(b, resource))
        })
        .collect()
}

fn resolved<R>(binding: &BindingEntry, resource: R) -> ResolvedBinding<R> {
    ResolvedBinding {
        binding: binding.binding,
        name: binding.name.clone(),
        resource,
    }
}

// ─── wgpu Resources ──────────────────────────────────────────────────────────

/// A live `wgpu` resource that can fill a binding.
#[derive(Debug, Clone)]
pub enum GpuResource {
    TextureView(wgpu::TextureView),
    Sampler(wgpu::Sampler),
    Buffer(wgpu::Buffer),
}

impl GpuResource {
    #[must_use]
    pub fn as_binding_resource(&self) -> wgpu::BindingResource<'_> {
        match self {
            Self::TextureView(view) => wgpu::BindingResource::TextureView(view),
            Self::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler),
            Self::Buffer(buffer) => buffer.as_entire_binding(),
        }
    }
}

/// Bind group entries for resolved `wgpu` resources.
#[must_use]
pub fn bind_group_entries(resolved: &[ResolvedBinding<GpuResource>]) -> Vec<wgpu::BindGroupEntry<'_>> {
    resolved
        .iter()
        .map(|r| wgpu::BindGroupEntry {
            binding: r.binding,
            resource: r.resource.as_binding_resource(),
        })
        .collect()
}
