//! Feature Declarations
//!
//! A feature is an independently authored shader capability: the resources it
//! needs, the helper functions it contributes, and the source fragments it
//! injects into the base template. Declarations are immutable once built.
//!
//! ```rust,ignore
//! use myth_shader::{FeatureDecl, ResourceRequirement, ShaderStage, ValueType};
//!
//! let fog = FeatureDecl::new("fog", ShaderStage::Fragment)
//!     .resource(ResourceRequirement::per_object("fogDensity", ValueType::F32).provided_by("fog"))
//!     .functions("fn fog_factor(d: f32) -> f32 { return exp(-d * u_object.fogDensity); }")
//!     .fragment_post_inject("color = mix(vec3<f32>(0.5), color, fog_factor(length(V)));");
//! ```

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::resource::{ResourceRequirement, ShaderStage, Varying};

/// Immutable declaration of a shader feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDecl {
    /// Globally unique identifier.
    pub id: Cow<'static, str>,
    pub stage: ShaderStage,
    /// Resource requirements, in declaration order.
    pub resources: Vec<ResourceRequirement>,
    /// Helper routines emitted once, in dependency order.
    pub functions: Cow<'static, str>,
    pub vertex_inject: Option<Cow<'static, str>>,
    /// Fragment body for the exclusive slot this feature owns (if any).
    pub fragment_inject: Option<Cow<'static, str>>,
    pub fragment_pre_lighting_inject: Option<Cow<'static, str>>,
    pub fragment_post_inject: Option<Cow<'static, str>>,
    pub varyings: Vec<Varying>,
    /// Features that must be composed before this one.
    pub dependencies: SmallVec<[Cow<'static, str>; 2]>,
}

impl FeatureDecl {
    /// Starts an empty declaration.
    pub fn new(id: impl Into<Cow<'static, str>>, stage: ShaderStage) -> Self {
        Self {
            id: id.into(),
            stage,
            resources: Vec::new(),
            functions: Cow::Borrowed(""),
            vertex_inject: None,
            fragment_inject: None,
            fragment_pre_lighting_inject: None,
            fragment_post_inject: None,
            varyings: Vec::new(),
            dependencies: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn resource(mut self, requirement: ResourceRequirement) -> Self {
        self.resources.push(requirement);
        self
    }

    #[must_use]
    pub fn resources(mut self, requirements: impl IntoIterator<Item = ResourceRequirement>) -> Self {
        self.resources.extend(requirements);
        self
    }

    #[must_use]
    pub fn functions(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.functions = source.into();
        self
    }

    #[must_use]
    pub fn vertex_inject(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.vertex_inject = Some(source.into());
        self
    }

    #[must_use]
    pub fn fragment_inject(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.fragment_inject = Some(source.into());
        self
    }

    #[must_use]
    pub fn fragment_pre_lighting_inject(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.fragment_pre_lighting_inject = Some(source.into());
        self
    }

    #[must_use]
    pub fn fragment_post_inject(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.fragment_post_inject = Some(source.into());
        self
    }

    #[must_use]
    pub fn varying(mut self, varying: Varying) -> Self {
        self.varyings.push(varying);
        self
    }

    #[must_use]
    pub fn depends_on(mut self, id: impl Into<Cow<'static, str>>) -> Self {
        self.dependencies.push(id.into());
        self
    }
}
