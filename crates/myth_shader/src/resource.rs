//! Resource Requirements
//!
//! Describes the GPU-visible bindings a feature needs. A requirement is
//! identified by its `(name, group)` pair; two features naming the same pair
//! must agree on the [`ResourceKind`] exactly, which the composer checks once
//! the features are combined.

use std::borrow::Cow;
use std::fmt;

/// Scalar, vector, matrix or named struct value type as spelled in WGSL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    F32,
    I32,
    U32,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    /// A named struct; the definition must be emitted by whoever owns the type.
    Struct(Cow<'static, str>),
}

impl ValueType {
    /// WGSL spelling of the type.
    #[must_use]
    pub fn wgsl(&self) -> Cow<'static, str> {
        match self {
            Self::F32 => Cow::Borrowed("f32"),
            Self::I32 => Cow::Borrowed("i32"),
            Self::U32 => Cow::Borrowed("u32"),
            Self::Vec2 => Cow::Borrowed("vec2<f32>"),
            Self::Vec3 => Cow::Borrowed("vec3<f32>"),
            Self::Vec4 => Cow::Borrowed("vec4<f32>"),
            Self::Mat3 => Cow::Borrowed("mat3x3<f32>"),
            Self::Mat4 => Cow::Borrowed("mat4x4<f32>"),
            Self::Struct(name) => name.clone(),
        }
    }

    /// `(align, size)` in bytes under WGSL host-shareable layout rules.
    ///
    /// Returns `None` for structs, whose layout is opaque here.
    #[must_use]
    pub fn align_and_size(&self) -> Option<(u32, u32)> {
        match self {
            Self::F32 | Self::I32 | Self::U32 => Some((4, 4)),
            Self::Vec2 => Some((8, 8)),
            Self::Vec3 => Some((16, 12)),
            Self::Vec4 => Some((16, 16)),
            Self::Mat3 => Some((16, 48)),
            Self::Mat4 => Some((16, 64)),
            Self::Struct(_) => None,
        }
    }

    /// Integer types cannot be interpolated and need `@interpolate(flat)`.
    #[inline]
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::I32 | Self::U32)
    }
}

/// Texel interpretation of a sampled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSampleKind {
    Float,
    UnfilterableFloat,
    Depth,
    Sint,
    Uint,
}

/// View dimension of a sampled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    D2,
    D2Array,
    Cube,
    CubeArray,
}

/// Sampler binding flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    Filtering,
    NonFiltering,
    Comparison,
}

/// Kind and type of a binding. Equality of two `ResourceKind`s is the
/// compatibility rule for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Uniform(ValueType),
    Texture {
        sample: TextureSampleKind,
        dimension: TextureDimension,
    },
    Sampler(SamplerKind),
    Storage {
        element: ValueType,
        read_only: bool,
    },
}

impl ResourceKind {
    /// Shorthand for a filterable float 2D texture.
    pub const TEXTURE_2D: Self = Self::Texture {
        sample: TextureSampleKind::Float,
        dimension: TextureDimension::D2,
    };

    /// Shorthand for a filterable float cube texture.
    pub const TEXTURE_CUBE: Self = Self::Texture {
        sample: TextureSampleKind::Float,
        dimension: TextureDimension::Cube,
    };

    /// WGSL type of the binding variable.
    #[must_use]
    pub fn wgsl_type(&self) -> String {
        match self {
            Self::Uniform(ty) => ty.wgsl().into_owned(),
            Self::Texture { sample, dimension } => {
                let dim = match dimension {
                    TextureDimension::D2 => "2d",
                    TextureDimension::D2Array => "2d_array",
                    TextureDimension::Cube => "cube",
                    TextureDimension::CubeArray => "cube_array",
                };
                match sample {
                    TextureSampleKind::Depth => format!("texture_depth_{dim}"),
                    TextureSampleKind::Float | TextureSampleKind::UnfilterableFloat => {
                        format!("texture_{dim}<f32>")
                    }
                    TextureSampleKind::Sint => format!("texture_{dim}<i32>"),
                    TextureSampleKind::Uint => format!("texture_{dim}<u32>"),
                }
            }
            Self::Sampler(SamplerKind::Comparison) => "sampler_comparison".to_string(),
            Self::Sampler(_) => "sampler".to_string(),
            Self::Storage { element, .. } => format!("array<{}>", element.wgsl()),
        }
    }

    /// Full WGSL declaration (without the trailing `;`) for a binding.
    #[must_use]
    pub fn wgsl_declaration(&self, group: u32, binding: u32, name: &str) -> String {
        match self {
            Self::Uniform(_) => format!(
                "@group({group}) @binding({binding}) var<uniform> {name}: {}",
                self.wgsl_type()
            ),
            Self::Storage { read_only, .. } => {
                let access = if *read_only { "read" } else { "read_write" };
                format!(
                    "@group({group}) @binding({binding}) var<storage, {access}> {name}: {}",
                    self.wgsl_type()
                )
            }
            Self::Texture { .. } | Self::Sampler(_) => format!(
                "@group({group}) @binding({binding}) var {name}: {}",
                self.wgsl_type()
            ),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(ty) => write!(f, "uniform {}", ty.wgsl()),
            Self::Texture {
                sample: TextureSampleKind::UnfilterableFloat,
                ..
            } => write!(f, "{} (unfilterable)", self.wgsl_type()),
            Self::Storage { read_only, .. } => {
                let access = if *read_only { "read" } else { "read_write" };
                write!(f, "storage<{access}> {}", self.wgsl_type())
            }
            _ => f.write_str(&self.wgsl_type()),
        }
    }
}

/// Bind group a requirement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceGroup {
    /// A field of the per-object uniform struct (Group 1).
    PerObject,
    /// A per-mesh texture-group binding (Group 2), indices assigned by the composer.
    Textures,
    /// A shared environment binding (Group 3), indices from the environment table.
    Environment,
}

impl ResourceGroup {
    /// Bind group index the group is bound at.
    #[inline]
    #[must_use]
    pub fn group_index(self) -> u32 {
        match self {
            Self::PerObject => 1,
            Self::Textures => 2,
            Self::Environment => 3,
        }
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PerObject => "per-object",
            Self::Textures => "textures",
            Self::Environment => "environment",
        })
    }
}

/// Pipeline stages a feature (and therefore its bindings) is active in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Both,
}

impl ShaderStage {
    /// Smallest stage set covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self == other { self } else { Self::Both }
    }

    #[inline]
    #[must_use]
    pub fn has_vertex(self) -> bool {
        matches!(self, Self::Vertex | Self::Both)
    }

    #[inline]
    #[must_use]
    pub fn has_fragment(self) -> bool {
        matches!(self, Self::Fragment | Self::Both)
    }
}

/// One GPU-visible binding a feature needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequirement {
    /// Canonical name; the deduplication key within a group.
    pub name: Cow<'static, str>,
    pub kind: ResourceKind,
    pub group: ResourceGroup,
    /// Label of the component type that supplies the live resource.
    pub provider: Cow<'static, str>,
}

impl ResourceRequirement {
    /// Creates a requirement in an explicit group.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        kind: ResourceKind,
        group: ResourceGroup,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            group,
            provider: Cow::Borrowed(""),
        }
    }

    /// A field appended to the per-object uniform struct.
    pub fn per_object(name: impl Into<Cow<'static, str>>, ty: ValueType) -> Self {
        Self::new(name, ResourceKind::Uniform(ty), ResourceGroup::PerObject)
    }

    /// A sampled texture in the textures group.
    pub fn texture(
        name: impl Into<Cow<'static, str>>,
        sample: TextureSampleKind,
        dimension: TextureDimension,
    ) -> Self {
        Self::new(
            name,
            ResourceKind::Texture { sample, dimension },
            ResourceGroup::Textures,
        )
    }

    /// A sampler in the textures group.
    pub fn sampler(name: impl Into<Cow<'static, str>>, kind: SamplerKind) -> Self {
        Self::new(name, ResourceKind::Sampler(kind), ResourceGroup::Textures)
    }

    /// A storage buffer (runtime-sized array) in the textures group.
    pub fn storage(name: impl Into<Cow<'static, str>>, element: ValueType, read_only: bool) -> Self {
        Self::new(
            name,
            ResourceKind::Storage { element, read_only },
            ResourceGroup::Textures,
        )
    }

    /// A binding resolved against the shared environment.
    pub fn environment(name: impl Into<Cow<'static, str>>, kind: ResourceKind) -> Self {
        Self::new(name, kind, ResourceGroup::Environment).provided_by("environment")
    }

    /// Moves the requirement into another group.
    #[must_use]
    pub fn in_group(mut self, group: ResourceGroup) -> Self {
        self.group = group;
        self
    }

    /// Sets the provider label.
    #[must_use]
    pub fn provided_by(mut self, provider: impl Into<Cow<'static, str>>) -> Self {
        self.provider = provider.into();
        self
    }
}

/// An extra interpolated field added to the vertex output struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varying {
    pub name: Cow<'static, str>,
    pub ty: ValueType,
}

impl Varying {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
