//! Shader Composer
//!
//! Turns a set of feature ids into one WGSL module plus the layout metadata
//! the pipeline and draw paths need. Composition is a pure function of the
//! registry, the template and the requested id *set*: the ids are
//! canonicalised through [`FeatureKey`] before resolution, so any permutation
//! of a request produces a byte-identical [`ComposedShader`].
//!
//! # Pipeline
//!
//! 1. **Resolve**: depth-first over the requested ids, dependencies first,
//!    each feature emitted once. Cycles and unknown ids are errors.
//! 2. **Deduplicate**: resources are bucketed by group and keyed by name.
//!    A repeated name must carry the identical [`ResourceKind`].
//! 3. **Assign bindings**: textures get `0..N` in first-seen order;
//!    environment bindings come from
//!    [`ENVIRONMENT_SLOTS`](crate::environment::ENVIRONMENT_SLOTS).
//! 4. **Generate**: fill a [`ShaderSections`] and render the base template.

use std::borrow::Cow;

use rustc_hash::FxHashSet;
use xxhash_rust::xxh3::xxh3_128;

use crate::environment::{EnvironmentMask, environment_slot};
use crate::errors::{Result, ShaderError};
use crate::feature::FeatureDecl;
use crate::features::{IBL, SHADOW, TEXTURED};
use crate::key::{FeatureKey, canonical_ids};
use crate::registry::FeatureRegistry;
use crate::resource::{ResourceGroup, ResourceKind, ResourceRequirement, ShaderStage, ValueType};
use crate::template::{ShaderSections, ShaderTemplate};

/// Fixed fields of `ObjectUniforms` in the base template.
pub const BASE_OBJECT_FIELDS: [(&str, ValueType); 6] = [
    ("model", ValueType::Mat4),
    ("normal_matrix", ValueType::Mat4),
    ("base_color", ValueType::Vec4),
    ("emissive", ValueType::Vec3),
    ("metallic", ValueType::F32),
    ("roughness", ValueType::F32),
];

/// Number of `@location`s the base `VertexOutput` already uses.
pub const BASE_VARYING_LOCATIONS: u32 = 3;

const BASE_OWNER: &str = "<base>";

// ─── Composed Output ─────────────────────────────────────────────────────────

/// A Group 2 or Group 3 binding of a composed shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    pub name: Cow<'static, str>,
    pub binding: u32,
    pub kind: ResourceKind,
    /// Union of the stages of every feature that declared the binding.
    pub visibility: ShaderStage,
    pub provider: Cow<'static, str>,
    /// The feature that declared the binding first.
    pub feature: Cow<'static, str>,
}

impl BindingEntry {
    /// WGSL declaration of the binding in `group`.
    #[must_use]
    pub fn declaration(&self, group: ResourceGroup) -> String {
        format!(
            "{};",
            self.kind
                .wgsl_declaration(group.group_index(), self.binding, &self.name)
        )
    }
}

/// A field appended to `ObjectUniforms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: Cow<'static, str>,
    pub ty: ValueType,
    pub provider: Cow<'static, str>,
    pub feature: Cow<'static, str>,
}

/// Byte placement of one appended field inside `ObjectUniforms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOffset<'a> {
    pub name: &'a str,
    pub offset: u32,
    pub size: u32,
}

/// Deduplicated per-object uniform fields, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
}

impl UniformLayout {
    /// End offset of the fixed base fields.
    pub const BASE_END: u32 = 164;

    /// Struct alignment of `ObjectUniforms` (driven by its matrices).
    pub const STRUCT_ALIGN: u32 = 16;

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| &*f.name)
    }

    /// Offsets of the appended fields under WGSL uniform layout rules.
    #[must_use]
    pub fn offsets(&self) -> Vec<FieldOffset<'_>> {
        let mut cursor = Self::BASE_END;
        self.fields
            .iter()
            .filter_map(|field| {
                let (align, size) = field.ty.align_and_size()?;
                let offset = cursor.next_multiple_of(align);
                cursor = offset + size;
                Some(FieldOffset {
                    name: &field.name,
                    offset,
                    size,
                })
            })
            .collect()
    }

    /// Total size of `ObjectUniforms` in bytes, including trailing padding.
    #[must_use]
    pub fn size(&self) -> u32 {
        let end = self
            .offsets()
            .last()
            .map_or(Self::BASE_END, |f| f.offset + f.size);
        end.next_multiple_of(Self::STRUCT_ALIGN)
    }

    fn push(&mut self, field: UniformField) {
        self.fields.push(field);
    }
}

/// The result of composing one feature set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedShader {
    /// Final WGSL source.
    pub source: String,
    pub uniform_layout: UniformLayout,
    /// Group 2 bindings, indices `0..N`.
    pub binding_layout: Vec<BindingEntry>,
    /// Group 3 bindings, indices from the environment table, sorted by index.
    pub environment_layout: Vec<BindingEntry>,
    pub feature_key: FeatureKey,
    /// Resolved feature ids, dependencies first.
    pub features: Vec<String>,
    /// xxh3-128 of `source`.
    pub source_hash: u128,
}

impl ComposedShader {
    #[inline]
    #[must_use]
    pub fn has_texture_bindings(&self) -> bool {
        !self.binding_layout.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn has_environment_bindings(&self) -> bool {
        !self.environment_layout.is_empty()
    }

    /// Environment bits actually declared by the composed bindings.
    #[must_use]
    pub fn declared_environment_mask(&self) -> EnvironmentMask {
        self.environment_layout
            .iter()
            .fold(EnvironmentMask::empty(), |acc, b| {
                acc | EnvironmentMask::from_bits_truncate(1 << b.binding)
            })
    }

    #[must_use]
    pub fn has_feature(&self, id: &str) -> bool {
        self.features.iter().any(|f| f == id)
    }
}

// ─── Composer ────────────────────────────────────────────────────────────────

/// Exclusive fragment slots and the feature id that owns each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExclusiveSlot {
    TextureSampling,
    Shadow,
    Ambient,
}

impl ExclusiveSlot {
    fn for_owner(id: &str) -> Option<Self> {
        match id {
            TEXTURED => Some(Self::TextureSampling),
            SHADOW => Some(Self::Shadow),
            IBL => Some(Self::Ambient),
            _ => None,
        }
    }
}

/// Composes feature sets into WGSL against an owned registry and template.
#[derive(Debug)]
pub struct ShaderComposer {
    registry: FeatureRegistry,
    template: ShaderTemplate,
}

impl Default for ShaderComposer {
    fn default() -> Self {
        Self::new(FeatureRegistry::with_builtin_features())
    }
}

impl ShaderComposer {
    /// Composer over `registry` using the embedded base template.
    #[must_use]
    pub fn new(registry: FeatureRegistry) -> Self {
        Self {
            registry,
            template: ShaderTemplate::embedded(),
        }
    }

    /// Composer over `registry` using a caller-supplied base template.
    pub fn with_template(registry: FeatureRegistry, source: impl Into<String>) -> Result<Self> {
        Ok(Self {
            registry,
            template: ShaderTemplate::from_source(source)?,
        })
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut FeatureRegistry {
        &mut self.registry
    }

    /// Registers (or overrides) a feature. Returns the replaced declaration.
    pub fn register_feature(&mut self, decl: FeatureDecl) -> Result<Option<FeatureDecl>> {
        self.registry.register(decl)
    }

    /// Re-reads the base template on the next composition.
    pub fn reload_template(&mut self) {
        self.template.reload();
    }

    /// The feature declarations for `ids`, dependencies first.
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<&FeatureDecl>> {
        let mut ordered = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack = Vec::new();
        for id in canonical_ids(ids) {
            self.visit(id, None, &mut visited, &mut stack, &mut ordered)?;
        }
        Ok(ordered)
    }

    fn visit<'a>(
        &'a self,
        id: &str,
        required_by: Option<&str>,
        visited: &mut FxHashSet<&'a str>,
        stack: &mut Vec<&'a str>,
        ordered: &mut Vec<&'a FeatureDecl>,
    ) -> Result<()> {
        if let Some(pos) = stack.iter().position(|s| *s == id) {
            let mut chain: Vec<String> = stack[pos..].iter().map(ToString::to_string).collect();
            chain.push(id.to_string());
            return Err(ShaderError::DependencyCycle { chain });
        }
        if visited.contains(id) {
            return Ok(());
        }

        let decl = self
            .registry
            .get(id)
            .ok_or_else(|| ShaderError::UnknownFeature {
                id: id.to_string(),
                required_by: required_by.map(str::to_string),
            })?;

        stack.push(&*decl.id);
        for dep in &decl.dependencies {
            self.visit(dep, Some(&*decl.id), visited, stack, ordered)?;
        }
        stack.pop();

        visited.insert(&*decl.id);
        ordered.push(decl);
        Ok(())
    }

    /// Composes the shader for `ids`.
    pub fn compose<S: AsRef<str>>(&self, ids: &[S]) -> Result<ComposedShader> {
        let feature_key = FeatureKey::new(ids);
        let features = self.resolve(ids)?;
        let buckets = ResourceBuckets::collect(&features)?;

        let sections = generate_sections(&features, &buckets);
        let source = self.template.render(&sections)?;
        let source_hash = xxh3_128(source.as_bytes());

        log::debug!(
            "Composed shader variant '{}' ({} features, {} texture bindings, {} environment bindings)",
            feature_key,
            features.len(),
            buckets.textures.len(),
            buckets.environment.len()
        );

        Ok(ComposedShader {
            source,
            uniform_layout: buckets.uniforms,
            binding_layout: buckets.textures,
            environment_layout: buckets.environment,
            feature_key,
            features: features.iter().map(|f| f.id.to_string()).collect(),
            source_hash,
        })
    }
}

// ─── Resource Deduplication ──────────────────────────────────────────────────

#[derive(Default)]
struct ResourceBuckets {
    uniforms: UniformLayout,
    textures: Vec<BindingEntry>,
    environment: Vec<BindingEntry>,
}

impl ResourceBuckets {
    fn collect(features: &[&FeatureDecl]) -> Result<Self> {
        let mut buckets = Self::default();
        for feature in features {
            for requirement in &feature.resources {
                match requirement.group {
                    ResourceGroup::PerObject => buckets.add_uniform(feature, requirement)?,
                    ResourceGroup::Textures => buckets.add_texture(feature, requirement)?,
                    ResourceGroup::Environment => buckets.add_environment(feature, requirement)?,
                }
            }
        }
        buckets.environment.sort_by_key(|b| b.binding);
        Ok(buckets)
    }

    fn add_uniform(&mut self, feature: &FeatureDecl, req: &ResourceRequirement) -> Result<()> {
        let ty = match &req.kind {
            ResourceKind::Uniform(ty) if !matches!(ty, ValueType::Struct(_)) => ty,
            _ => {
                return Err(ShaderError::InvalidPerObjectResource {
                    feature: feature.id.to_string(),
                    name: req.name.to_string(),
                });
            }
        };

        if let Some((_, base_ty)) = BASE_OBJECT_FIELDS.iter().find(|(n, _)| *n == req.name) {
            return check_same_kind(
                feature,
                req,
                BASE_OWNER,
                &ResourceKind::Uniform(base_ty.clone()),
            );
        }

        if let Some(existing) = self.uniforms.get(&req.name) {
            return check_same_kind(
                feature,
                req,
                &existing.feature,
                &ResourceKind::Uniform(existing.ty.clone()),
            );
        }

        self.uniforms.push(UniformField {
            name: req.name.clone(),
            ty: ty.clone(),
            provider: req.provider.clone(),
            feature: feature.id.clone(),
        });
        Ok(())
    }

    fn add_texture(&mut self, feature: &FeatureDecl, req: &ResourceRequirement) -> Result<()> {
        if matches!(req.kind, ResourceKind::Uniform(ValueType::Struct(_))) {
            return Err(ShaderError::InvalidTextureResource {
                feature: feature.id.to_string(),
                name: req.name.to_string(),
            });
        }

        if let Some(existing) = self.textures.iter_mut().find(|b| b.name == req.name) {
            check_same_kind(feature, req, &existing.feature, &existing.kind)?;
            existing.visibility = existing.visibility.union(feature.stage);
            return Ok(());
        }

        let binding = self.textures.len() as u32;
        self.textures.push(new_binding(feature, req, binding));
        Ok(())
    }

    fn add_environment(&mut self, feature: &FeatureDecl, req: &ResourceRequirement) -> Result<()> {
        let slot =
            environment_slot(&req.name).ok_or_else(|| ShaderError::UnknownEnvironmentResource {
                feature: feature.id.to_string(),
                name: req.name.to_string(),
            })?;

        if slot.kind != req.kind {
            return Err(ShaderError::EnvironmentTypeMismatch {
                feature: feature.id.to_string(),
                name: req.name.to_string(),
                expected: slot.kind.to_string(),
                found: req.kind.to_string(),
            });
        }

        if let Some(existing) = self.environment.iter_mut().find(|b| b.name == req.name) {
            existing.visibility = existing.visibility.union(feature.stage);
            return Ok(());
        }

        self.environment.push(new_binding(feature, req, slot.binding));
        Ok(())
    }
}

fn new_binding(feature: &FeatureDecl, req: &ResourceRequirement, binding: u32) -> BindingEntry {
    BindingEntry {
        name: req.name.clone(),
        binding,
        kind: req.kind.clone(),
        visibility: feature.stage,
        provider: req.provider.clone(),
        feature: feature.id.clone(),
    }
}

fn check_same_kind(
    feature: &FeatureDecl,
    req: &ResourceRequirement,
    existing_feature: &str,
    existing: &ResourceKind,
) -> Result<()> {
    if *existing == req.kind {
        return Ok(());
    }
    Err(ShaderError::ResourceTypeConflict {
        feature: feature.id.to_string(),
        existing_feature: existing_feature.to_string(),
        name: req.name.to_string(),
        group: req.group,
        existing: existing.to_string(),
        incoming: req.kind.to_string(),
    })
}

// ─── Source Generation ───────────────────────────────────────────────────────

fn generate_sections(features: &[&FeatureDecl], buckets: &ResourceBuckets) -> ShaderSections {
    let mut sections = ShaderSections {
        per_object_uniforms: buckets
            .uniforms
            .fields()
            .iter()
            .map(|f| format!("    {}: {},\n", f.name, f.ty.wgsl()))
            .collect(),
        texture_bindings: buckets
            .textures
            .iter()
            .map(|b| b.declaration(ResourceGroup::Textures))
            .collect::<Vec<_>>()
            .join("\n"),
        environment_bindings: environment_section(&buckets.environment),
        varyings: varyings_section(features),
        functions: features
            .iter()
            .filter(|f| !f.functions.trim().is_empty())
            .map(|f| format!("// feature: {}\n{}", f.id, f.functions.trim_end()))
            .collect::<Vec<_>>()
            .join("\n\n"),
        ..Default::default()
    };

    sections.vertex_inject = body_section(features, |f| f.vertex_inject.as_deref());
    sections.fragment_pre_lighting =
        body_section(features, |f| f.fragment_pre_lighting_inject.as_deref());
    sections.fragment_post = body_section(features, |f| f.fragment_post_inject.as_deref());

    for feature in features {
        let Some(inject) = feature.fragment_inject.as_deref() else {
            continue;
        };
        let target = match ExclusiveSlot::for_owner(&feature.id) {
            Some(ExclusiveSlot::TextureSampling) => &mut sections.fragment_texture_sampling,
            Some(ExclusiveSlot::Shadow) => &mut sections.fragment_shadow,
            Some(ExclusiveSlot::Ambient) => &mut sections.fragment_ambient,
            None => {
                log::warn!(
                    "Feature '{}' provides a fragment injection but owns no exclusive slot; ignored",
                    feature.id
                );
                continue;
            }
        };
        *target = indent_body(&tagged(&feature.id, inject));
    }

    sections
}

fn environment_section(bindings: &[BindingEntry]) -> String {
    let mut out = Vec::new();
    let mut emitted: Vec<&str> = Vec::new();

    // Struct definitions ahead of any declaration that names them.
    for binding in bindings {
        if let Some(def) = environment_slot(&binding.name).and_then(|slot| slot.struct_def)
            && !emitted.contains(&def)
        {
            emitted.push(def);
            out.push(def.to_string());
        }
    }

    out.extend(
        bindings
            .iter()
            .map(|b| b.declaration(ResourceGroup::Environment)),
    );
    out.join("\n")
}

fn varyings_section(features: &[&FeatureDecl]) -> String {
    let mut seen: Vec<(&str, &ValueType)> = Vec::new();
    let mut out = String::new();
    for feature in features {
        for varying in &feature.varyings {
            if let Some((_, ty)) = seen.iter().find(|(n, _)| *n == varying.name) {
                if **ty != varying.ty {
                    log::warn!(
                        "Varying '{}' redeclared by feature '{}' with a different type; first declaration kept",
                        varying.name,
                        feature.id
                    );
                }
                continue;
            }
            let location = BASE_VARYING_LOCATIONS + seen.len() as u32;
            let interpolate = if varying.ty.is_integer() {
                " @interpolate(flat)"
            } else {
                ""
            };
            out.push_str(&format!(
                "    @location({location}){interpolate} {}: {},\n",
                varying.name,
                varying.ty.wgsl()
            ));
            seen.push((&*varying.name, &varying.ty));
        }
    }
    out
}

fn body_section<'a>(
    features: &[&'a FeatureDecl],
    inject: impl Fn(&'a FeatureDecl) -> Option<&'a str>,
) -> String {
    let parts: Vec<String> = features
        .iter()
        .filter_map(|&f| inject(f).map(|src| tagged(&f.id, src)))
        .collect();
    indent_body(&parts.join("\n\n"))
}

fn tagged(id: &str, source: &str) -> String {
    format!("// feature: {id}\n{}", source.trim())
}

/// Indents every line but the first, which inherits the marker's indentation.
fn indent_body(source: &str) -> String {
    let mut lines = source.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str("    ");
            out.push_str(line);
        }
    }
    out
}
