//! Base Template Rendering
//!
//! The base shader is a WGSL file with named injection markers written as
//! `/*{{MARKER}}*/`. Because the marker syntax is also a WGSL block comment,
//! the raw template is itself valid WGSL and can be inspected with ordinary
//! tooling. Rendering substitutes every marker with the matching field of
//! [`ShaderSections`]; an unmatched marker is an error.
//!
//! | Marker                       | Content                                   |
//! |------------------------------|-------------------------------------------|
//! | `PER_OBJECT_UNIFORMS`        | fields appended to `ObjectUniforms`       |
//! | `TEXTURE_BINDINGS`           | Group 2 declarations                      |
//! | `ENVIRONMENT_BINDINGS`       | struct defs + Group 3 declarations        |
//! | `VARYINGS`                   | extra `VertexOutput` fields               |
//! | `FUNCTIONS`                  | helper routines, tagged per feature       |
//! | `VERTEX_INJECT`              | vertex body fragments                     |
//! | `FRAGMENT_TEXTURE_SAMPLING`  | exclusive: owned by `textured`            |
//! | `FRAGMENT_SHADOW`            | exclusive: owned by `shadow`              |
//! | `FRAGMENT_PRE_LIGHTING`      | concatenated, dependency order            |
//! | `FRAGMENT_AMBIENT`           | exclusive: owned by `ibl`                 |
//! | `FRAGMENT_POST`              | concatenated, dependency order            |

use std::borrow::Cow;

use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::errors::Result;

#[derive(RustEmbed)]
#[folder = "src/shaders"]
struct ShaderAssets;

/// Name the base template is registered under.
pub const BASE_TEMPLATE: &str = "variant";

/// Every injection marker the base template must contain, in template order.
pub const MARKERS: [&str; 11] = [
    "PER_OBJECT_UNIFORMS",
    "TEXTURE_BINDINGS",
    "ENVIRONMENT_BINDINGS",
    "VARYINGS",
    "FUNCTIONS",
    "VERTEX_INJECT",
    "FRAGMENT_TEXTURE_SAMPLING",
    "FRAGMENT_SHADOW",
    "FRAGMENT_PRE_LIGHTING",
    "FRAGMENT_AMBIENT",
    "FRAGMENT_POST",
];

/// Generated source for each injection marker.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ShaderSections {
    pub per_object_uniforms: String,
    pub texture_bindings: String,
    pub environment_bindings: String,
    pub varyings: String,
    pub functions: String,
    pub vertex_inject: String,
    pub fragment_texture_sampling: String,
    pub fragment_shadow: String,
    pub fragment_pre_lighting: String,
    pub fragment_ambient: String,
    pub fragment_post: String,
}

/// Where the base template source comes from.
#[derive(Debug, Clone)]
enum TemplateSource {
    /// The embedded `variant.wgsl` (read from disk in debug builds).
    Embedded,
    /// A caller-supplied override.
    Inline(String),
}

/// Owns the template environment the composer renders through.
pub struct ShaderTemplate {
    env: Environment<'static>,
    source: TemplateSource,
}

impl std::fmt::Debug for ShaderTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderTemplate")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl ShaderTemplate {
    /// Template backed by the embedded base shader.
    #[must_use]
    pub fn embedded() -> Self {
        let mut env = base_environment();
        env.set_loader(shader_loader);
        Self {
            env,
            source: TemplateSource::Embedded,
        }
    }

    /// Template backed by caller-supplied source. The source is parsed
    /// immediately so syntax errors surface here rather than at compose time.
    pub fn from_source(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut env = base_environment();
        env.add_template_owned(BASE_TEMPLATE, source.clone())?;
        Ok(Self {
            env,
            source: TemplateSource::Inline(source),
        })
    }

    /// Fills every marker with its section.
    pub fn render(&self, sections: &ShaderSections) -> Result<String> {
        let template = self.env.get_template(BASE_TEMPLATE)?;
        Ok(template.render(sections)?)
    }

    /// The unrendered template text.
    pub fn raw_source(&self) -> Result<String> {
        match &self.source {
            TemplateSource::Inline(source) => Ok(source.clone()),
            TemplateSource::Embedded => shader_loader(BASE_TEMPLATE)?.ok_or_else(|| {
                Error::new(ErrorKind::TemplateNotFound, "embedded base template is missing").into()
            }),
        }
    }

    /// Drops the parsed template so the next render re-reads it.
    ///
    /// Only meaningful for the embedded template; in debug builds the loader
    /// reads from disk, so edits to `variant.wgsl` take effect.
    pub fn reload(&mut self) {
        if matches!(self.source, TemplateSource::Embedded) {
            self.env.clear_templates();
            log::debug!("Shader template '{BASE_TEMPLATE}' scheduled for reload");
        }
    }
}

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("/*{{", "}}*/")
        .build()
        .expect("Failed to configure shader template syntax");

    env.set_syntax(syntax);
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    #[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
    {
        let path = std::path::Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/src/shaders"))
            .join(filename.as_ref());
        if path.exists() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("Failed to read file: {e}"),
                )
            });
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}
