//! Error Types
//!
//! Every failure the composer can report is a configuration error in a
//! feature declaration. They are detected while composing, before any GPU
//! object exists, and are never worth retrying.
//!
//! ```rust,ignore
//! use myth_shader::errors::{Result, ShaderError};
//!
//! match composer.compose(&["shadow", "textured"]) {
//!     Ok(shader) => println!("{}", shader.feature_key),
//!     Err(ShaderError::UnknownFeature { id, .. }) => eprintln!("missing feature {id}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

use thiserror::Error;

use crate::resource::ResourceGroup;

/// Errors produced while composing a shader variant.
#[derive(Error, Debug)]
pub enum ShaderError {
    // ========================================================================
    // Feature Resolution Errors
    // ========================================================================
    /// A requested feature (or a declared dependency) is not registered.
    #[error("Unknown feature '{id}'{}", required_by.as_ref().map(|f| format!(" (required by '{f}')")).unwrap_or_default())]
    UnknownFeature {
        /// The unregistered feature id
        id: String,
        /// The feature that declared the dependency, if any
        required_by: Option<String>,
    },

    /// A feature id that cannot appear in a feature key.
    #[error("Invalid feature id '{id}': ids must be non-empty and must not contain '+'")]
    InvalidFeatureId {
        /// The rejected id
        id: String,
    },

    /// A feature depends on itself through its declared dependencies.
    #[error("Feature dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle {
        /// The dependency path, starting and ending with the same id
        chain: Vec<String>,
    },

    // ========================================================================
    // Resource Declaration Errors
    // ========================================================================
    /// Two features declare the same resource name in the same group with
    /// different kinds or types.
    #[error(
        "Resource type conflict: feature '{feature}' declares {group} resource '{name}' as {incoming}, \
         but feature '{existing_feature}' already declared it as {existing}. \
         Rename one of the resources to resolve the conflict."
    )]
    ResourceTypeConflict {
        /// The feature whose declaration collided
        feature: String,
        /// The feature that declared the resource first
        existing_feature: String,
        /// The shared resource name
        name: String,
        /// The group both declarations live in
        group: ResourceGroup,
        /// Description of the first-seen declaration
        existing: String,
        /// Description of the colliding declaration
        incoming: String,
    },

    /// An environment resource is not part of the canonical environment table.
    #[error("Unknown environment resource '{name}' declared by feature '{feature}'")]
    UnknownEnvironmentResource {
        /// The declaring feature
        feature: String,
        /// The unknown resource name
        name: String,
    },

    /// An environment resource disagrees with the canonical table's type.
    #[error(
        "Environment resource '{name}' declared by feature '{feature}' as {found}, \
         but the environment table defines it as {expected}"
    )]
    EnvironmentTypeMismatch {
        /// The declaring feature
        feature: String,
        /// The resource name
        name: String,
        /// Canonical type description
        expected: String,
        /// Declared type description
        found: String,
    },

    /// Per-object resources become fields of the object uniform struct and
    /// therefore must be uniform values.
    #[error("Per-object resource '{name}' declared by feature '{feature}' must be a uniform value")]
    InvalidPerObjectResource {
        /// The declaring feature
        feature: String,
        /// The offending resource name
        name: String,
    },

    /// Struct uniforms are only available as environment slots, whose
    /// definitions come from the environment table.
    #[error("Texture-group resource '{name}' declared by feature '{feature}' cannot be a struct uniform")]
    InvalidTextureResource {
        /// The declaring feature
        feature: String,
        /// The offending resource name
        name: String,
    },

    // ========================================================================
    // Template Errors
    // ========================================================================
    /// The base template failed to load or render.
    #[error("Shader template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Alias for `Result<T, ShaderError>`.
pub type Result<T> = std::result::Result<T, ShaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_feature_mentions_dependent() {
        let err = ShaderError::UnknownFeature {
            id: "fog".into(),
            required_by: Some("snow".into()),
        };
        assert_eq!(err.to_string(), "Unknown feature 'fog' (required by 'snow')");

        let err = ShaderError::UnknownFeature {
            id: "fog".into(),
            required_by: None,
        };
        assert_eq!(err.to_string(), "Unknown feature 'fog'");
    }

    #[test]
    fn conflict_message_recommends_rename() {
        let err = ShaderError::ResourceTypeConflict {
            feature: "b".into(),
            existing_feature: "a".into(),
            name: "x".into(),
            group: ResourceGroup::Textures,
            existing: "texture_2d<f32>".into(),
            incoming: "sampler".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'a'"));
        assert!(msg.contains("'b'"));
        assert!(msg.contains("Rename"));
    }
}
