//! Built-in Feature Catalog
//!
//! Declarations shipped with the engine. They are plain data; the composer
//! treats them exactly like runtime-registered features.
//!
//! | Feature    | Stage    | Depends on | Contributes                                   |
//! |------------|----------|------------|-----------------------------------------------|
//! | `textured` | fragment | –          | PBR texture set (Group 2), texture sampling   |
//! | `shadow`   | fragment | –          | cascaded shadow lookup (Group 3)              |
//! | `ibl`      | fragment | –          | image-based ambient lighting (Group 3)        |
//! | `wind`     | vertex   | –          | vegetation sway, `windSway` varying           |
//! | `wetness`  | fragment | –          | darkened, glossy surfaces                     |
//! | `snow`     | fragment | `wetness`  | normal-facing snow cover                      |
//! | `ssr`      | fragment | `ibl`      | screen-space reflection blend                 |
//! | `probes`   | fragment | `ibl`      | local reflection probe contribution           |

mod ibl;
mod reflections;
mod shadow;
mod textured;
mod weather;
mod wind;

use crate::feature::FeatureDecl;

pub const TEXTURED: &str = "textured";
pub const SHADOW: &str = "shadow";
pub const IBL: &str = "ibl";
pub const WIND: &str = "wind";
pub const WETNESS: &str = "wetness";
pub const SNOW: &str = "snow";
pub const SSR: &str = "ssr";
pub const PROBES: &str = "probes";

/// Every built-in feature declaration.
#[must_use]
pub fn builtin_features() -> Vec<FeatureDecl> {
    vec![
        textured::feature(),
        shadow::feature(),
        ibl::feature(),
        wind::feature(),
        weather::wetness(),
        weather::snow(),
        reflections::ssr(),
        reflections::probes(),
    ]
}
