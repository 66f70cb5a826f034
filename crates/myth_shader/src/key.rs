//! Feature Keys
//!
//! Canonical identity of a requested feature combination: the sorted,
//! deduplicated, `+`-joined set of the ids the caller asked for (not the
//! dependency-expanded set).

use std::fmt;

/// Canonical cache key for a feature combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FeatureKey(String);

impl FeatureKey {
    /// Builds the key for `ids`. Order and duplicates do not matter.
    pub fn new<S: AsRef<str>>(ids: &[S]) -> Self {
        Self(canonical_ids(ids).join("+"))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ids the key was built from, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.split('+').filter(|id| !id.is_empty())
    }

    /// True for the key of an empty request (the base shader).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<base>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl AsRef<str> for FeatureKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `ids` sorted and deduplicated, exactly as requested.
///
/// Composition works from this list rather than from the joined key, so an
/// id is never split or dropped.
pub fn canonical_ids<S: AsRef<str>>(ids: &[S]) -> Vec<&str> {
    let mut sorted: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// True if `id` can be registered: non-empty and free of the `+` separator.
#[inline]
#[must_use]
pub fn is_valid_feature_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('+')
}

/// Free-function form of [`FeatureKey::new`].
pub fn build_feature_key<S: AsRef<str>>(ids: &[S]) -> FeatureKey {
    FeatureKey::new(ids)
}
