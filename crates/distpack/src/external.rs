//! Deciding which imports stay external
//!
//! `External::is_external` is a total predicate: it answers for every string,
//! keeps no memo and has no side effects, so it can be handed to a bundling
//! engine and called from any thread.

use std::{fmt, sync::Arc};

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::{manifest::PackageManifest, options::NormalizedOptions};

/// Helper module injected by the async-to-promises transform
///
/// It has to be inlined into the bundle; consumers cannot be expected to
/// install it.
pub const ASYNC_HELPERS_MODULE: &str = "babel-plugin-transform-async-to-promises/helpers";

/// Classifies module identifiers as runtime dependencies or local modules
pub trait DependencyClassifier: fmt::Debug + Send + Sync {
    /// Return true if `id` names a dependency the consumer provides
    fn is_dependency(&self, id: &str) -> bool;
}

/// Treats every bare specifier as a dependency
#[derive(Debug, Clone, Copy, Default)]
pub struct BareSpecifierClassifier;

impl DependencyClassifier for BareSpecifierClassifier {
    fn is_dependency(&self, id: &str) -> bool {
        !is_local(id)
    }
}

/// Treats only the packages declared in `package.json` as dependencies
#[derive(Debug, Clone, Default)]
pub struct ManifestClassifier {
    packages: FxHashSet<String>,
}

impl ManifestClassifier {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_manifest(manifest: &PackageManifest) -> Self {
        Self::new(manifest.runtime_dependencies())
    }
}

impl DependencyClassifier for ManifestClassifier {
    fn is_dependency(&self, id: &str) -> bool {
        if is_local(id) {
            return false;
        }
        self.packages.contains(package_root(id))
    }
}

/// Relative (`./x`, `../x`) or absolute (`/x`, `C:\x`) module ids
fn is_local(id: &str) -> bool {
    if id.starts_with('.') || id.starts_with('/') || id.starts_with('\\') {
        return true;
    }
    let bytes = id.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\')
}

/// Package a module id belongs to (`@scope/pkg/sub` -> `@scope/pkg`)
fn package_root(id: &str) -> &str {
    let mut separators = id.match_indices('/').map(|(idx, _)| idx);
    let end = if id.starts_with('@') {
        separators.nth(1)
    } else {
        separators.next()
    };
    end.map_or(id, |idx| &id[..idx])
}

/// The external predicate handed to the bundling engine
#[derive(Clone)]
pub struct External {
    include_deps: bool,
    externals: IndexSet<String>,
    classifier: Arc<dyn DependencyClassifier>,
}

impl External {
    pub fn new(options: &NormalizedOptions, classifier: Arc<dyn DependencyClassifier>) -> Self {
        Self {
            include_deps: options.include_deps,
            externals: options.externals.clone(),
            classifier,
        }
    }

    /// Decide whether `id` is left for the consumer to resolve
    pub fn is_external(&self, id: &str) -> bool {
        if id == ASYNC_HELPERS_MODULE {
            return false;
        }
        if self.include_deps {
            return self.externals.contains(id);
        }
        self.classifier.is_dependency(id)
    }

    /// Serializable summary of the predicate's inputs
    pub fn describe(&self) -> ExternalDescription {
        ExternalDescription {
            include_deps: self.include_deps,
            externals: self.externals.iter().cloned().collect(),
            always_bundled: vec![ASYNC_HELPERS_MODULE.to_owned()],
            classifier: format!("{:?}", self.classifier),
        }
    }
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("External")
            .field("include_deps", &self.include_deps)
            .field("externals", &self.externals)
            .field("classifier", &self.classifier)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDescription {
    pub include_deps: bool,
    pub externals: Vec<String>,
    pub always_bundled: Vec<String>,
    pub classifier: String,
}
