//! Minimal `package.json` reader
//!
//! Only the fields distpack consumes are deserialized: the package name for
//! naming and the declared dependency tables for externalization.

use std::{fs, path::Path};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::error::{BuildError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
}

impl PackageManifest {
    /// Read `package.json` from a project root
    pub fn from_root(root: &Path) -> Result<Self> {
        let path = root.join("package.json");
        let contents = fs::read_to_string(&path).map_err(|source| BuildError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: Self =
            serde_json::from_str(&contents).map_err(|source| BuildError::Json { path, source })?;
        debug!(
            "Loaded package manifest {:?} with {} dependencies and {} peer dependencies",
            manifest.name,
            manifest.dependencies.len(),
            manifest.peer_dependencies.len()
        );
        Ok(manifest)
    }

    /// Read `package.json` if the project has one
    pub fn from_root_if_present(root: &Path) -> Result<Option<Self>> {
        if root.join("package.json").is_file() {
            Self::from_root(root).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Iterate over every runtime dependency name, peers included
    pub fn runtime_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.peer_dependencies.keys())
            .map(String::as_str)
    }
}
