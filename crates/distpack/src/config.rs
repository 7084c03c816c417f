//! Project configuration
//!
//! Values come from three layers, later layers winning field by field:
//! built-in defaults, the user-level `distpack.toml` in the platform config
//! directory, and the `distpack.toml` at the project root.

use std::{
    fs,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

pub const CONFIG_FILE_NAME: &str = "distpack.toml";

/// An aliased module rewritten to a lighter twin in non-cjs builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReplacement {
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory bundles are written to
    pub dist_dir: PathBuf,
    /// Directory holding the package sources
    pub src_dir: PathBuf,
    /// Code-to-message map used by error extraction
    pub error_codes: PathBuf,
    /// Optional test setup file
    pub tests_setup: PathBuf,
    /// Prefix of the per-format compiler cache directories
    pub cache_prefix: String,
    /// Minimum runtime version targeted when building for node
    pub node_version: String,
    pub import_replacements: Vec<ImportReplacement>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dist_dir: PathBuf::from("dist"),
            src_dir: PathBuf::from("src"),
            error_codes: PathBuf::from("errors/codes.json"),
            tests_setup: PathBuf::from("src/setupTests.ts"),
            cache_prefix: ".rts2_cache".to_owned(),
            node_version: "8".to_owned(),
            import_replacements: vec![ImportReplacement {
                original: "lodash".to_owned(),
                replacement: "lodash-es".to_owned(),
            }],
        }
    }
}

/// One configuration file; absent fields leave the lower layer untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigLayer {
    dist_dir: Option<PathBuf>,
    src_dir: Option<PathBuf>,
    error_codes: Option<PathBuf>,
    tests_setup: Option<PathBuf>,
    cache_prefix: Option<String>,
    node_version: Option<String>,
    import_replacements: Option<Vec<ImportReplacement>>,
}

impl ConfigLayer {
    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| {
            BuildError::configuration(format!("malformed {}: {e}", path.display()))
        })
    }

    fn apply(self, config: &mut Config) {
        if let Some(dist_dir) = self.dist_dir {
            config.dist_dir = dist_dir;
        }
        if let Some(src_dir) = self.src_dir {
            config.src_dir = src_dir;
        }
        if let Some(error_codes) = self.error_codes {
            config.error_codes = error_codes;
        }
        if let Some(tests_setup) = self.tests_setup {
            config.tests_setup = tests_setup;
        }
        if let Some(cache_prefix) = self.cache_prefix {
            config.cache_prefix = cache_prefix;
        }
        if let Some(node_version) = self.node_version {
            config.node_version = node_version;
        }
        if let Some(import_replacements) = self.import_replacements {
            config.import_replacements = import_replacements;
        }
    }
}

impl Config {
    /// Load the layered configuration for a project root
    pub fn load(root: &Path) -> Result<Self> {
        let user_config = user_config_path();
        Self::load_layers(user_config.as_deref(), &root.join(CONFIG_FILE_NAME))
    }

    /// Load defaults overlaid with the given files, skipping the ones that do not exist
    pub fn load_layers(user_config: Option<&Path>, project_config: &Path) -> Result<Self> {
        let mut config = Self::default();
        for path in user_config.into_iter().chain(std::iter::once(project_config)) {
            if path.is_file() {
                debug!("Applying configuration from {}", path.display());
                ConfigLayer::read(path)?.apply(&mut config);
            }
        }
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    match etcetera::choose_base_strategy() {
        Ok(strategy) => Some(strategy.config_dir().join("distpack").join(CONFIG_FILE_NAME)),
        Err(e) => {
            warn!("Could not locate the user configuration directory: {e}");
            None
        }
    }
}
