//! Typed-dialect compilation stage

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use super::Stage;
use crate::error::{BuildError, Result};

/// Compiler target forced regardless of the user's tsconfig; the transpiler
/// stage lowers the output afterwards.
const FORCED_TARGET: &str = "esnext";

#[derive(Debug, Clone)]
pub struct TypeScriptStage {
    cache_root: PathBuf,
    tsconfig: Option<PathBuf>,
}

impl TypeScriptStage {
    /// Fails if a tsconfig is given but does not exist
    pub fn new(cache_root: PathBuf, tsconfig: Option<&Path>) -> Result<Self> {
        if let Some(path) = tsconfig {
            if !path.is_file() {
                return Err(BuildError::ResourceNotFound {
                    what: "tsconfig",
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(Self {
            cache_root,
            tsconfig: tsconfig.map(Path::to_path_buf),
        })
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}

impl Stage for TypeScriptStage {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn options(&self) -> Value {
        json!({
            "typescript": "typescript",
            "cacheRoot": self.cache_root.display().to_string(),
            "tsconfig": self.tsconfig.as_ref().map(|path| path.display().to_string()),
            "tsconfigDefaults": {
                "compilerOptions": {
                    "sourceMap": true,
                    "declaration": true,
                    "jsx": "react",
                },
            },
            "tsconfigOverride": {
                "compilerOptions": {
                    "target": FORCED_TARGET,
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_tsconfig_is_resource_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = TypeScriptStage::new(
            temp_dir.path().join(".rts2_cache_cjs"),
            Some(&temp_dir.path().join("tsconfig.build.json")),
        )
        .unwrap_err();
        assert!(err.is_resource_not_found());
    }

    #[test]
    fn test_options_force_esnext_and_keep_defaults() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let tsconfig = temp_dir.path().join("tsconfig.json");
        fs::write(&tsconfig, "{}")?;

        let stage = TypeScriptStage::new(PathBuf::from(".rts2_cache_esm"), Some(&tsconfig))?;
        let options = stage.options();
        assert_eq!(options["cacheRoot"], ".rts2_cache_esm");
        assert_eq!(options["tsconfigOverride"]["compilerOptions"]["target"], "esnext");
        assert_eq!(options["tsconfigDefaults"]["compilerOptions"]["declaration"], true);
        assert_eq!(options["tsconfigDefaults"]["compilerOptions"]["sourceMap"], true);
        assert_eq!(options["tsconfigDefaults"]["compilerOptions"]["jsx"], "react");
        assert_eq!(options["tsconfig"], tsconfig.display().to_string());
        Ok(())
    }
}
