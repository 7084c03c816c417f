//! CommonJS interop stage

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use super::Stage;

// Matches hoisted packages at any depth as well.
static DEPENDENCY_TREE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\]node_modules[/\\]").expect("valid node_modules pattern"));

/// Converts CommonJS dependencies to ES modules for UMD bundles
///
/// Only sources inside the dependency tree are converted, never the
/// package's own sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonJsStage;

impl CommonJsStage {
    pub fn new() -> Self {
        Self
    }

    /// Whether the engine applies the conversion to module `id`
    pub fn includes(&self, id: &str) -> bool {
        DEPENDENCY_TREE.is_match(id)
    }
}

impl Stage for CommonJsStage {
    fn name(&self) -> &'static str {
        "commonjs"
    }

    fn options(&self) -> Value {
        json!({ "include": DEPENDENCY_TREE.as_str() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_to_dependency_tree() {
        let stage = CommonJsStage::new();
        assert!(stage.includes("/work/pkg/node_modules/react/index.js"));
        assert!(stage.includes("/work/node_modules/.pnpm/a/node_modules/b/x.js"));
        assert!(stage.includes(r"C:\work\node_modules\react\index.js"));
        assert!(!stage.includes("/work/pkg/src/index.ts"));
        assert!(!stage.includes("/work/pkg/src/node_modules_helper.ts"));
    }
}
