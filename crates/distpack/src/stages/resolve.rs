//! Module resolution stage

use serde_json::{Value, json};

use super::Stage;
use crate::options::Target;

/// Node-style module resolution, executed by the bundling engine
#[derive(Debug, Clone)]
pub struct NodeResolveStage {
    main_fields: Vec<&'static str>,
}

impl NodeResolveStage {
    /// The `browser` field is only consulted for non-node targets
    pub fn new(target: Target) -> Self {
        let mut main_fields = vec!["module", "main"];
        if target != Target::Node {
            main_fields.push("browser");
        }
        Self { main_fields }
    }

    pub fn main_fields(&self) -> &[&'static str] {
        &self.main_fields
    }
}

impl Stage for NodeResolveStage {
    fn name(&self) -> &'static str {
        "node-resolve"
    }

    fn options(&self) -> Value {
        json!({ "mainFields": self.main_fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_field_only_for_browser_target() {
        assert_eq!(
            NodeResolveStage::new(Target::Browser).main_fields(),
            ["module", "main", "browser"]
        );
        assert_eq!(NodeResolveStage::new(Target::Node).main_fields(), ["module", "main"]);
    }
}
