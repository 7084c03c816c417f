//! JSON module stage

use anyhow::Context;
use serde_json::Value;

use super::{Stage, TransformResult};

/// Turns `.json` modules into ES modules with a default export
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStage;

impl Stage for JsonStage {
    fn name(&self) -> &'static str {
        "json"
    }

    fn transform(&self, code: &str, id: &str) -> anyhow::Result<TransformResult> {
        if !id.ends_with(".json") {
            return Ok(TransformResult::unchanged(code));
        }
        let value: Value =
            serde_json::from_str(code).with_context(|| format!("could not parse {id}"))?;
        Ok(TransformResult::new(format!("export default {value};\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_modules_become_default_exports() {
        let result = JsonStage
            .transform("{ \"name\": \"foo\",\n  \"tags\": [1, 2] }", "src/data.json")
            .unwrap();
        assert_eq!(result.code, "export default {\"name\":\"foo\",\"tags\":[1,2]};\n");
    }

    #[test]
    fn test_other_modules_pass_through() {
        let source = "export const a = {};";
        let result = JsonStage.transform(source, "src/index.ts").unwrap();
        assert_eq!(result.code, source);
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = JsonStage.transform("{ nope", "src/broken.json").unwrap_err();
        assert!(err.to_string().contains("src/broken.json"));
    }
}
