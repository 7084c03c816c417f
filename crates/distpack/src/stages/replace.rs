//! Environment substitution stage

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Value, json};

use super::{Stage, TransformResult};
use crate::options::Env;

pub const NODE_ENV_REFERENCE: &str = "process.env.NODE_ENV";
pub const APP_ENV_REFERENCE: &str = "process.env.REACT_APP_ENV";

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bprocess\.env\.(?:NODE_ENV|REACT_APP_ENV)\b")
        .expect("valid env reference pattern")
});

/// Replaces environment references with JSON literals
#[derive(Debug, Clone)]
pub struct ReplaceStage {
    values: IndexMap<&'static str, String>,
}

impl ReplaceStage {
    /// An unset application env is substituted as `undefined`
    pub fn new(env: Env, app_env: Option<&str>) -> Self {
        let mut values = IndexMap::new();
        values.insert(NODE_ENV_REFERENCE, json_literal(Some(env.as_str())));
        values.insert(APP_ENV_REFERENCE, json_literal(app_env));
        Self { values }
    }

    pub fn value_for(&self, reference: &str) -> Option<&str> {
        self.values.get(reference).map(String::as_str)
    }
}

fn json_literal(value: Option<&str>) -> String {
    value.map_or_else(
        || "undefined".to_owned(),
        |value| Value::String(value.to_owned()).to_string(),
    )
}

impl Stage for ReplaceStage {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn options(&self) -> Value {
        json!(self.values)
    }

    fn transform(&self, code: &str, _id: &str) -> anyhow::Result<TransformResult> {
        let replaced = ENV_REFERENCE.replace_all(code, |captures: &Captures<'_>| {
            self.values
                .get(&captures[0])
                .cloned()
                .unwrap_or_else(|| captures[0].to_owned())
        });
        Ok(TransformResult::new(replaced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_both_references() {
        let stage = ReplaceStage::new(Env::Production, Some("staging"));
        let source = "if (process.env.NODE_ENV !== 'production') warn(process.env.REACT_APP_ENV);";
        let result = stage.transform(source, "src/index.ts").unwrap();
        assert_eq!(
            result.code,
            "if (\"production\" !== 'production') warn(\"staging\");"
        );
    }

    #[test]
    fn test_unset_app_env_becomes_undefined() {
        let stage = ReplaceStage::new(Env::Development, None);
        assert_eq!(stage.value_for(NODE_ENV_REFERENCE), Some("\"development\""));
        assert_eq!(stage.value_for(APP_ENV_REFERENCE), Some("undefined"));
    }

    #[test]
    fn test_longer_identifiers_are_left_alone() {
        let stage = ReplaceStage::new(Env::Production, None);
        let source = "process.env.NODE_ENVIRONMENT";
        assert_eq!(stage.transform(source, "a.ts").unwrap().code, source);
    }
}
